//! PNG encoding and output file writing

use std::io::{BufWriter, Write};
use std::path::Path;

use imageproc::image::{ColorType, DynamicImage, GenericImageView, ImageError};

use super::PixelateError;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// Compress an image to PNG format with the specified compression level
pub fn compress_to_png<W>(
    img: &DynamicImage,
    writer: &mut W,
    compression: PngCompression,
) -> Result<(), ImageError>
where
    W: Write,
{
    use imageproc::image::codecs::png::{CompressionType, FilterType, PngEncoder};
    use imageproc::image::ImageEncoder;

    let compression_type = match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    };

    let is_grayscale = img.color() == ColorType::L8 || img.color() == ColorType::La8;

    let encoder = PngEncoder::new_with_quality(
        writer,
        compression_type,
        if is_grayscale {
            FilterType::NoFilter
        } else {
            FilterType::Adaptive
        },
    );

    let (width, height) = img.dimensions();
    encoder.write_image(img.as_bytes(), width, height, img.color().into())
}

/// Encode `img` as PNG into a temp file next to `dest`, then rename it over
/// `dest`. Readers see either the previous file or the complete new one.
pub fn write_png_atomic(
    img: &DynamicImage,
    dest: &Path,
    compression: PngCompression,
) -> Result<(), PixelateError> {
    let write_err = |source| PixelateError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".pixelart-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        compress_to_png(img, &mut writer, compression).map_err(|e| match e {
            ImageError::IoError(source) => write_err(source),
            other => PixelateError::Encode(other),
        })?;
        writer.flush().map_err(write_err)?;
    }

    tmp.persist(dest).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::image::{Rgb, RgbImage};

    #[test]
    fn compression_names() {
        assert_eq!(PngCompression::Best.to_string(), "best");
        assert_eq!("fast".parse::<PngCompression>().unwrap(), PngCompression::Fast);
        assert!("ultra".parse::<PngCompression>().is_err());
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.png");
        std::fs::write(&dest, b"stale").unwrap();

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([1, 2, 3])));
        write_png_atomic(&img, &dest, PngCompression::Fast).unwrap();

        let back = imageproc::image::open(&dest).unwrap();
        assert_eq!(back.dimensions(), (4, 3));

        // no temp files left behind
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nope").join("out.png");
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));

        let err = write_png_atomic(&img, &dest, PngCompression::Default).unwrap_err();
        assert!(matches!(err, PixelateError::Write { .. }), "{err}");
    }
}
