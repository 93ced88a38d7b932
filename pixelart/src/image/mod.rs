//! Pixel-art transform: average down by block size, replicate back up.

mod decode;
mod encode;
mod resample;

// Re-export public API
pub use encode::{compress_to_png, write_png_atomic, PngCompression};

use std::path::{Path, PathBuf};

use imageproc::image::{DynamicImage, GenericImageView, ImageError};

use crate::block_size::BlockSize;
use resample::Pixels;

#[derive(thiserror::Error, Debug)]
pub enum PixelateError {
    #[error("failed to read {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("failed to resize {from:?} -> {to:?}: {reason}")]
    Resize {
        from: (u32, u32),
        to: (u32, u32),
        reason: String,
    },
    #[error("failed to encode PNG: {0}")]
    Encode(#[source] ImageError),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pixelate an in-memory image.
///
/// The image is averaged down to `block_size.reduced_dimensions(..)` with a
/// bilinear filter, then blown back up to its original size with
/// nearest-neighbour so every reduced pixel becomes a visible square.
/// Output dimensions always equal input dimensions.
pub fn pixelate(img: DynamicImage, block_size: BlockSize) -> Result<DynamicImage, PixelateError> {
    let dimensions = img.dimensions();
    let reduced = block_size.reduced_dimensions(dimensions);

    if dimensions.0 == 0 || dimensions.1 == 0 {
        return Err(PixelateError::Resize {
            from: dimensions,
            to: reduced,
            reason: "image has no pixels".into(),
        });
    }

    // block size 1 or a 1x1 image: nothing to average
    if reduced == dimensions {
        log::debug!("Reduced size equals source size {dimensions:?}, skipping resample");
        return Ok(img);
    }

    log::debug!("Pixelating {dimensions:?} via {reduced:?} (block size {block_size})");

    let pixels = Pixels::from_image(img);
    let small = resample::downscale(&pixels, reduced)?;
    let blocky = resample::upscale(&small, dimensions)?;
    blocky.into_image()
}

/// Decode `source`, pixelate it and write a PNG to `dest`.
///
/// Returns the output dimensions. Any failure leaves `dest` untouched.
pub fn transform(
    source: &Path,
    dest: &Path,
    block_size: BlockSize,
) -> Result<(u32, u32), PixelateError> {
    transform_with(source, dest, block_size, PngCompression::default())
}

/// [`transform`] with an explicit PNG compression level.
pub fn transform_with(
    source: &Path,
    dest: &Path,
    block_size: BlockSize,
    compression: PngCompression,
) -> Result<(u32, u32), PixelateError> {
    let img = decode::decode_file(source)?;
    let img = pixelate(img, block_size)?;
    let dimensions = img.dimensions();

    write_png_atomic(&img, dest, compression)?;

    log::info!(
        "Wrote {} ({}x{}, block size {block_size})",
        dest.display(),
        dimensions.0,
        dimensions.1
    );
    Ok(dimensions)
}
