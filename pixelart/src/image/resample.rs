//! Resampling: bilinear averaging down, nearest-neighbour back up

use fast_image_resize as fr;
use fr::images::Image as FrImage;
use imageproc::image::{
    DynamicImage, GrayAlphaImage, GrayImage, GenericImageView, RgbImage, RgbaImage,
};

use super::PixelateError;

/// Channel layouts resampled natively. Anything else goes through RGBA8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    L8,
    La8,
    Rgb8,
    Rgba8,
}

impl Layout {
    fn pixel_type(self) -> fr::PixelType {
        match self {
            Layout::L8 => fr::PixelType::U8,
            Layout::La8 => fr::PixelType::U8x2,
            Layout::Rgb8 => fr::PixelType::U8x3,
            Layout::Rgba8 => fr::PixelType::U8x4,
        }
    }
}

/// Raw interleaved 8-bit pixels plus the layout needed to rebuild a
/// `DynamicImage` afterwards.
#[derive(Debug, Clone)]
pub(super) struct Pixels {
    layout: Layout,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixels {
    pub(super) fn from_image(img: DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        let (layout, data) = match img {
            DynamicImage::ImageLuma8(buf) => (Layout::L8, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (Layout::La8, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (Layout::Rgb8, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (Layout::Rgba8, buf.into_raw()),
            other => {
                log::debug!("Converting {:?} to RGBA8 for resampling", other.color());
                (Layout::Rgba8, other.into_rgba8().into_raw())
            }
        };

        Pixels {
            layout,
            width,
            height,
            data,
        }
    }

    pub(super) fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(super) fn into_image(self) -> Result<DynamicImage, PixelateError> {
        let Pixels {
            layout,
            width,
            height,
            data,
        } = self;

        let img = match layout {
            Layout::L8 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
            Layout::La8 => {
                GrayAlphaImage::from_raw(width, height, data).map(DynamicImage::ImageLumaA8)
            }
            Layout::Rgb8 => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
            Layout::Rgba8 => RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
        };

        img.ok_or_else(|| PixelateError::Resize {
            from: (width, height),
            to: (width, height),
            reason: "pixel buffer does not match image dimensions".into(),
        })
    }
}

/// Average blocks of pixels down to `target` with a bilinear filter.
pub(super) fn downscale(src: &Pixels, target: (u32, u32)) -> Result<Pixels, PixelateError> {
    // alpha-aware so transparent pixels don't bleed their colour into the average
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear))
        .use_alpha(true);
    resample(src, target, &options)
}

/// Replicate each pixel into a block covering `target`.
pub(super) fn upscale(src: &Pixels, target: (u32, u32)) -> Result<Pixels, PixelateError> {
    // nearest never mixes pixels, so premultiplying alpha would only add rounding
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Nearest)
        .use_alpha(false);
    resample(src, target, &options)
}

fn resample(
    src: &Pixels,
    target: (u32, u32),
    options: &fr::ResizeOptions,
) -> Result<Pixels, PixelateError> {
    let from = src.dimensions();
    let (new_width, new_height) = target;
    let pixel_type = src.layout.pixel_type();

    let fail = |reason: String| PixelateError::Resize {
        from,
        to: target,
        reason,
    };

    // fast_image_resize wants an owned (or mutable) source buffer
    let src_image = FrImage::from_vec_u8(src.width, src.height, src.data.clone(), pixel_type)
        .map_err(|e| fail(e.to_string()))?;

    let mut dst_image = FrImage::new(new_width, new_height, pixel_type);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, Some(options))
        .map_err(|e| fail(e.to_string()))?;

    Ok(Pixels {
        layout: src.layout,
        width: new_width,
        height: new_height,
        data: dst_image.into_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::image::{Luma, LumaA, Rgb, Rgba};

    #[test]
    fn layout_is_preserved() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, Luma([7])));
        let pixels = Pixels::from_image(gray);
        assert_eq!(pixels.layout, Layout::L8);
        assert_eq!(pixels.dimensions(), (3, 2));
        assert!(matches!(pixels.into_image().unwrap(), DynamicImage::ImageLuma8(_)));

        let ga = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(1, 1, LumaA([7, 9])));
        assert_eq!(Pixels::from_image(ga).layout, Layout::La8);
    }

    #[test]
    fn wide_formats_go_through_rgba8() {
        let img = DynamicImage::ImageRgb16(imageproc::image::ImageBuffer::from_pixel(
            2,
            2,
            Rgb([u16::MAX, 0, 0]),
        ));
        let pixels = Pixels::from_image(img);
        assert_eq!(pixels.layout, Layout::Rgba8);
        assert_eq!(&pixels.data[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn downscale_averages_two_colours() {
        // left half black, right half white -> one mid-grey pixel per row pair
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(1, 0, Luma([255]));
        img.put_pixel(1, 1, Luma([255]));
        let pixels = Pixels::from_image(DynamicImage::ImageLuma8(img));

        let small = downscale(&pixels, (1, 1)).unwrap();
        assert_eq!(small.dimensions(), (1, 1));
        let v = small.data[0];
        assert!((126..=129).contains(&v), "expected mid grey, got {v}");
    }

    #[test]
    fn upscale_replicates_blocks() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 128]));
        let pixels = Pixels::from_image(DynamicImage::ImageRgba8(img));

        let big = upscale(&pixels, (4, 2)).unwrap().into_image().unwrap();
        let big = big.to_rgba8();
        for y in 0..2 {
            assert_eq!(big.get_pixel(0, y), &Rgba([255, 0, 0, 255]));
            assert_eq!(big.get_pixel(1, y), &Rgba([255, 0, 0, 255]));
            assert_eq!(big.get_pixel(2, y), &Rgba([0, 0, 255, 128]));
            assert_eq!(big.get_pixel(3, y), &Rgba([0, 0, 255, 128]));
        }
    }
}
