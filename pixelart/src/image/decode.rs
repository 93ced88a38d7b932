//! Image decoding

use std::path::Path;

use imageproc::image::{load_from_memory, DynamicImage};

use super::PixelateError;

/// Decode image from memory
///
/// The container format is sniffed from the bytes, not the file name.
pub fn decode(data: &[u8]) -> Result<DynamicImage, PixelateError> {
    load_from_memory(data).map_err(PixelateError::Decode)
}

pub fn decode_file(path: &Path) -> Result<DynamicImage, PixelateError> {
    let data = std::fs::read(path).map_err(|source| PixelateError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&data)
}
