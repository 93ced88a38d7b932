pub mod block_size;
pub mod config;
pub mod image;
pub mod storage;

// Re-export commonly used types
pub use block_size::BlockSize;
pub use config::{AppConfig, ConfigError};
pub use image::{pixelate, transform, PixelateError, PngCompression};
pub use storage::{derived_filename, secure_filename, Storage, StorageError};
