//! On-disk layout: uploaded originals in one directory, pixelated PNGs in
//! another, linked only by file name.

use std::fs;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::config::AppConfig;

/// Appended to the original's base name to form the output name.
pub const DERIVED_SUFFIX: &str = "_pixelart";
/// Outputs are always PNG, whatever the upload was.
pub const DERIVED_EXTENSION: &str = "png";

const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM0", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
    "COM8", "COM9", "LPT0", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("file name {0:?} has no usable characters")]
    InvalidFilename(String),
    #[error("{0:?} not found")]
    NotFound(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Make a client supplied file name safe to use as a single path segment.
///
/// Non-ASCII characters are folded to their ASCII base letter where one
/// exists and dropped otherwise, path separators become word breaks,
/// whitespace runs become `_`, anything outside `[A-Za-z0-9_.-]` is
/// removed and leading/trailing `.`/`_` are stripped. The result may be
/// empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = ascii.replace(['/', '\\'], " ");

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if !trimmed.is_empty()
        && WINDOWS_DEVICE_NAMES
            .iter()
            .any(|device| device.eq_ignore_ascii_case(stem))
    {
        return format!("_{trimmed}");
    }

    trimmed.to_string()
}

/// Split off the extension, dot included. Leading dots never start an
/// extension, so `.profile` has none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if !name[..i].trim_start_matches('.').is_empty() => name.split_at(i),
        _ => (name, ""),
    }
}

/// `photo.final.jpg` -> `photo.final_pixelart.png`
pub fn derived_filename(sanitized: &str) -> String {
    // don't use Path::with_extension, the base name is kept byte for byte
    let (base, _ext) = split_extension(sanitized);
    format!("{base}{DERIVED_SUFFIX}.{DERIVED_EXTENSION}")
}

/// Where an accepted upload was stored and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub file_name: String,
    pub original_path: PathBuf,
    pub output_name: String,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl Storage {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.upload_dir, &config.output_dir)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        for dir in [&self.upload_dir, &self.output_dir] {
            fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Persist an upload verbatim under its sanitized name. An existing file
    /// with the same name is overwritten.
    pub fn save_original(&self, client_name: &str, data: &[u8]) -> Result<StoredUpload, StorageError> {
        let file_name = secure_filename(client_name);
        if file_name.is_empty() {
            return Err(StorageError::InvalidFilename(client_name.to_string()));
        }

        let original_path = self.upload_dir.join(&file_name);
        fs::write(&original_path, data).map_err(|source| StorageError::Io {
            path: original_path.clone(),
            source,
        })?;
        log::debug!(
            "Saved upload {client_name:?} as {} ({} bytes)",
            original_path.display(),
            data.len()
        );

        let output_name = derived_filename(&file_name);
        let output_path = self.output_dir.join(&output_name);

        Ok(StoredUpload {
            file_name,
            original_path,
            output_name,
            output_path,
        })
    }

    /// Map a requested output name back to an existing file.
    ///
    /// Only names that survive [`secure_filename`] unchanged are accepted, so
    /// separators and `..` can never escape the output directory.
    pub fn resolve_output(&self, requested: &str) -> Result<PathBuf, StorageError> {
        if requested.is_empty() || secure_filename(requested) != requested {
            return Err(StorageError::InvalidFilename(requested.to_string()));
        }

        let path = self.output_dir.join(requested);
        if path.is_file() {
            Ok(path)
        } else {
            Err(StorageError::NotFound(requested.to_string()))
        }
    }
}
