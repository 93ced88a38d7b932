use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use pixelart::{PixelateError, StorageError};

/// Shown to the user for every processing failure; details only go to the log.
pub const PROCESSING_FAILED: &str = "Ocorreu um erro ao processar sua imagem.";

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("bad multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Pixelate(#[from] PixelateError),
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("failed to read {0}: {1}")]
    Read(String, #[source] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Multipart(e) => {
                tracing::debug!("Rejecting upload: {e}");
                e.into_response()
            }
            AppError::Storage(StorageError::InvalidFilename(_) | StorageError::NotFound(_)) => {
                StatusCode::NOT_FOUND.into_response()
            }
            other => {
                tracing::error!("Error processing request: {other}");
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED).into_response()
            }
        }
    }
}
