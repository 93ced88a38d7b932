use std::path::Path as FsPath;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};

use pixelart::storage::StoredUpload;
use pixelart::{BlockSize, StorageError};

use crate::error::AppError;
use crate::{pages, AppState};

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the block size.
pub const BLOCK_SIZE_FIELD: &str = "tamanho_pixel";

pub async fn index() -> Html<String> {
    Html(pages::index())
}

/// Accept an upload, pixelate it and redirect to its result page.
///
/// A missing file (or one whose name sanitizes to nothing) sends the client
/// back to the form without an error message.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload: Option<(String, Bytes)> = None;
    let mut block_field: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let data = field.bytes().await?;
                upload = Some((file_name, data));
            }
            Some(BLOCK_SIZE_FIELD) => block_field = Some(field.text().await?),
            _ => debug!("Ignoring multipart field {name:?}"),
        }
    }

    let Some((file_name, data)) = upload.filter(|(name, _)| !name.is_empty()) else {
        debug!("No file in submission, back to the form");
        return Ok(Redirect::to("/").into_response());
    };

    let block_size = BlockSize::from_field(block_field.as_deref());
    info!(
        "Received {file_name:?} ({} bytes), block size {block_size}",
        data.len()
    );

    let worker_state = Arc::clone(&state);
    let job = tokio::task::spawn_blocking(move || -> Result<StoredUpload, AppError> {
        let stored = worker_state.storage.save_original(&file_name, &data)?;
        pixelart::image::transform_with(
            &stored.original_path,
            &stored.output_path,
            block_size,
            worker_state.config.png_compression,
        )?;
        Ok(stored)
    });

    match job.await? {
        Ok(stored) => {
            let location = format!("/resultado/{}", stored.output_name);
            Ok(Redirect::to(&location).into_response())
        }
        Err(AppError::Storage(StorageError::InvalidFilename(name))) => {
            debug!("File name {name:?} is empty once sanitized, back to the form");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn result(Path(filename): Path<String>) -> Html<String> {
    Html(pages::result(&filename))
}

/// The derived image inline, for the `<img>` on the result page.
#[instrument(skip(state))]
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve_output(&state, &filename, "inline").await
}

/// The derived image as a forced download.
#[instrument(skip(state))]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve_output(&state, &filename, "attachment").await
}

async fn serve_output(
    state: &AppState,
    filename: &str,
    disposition: &str,
) -> Result<Response, AppError> {
    let path = state.storage.resolve_output(filename)?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        // removed between resolve and open
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(filename.to_owned()).into())
        }
        Err(e) => return Err(AppError::Read(filename.to_owned(), e)),
    };

    let headers = [
        (header::CONTENT_TYPE, content_type(&path).to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{filename}\""),
        ),
    ];
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((headers, body).into_response())
}

fn content_type(path: &FsPath) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type(FsPath::new("a_pixelart.png")), "image/png");
        assert_eq!(content_type(FsPath::new("A.PNG")), "image/png");
        assert_eq!(content_type(FsPath::new("notes.txt")), "application/octet-stream");
        assert_eq!(content_type(FsPath::new("noext")), "application/octet-stream");
    }
}
