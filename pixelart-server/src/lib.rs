//! HTTP front end: upload form, pixelation on submit, result and download
//! pages.

pub mod error;
pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use pixelart::{AppConfig, Storage};

/// Shared, read-only per-process state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Storage,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let storage = Storage::from_config(&config);
        Self { config, storage }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index).post(handlers::upload))
        .route("/resultado/{filename}", get(handlers::result))
        .route("/preview/{filename}", get(handlers::preview))
        .route("/download/{filename}", get(handlers::download))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
