pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::handlers;
use crate::config::UploadConfig;
use crate::services::upload_service::UploadService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Multipart framing and the small metadata fields on top of one chunk.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::upload::upload_chunk,
        handlers::upload::remove_upload,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::upload::ChunkUploadForm,
            handlers::upload::PendingResponse,
            models::FinalizedFile,
        )
    ),
    tags(
        (name = "system", description = "Service status"),
        (name = "upload", description = "Chunked upload endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
    pub config: UploadConfig,
}

impl AppState {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            upload_service: Arc::new(UploadService::new(config.clone())),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_chunk_size + MULTIPART_OVERHEAD;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health_check))
        .route(
            "/upload",
            post(handlers::upload::upload_chunk).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/upload/:file_name", delete(handlers::upload::remove_upload))
        .with_state(state)
}
