use crate::services::error::UploadError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Upload(e) => match &e {
                UploadError::InvalidFileName { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
                UploadError::SizeMismatch {
                    path,
                    declared,
                    actual,
                } => {
                    tracing::warn!("{}", e);
                    (
                        StatusCode::BAD_REQUEST,
                        format!(
                            "Size mismatch for {}: declared {} bytes, found {}",
                            display_name(path),
                            declared,
                            actual
                        ),
                    )
                }
                UploadError::Decode { path, .. } => {
                    tracing::warn!("{}", e);
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        format!("{} is not a decodable image", display_name(path)),
                    )
                }
                UploadError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "File not found".to_string())
                }
                UploadError::AlreadyFinalized { .. } => {
                    (StatusCode::CONFLICT, "Upload already finalized".to_string())
                }
                _ => {
                    tracing::error!("Upload error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Bare file name for client-facing messages; server paths stay in the logs.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
