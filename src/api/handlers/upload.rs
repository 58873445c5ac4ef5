use crate::AppState;
use crate::api::error::AppError;
use crate::models::{ChunkOutcome, ChunkUploadRequest, FinalizedFile};
use crate::utils::validation::file_extension;
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Serialize;
use utoipa::ToSchema;

/// Multipart form of a chunk upload (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ChunkUploadForm {
    /// Chunk bytes; the part's filename names the assembled file
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Bytes sent so far, this chunk included
    max_range: u64,
    /// Declared size of the whole file
    file_size: u64,
    /// "true" or "1" to get a unique name on completion
    unique_name: Option<bool>,
    /// "true" or "1" to strip image metadata on completion; see `metadata_stripped`
    strip_metadata: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct PendingResponse {
    pub status: String,
    pub file_name: String,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Chunk exceeds the maximum allowed size".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

fn parse_size(field: &str, text: &str) -> Result<u64, AppError> {
    text.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Field '{}' must be a byte count", field)))
}

fn parse_flag(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = ChunkUploadForm, description = "One chunk of a file", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload complete", body = FinalizedFile),
        (status = 202, description = "Chunk stored, more expected", body = PendingResponse),
        (status = 400, description = "Invalid form or file extension not allowed"),
        (status = 409, description = "Upload already finalized"),
        (status = 413, description = "Chunk exceeds the maximum allowed size")
    ),
    tag = "upload"
)]
pub async fn upload_chunk(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut file_name: Option<String> = None;
    let mut data: Option<Bytes> = None;
    let mut max_range: Option<u64> = None;
    let mut file_size: Option<u64> = None;
    let mut unique_name = false;
    let mut strip = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                file_name = Some(field.file_name().unwrap_or_default().to_string());
                data = Some(field.bytes().await.map_err(multipart_error)?);
            }
            "max_range" => {
                let text = field.text().await.map_err(multipart_error)?;
                max_range = Some(parse_size(&name, &text)?);
            }
            "file_size" => {
                let text = field.text().await.map_err(multipart_error)?;
                file_size = Some(parse_size(&name, &text)?);
            }
            "unique_name" => {
                unique_name = parse_flag(&field.text().await.map_err(multipart_error)?);
            }
            "strip_metadata" => {
                strip = parse_flag(&field.text().await.map_err(multipart_error)?);
            }
            other => tracing::debug!("Ignoring unknown multipart field '{}'", other),
        }
    }

    let file_name = file_name.ok_or(AppError::BadRequest("No file provided".to_string()))?;
    let data = data.unwrap_or_default();
    let max_range =
        max_range.ok_or(AppError::BadRequest("Missing field 'max_range'".to_string()))?;
    let file_size =
        file_size.ok_or(AppError::BadRequest("Missing field 'file_size'".to_string()))?;

    if !state.upload_service.is_allowed(&file_name) {
        return Err(AppError::BadRequest(format!(
            "File extension '{}' is not allowed",
            file_extension(&file_name).to_lowercase()
        )));
    }

    let request = ChunkUploadRequest {
        chunk_data: data.as_ref(),
        original_filename: file_name.clone(),
        declared_total_size: file_size,
        max_range_so_far: max_range,
        upload_directory: state.config.upload_dir.clone(),
        generate_unique_name: unique_name,
        strip_metadata: strip,
    };

    match state.upload_service.store_chunk(request).await? {
        ChunkOutcome::Pending => Ok((
            StatusCode::ACCEPTED,
            Json(PendingResponse {
                status: "pending".to_string(),
                file_name,
            }),
        )
            .into_response()),
        ChunkOutcome::Complete(file) => Ok(Json(file).into_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/upload/{file_name}",
    params(
        ("file_name" = String, Path, description = "Name of the uploaded file")
    ),
    responses(
        (status = 204, description = "File removed"),
        (status = 404, description = "File not found")
    ),
    tag = "upload"
)]
pub async fn remove_upload(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .upload_service
        .remove_file(&state.config.upload_dir, &file_name)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
