//! HTTP request handlers for the intake API.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::extract::FileKind;
use crate::services::{IntakeError, ProcessedFile};
use crate::utils::{file_extension, sanitize_filename};

/// Liveness check.
pub async fn health() -> &'static str {
    "docintake server is running"
}

/// JSON `{"error": ...}` with the mapped status code.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(e: IntakeError) -> Self {
        if e.is_input_error() {
            Self::bad_request(e.to_string())
        } else {
            Self::internal(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Accept one uploaded file, stage it, and run the intake pipeline.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessedFile>, ApiError> {
    let mut staged: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(raw_name) = field.file_name().map(|s| s.to_string()) else {
            return Err(ApiError::bad_request("no file selected"));
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {}", e)))?;
        staged = Some((raw_name, data.to_vec()));
        break;
    }

    let Some((raw_name, data)) = staged else {
        return Err(ApiError::bad_request("no file uploaded"));
    };
    if raw_name.is_empty() || data.is_empty() {
        return Err(ApiError::bad_request("no file selected"));
    }

    let filename = sanitize_filename(&raw_name);
    let allowed = file_extension(&filename)
        .and_then(|ext| FileKind::from_extension(&ext))
        .is_some();
    if !allowed {
        return Err(ApiError::bad_request("file type not allowed"));
    }

    if let Some(detected) = infer::get(&data) {
        tracing::debug!("upload {} detected as {}", filename, detected.mime_type());
    }

    // Staging is keyed by sanitized filename; colliding concurrent
    // uploads are last-writer-wins.
    let path = state.upload_dir.join(&filename);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| ApiError::internal(format!("failed to stage upload: {}", e)))?;

    let result = state.intake.process(&path, &filename).await?;
    Ok(Json(result))
}
