//! Image upload handler.

use super::AppState;
use crate::error::{ApiError, ApiResult};
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::path::Path;
use std::sync::Arc;
use todo_types::UploadResponse;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const FIELD_NAME: &str = "image";

// POST /api/upload (multipart, field "image")
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::validation("Only image files are allowed"));
        }
        let original_name = field.file_name().unwrap_or_default().to_string();

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ApiError::PayloadTooLarge(format!(
                    "File exceeds the {} MiB limit",
                    MAX_UPLOAD_BYTES / (1024 * 1024)
                )));
            }
            data.extend_from_slice(&chunk);
        }

        tokio::fs::create_dir_all(&state.upload_dir).await?;
        let filename = generate_filename(&original_name);
        tokio::fs::write(state.upload_dir.join(&filename), &data).await?;

        log::info!(
            "Stored upload '{}' as {} ({} bytes)",
            original_name,
            filename,
            data.len()
        );
        return Ok(Json(UploadResponse {
            url: format!("/uploads/{}", filename),
        }));
    }

    Err(ApiError::validation("No file uploaded"))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::Validation(e.body_text())
    }
}

/// `<unix millis>-<9 random chars><.ext>`, keeping the original extension when
/// it is plain alphanumeric.
fn generate_filename(original_name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!(
        "{}-{}{}",
        chrono::Utc::now().timestamp_millis(),
        suffix,
        ext
    )
}
