//! Upload handlers
//!
//! Binary content goes to the file store under a content-addressed name;
//! the metadata row keeps the display name, hash, original filename, and
//! public URL.

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
};

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::ApiResponse;
use crate::policy;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/upload/:id", patch(update_image).delete(delete_image))
}

/// One parsed multipart upload payload
struct UploadParts {
    name: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

async fn read_upload_parts(mut multipart: Multipart) -> ApiResult<UploadParts> {
    let mut parts = UploadParts {
        name: None,
        file: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart payload: {}", e)))?
    {
        match field.name() {
            Some("name") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Could not read name field: {}", e)))?;
                parts.name = Some(value);
            }
            Some("file") => {
                let original = field
                    .file_name()
                    .ok_or_else(|| ApiError::validation("File field is missing a filename"))?
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Could not read file field: {}", e)))?;
                parts.file = Some((original, bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(parts)
}

fn filename_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Store an uploaded file and record its metadata
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let parts = read_upload_parts(multipart).await?;

    let name = parts
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Missing upload field 'name'"))?;
    let (original, bytes) = parts
        .file
        .ok_or_else(|| ApiError::validation("Missing upload field 'file'"))?;

    let stored = state.file_store.save(&original, &bytes).await?;

    let metadata = state
        .image_repository
        .create(&name, &stored.hash, &original, &stored.url)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("File uploaded successfully", metadata)),
    ))
}

/// Rename an upload and/or replace its content (admin only)
pub async fn update_image(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let existing = state
        .image_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Upload not found"))?;

    let parts = read_upload_parts(multipart).await?;
    if parts.name.is_none() && parts.file.is_none() {
        return Err(ApiError::validation("No fields provided for update"));
    }

    let name = parts.name.unwrap_or_else(|| existing.name.clone());

    let (file_hash, file_original, url) = match parts.file {
        Some((original, bytes)) => {
            let stored = state.file_store.save(&original, &bytes).await?;
            state
                .file_store
                .delete(filename_from_url(&existing.url))
                .await?;
            (stored.hash, original, stored.url)
        }
        None => (
            existing.file_hash.clone(),
            existing.file_original.clone(),
            existing.url.clone(),
        ),
    };

    let metadata = state
        .image_repository
        .update(id, &name, &file_hash, &file_original, &url)
        .await?
        .ok_or_else(|| ApiError::not_found("Upload not found"))?;

    Ok(Json(ApiResponse::ok("Upload updated successfully", metadata)))
}

/// Remove an upload: metadata row first, then the stored file (admin only)
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let existing = state
        .image_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Upload not found"))?;

    state.image_repository.delete(id).await?;
    state
        .file_store
        .delete(filename_from_url(&existing.url))
        .await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "Upload deleted successfully",
    )))
}
