//! Recap handlers

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::ApiResponse;
use crate::models::recap::{CreateRecapRequest, RecapPatch};
use crate::policy;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recaps).post(create_recap))
        .route(
            "/:uuid",
            get(get_recap).patch(update_recap).delete(delete_recap),
        )
}

/// Create a recap (admin only)
pub async fn create_recap(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateRecapRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Recap name cannot be empty"));
    }

    let recap = state.recap_repository.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Recap created successfully", recap)),
    ))
}

/// List all recaps
pub async fn list_recaps(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let recaps = state.recap_repository.list_all().await?;
    Ok(Json(ApiResponse::ok("Recaps fetched successfully", recaps)))
}

/// Fetch a single recap
pub async fn get_recap(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let recap = state
        .recap_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Recap not found"))?;

    Ok(Json(ApiResponse::ok("Recap fetched successfully", recap)))
}

/// Partial recap update (admin only)
pub async fn update_recap(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
    Json(patch): Json<RecapPatch>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if patch.is_empty() {
        return Err(ApiError::validation("No fields provided for update"));
    }

    let recap = state
        .recap_repository
        .apply_patch(uuid, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Recap not found"))?;

    Ok(Json(ApiResponse::ok("Recap updated successfully", recap)))
}

/// Delete a recap (admin only)
pub async fn delete_recap(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if !state.recap_repository.delete(uuid).await? {
        return Err(ApiError::not_found("Recap not found"));
    }

    Ok(Json(ApiResponse::<()>::message_only(
        "Recap deleted successfully",
    )))
}
