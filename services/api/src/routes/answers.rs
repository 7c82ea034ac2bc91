//! Answer handlers

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
use crate::models::answer::{AnswerPatch, CreateAnswerRequest};
use crate::policy;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_answers).post(create_answer))
        .route(
            "/:uuid",
            get(get_answer).patch(update_answer).delete(delete_answer),
        )
}

/// Submit an answer, linking it to its user, group, and event
pub async fn create_answer(
    State(state): State<AppState>,
    Json(payload): Json<CreateAnswerRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_uuid(payload.user_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let group = state
        .group_repository
        .find_by_uuid(payload.group_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;
    let event = state
        .event_repository
        .find_by_uuid(payload.event_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    let uuid = state
        .answer_repository
        .create(&payload.answer_data, user.id, group.id, event.id)
        .await?;

    let answer = state
        .answer_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or(ApiError::Internal)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Answer created successfully", answer)),
    ))
}

/// List all answers, newest first
pub async fn list_answers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let answers = state.answer_repository.list_all().await?;
    Ok(Json(ApiResponse::ok("Answers retrieved successfully", answers)))
}

/// Fetch a single answer
pub async fn get_answer(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let answer = state
        .answer_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Answer not found"))?;

    Ok(Json(ApiResponse::ok("Answer retrieved successfully", answer)))
}

/// Replace an answer's payload (admin only)
pub async fn update_answer(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
    Json(patch): Json<AnswerPatch>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if !state
        .answer_repository
        .update_data(uuid, &patch.answer_data)
        .await?
    {
        return Err(ApiError::not_found("Answer not found"));
    }

    Ok(Json(ApiResponse::<()>::message_only(
        "Answer updated successfully",
    )))
}

/// Delete an answer and all its association rows (admin only)
pub async fn delete_answer(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if !state.answer_repository.delete(uuid).await? {
        return Err(ApiError::not_found("Answer not found"));
    }

    Ok(Json(ApiResponse::<()>::message_only(
        "Answer deleted successfully",
    )))
}
