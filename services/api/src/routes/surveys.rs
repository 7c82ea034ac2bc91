//! Survey handlers: CRUD and event assignment

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::ApiResponse;
use crate::models::event::EventStatus;
use crate::models::survey::{AssignSurveyRequest, CreateSurveyRequest, SurveyPatch};
use crate::policy;
use crate::state::AppState;
use crate::validation::parse_survey_form;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_surveys).post(create_survey))
        .route("/:uuid", get(get_survey).patch(update_survey))
        .route("/:uuid/assign_survey", post(assign_survey))
}

/// List surveys
///
/// Admins see everything; plain users only see surveys that are open for
/// answering (survey ongoing, owning event ongoing).
pub async fn list_surveys(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let surveys = if current_user.role.is_admin() {
        state.survey_repository.list_all().await?
    } else {
        state.survey_repository.list_open().await?
    };

    Ok(Json(ApiResponse::ok("Surveys fetched successfully", surveys)))
}

/// Fetch a single survey, scoped like the listing
pub async fn get_survey(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let survey = if current_user.role.is_admin() {
        state.survey_repository.find_by_uuid(uuid).await?
    } else {
        state.survey_repository.find_open_by_uuid(uuid).await?
    };

    let survey = survey.ok_or_else(|| ApiError::not_found("Survey not found"))?;

    Ok(Json(ApiResponse::ok("Survey fetched successfully", survey)))
}

/// Create a survey in the draft state
pub async fn create_survey(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateSurveyRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Survey name cannot be empty"));
    }

    let form = payload
        .form
        .as_deref()
        .map(parse_survey_form)
        .transpose()
        .map_err(ApiError::validation)?;

    let survey = state.survey_repository.create(&payload, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Survey created successfully", survey)),
    ))
}

/// Partial survey update
pub async fn update_survey(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
    Json(patch): Json<SurveyPatch>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if patch.is_empty() {
        return Err(ApiError::validation("No fields provided for update"));
    }

    let form = patch
        .form
        .as_deref()
        .map(parse_survey_form)
        .transpose()
        .map_err(ApiError::validation)?;

    let survey = state
        .survey_repository
        .apply_patch(uuid, &patch, form)
        .await?
        .ok_or_else(|| ApiError::not_found("Survey not found"))?;

    Ok(Json(ApiResponse::ok("Survey updated successfully", survey)))
}

/// Link a survey to an event
///
/// The path segment is the event uuid, matching the original surface. A
/// survey linked to an event that is already running opens immediately.
pub async fn assign_survey(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(event_uuid): Path<Uuid>,
    Json(payload): Json<AssignSurveyRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let event = state
        .event_repository
        .find_by_uuid(event_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    let event = state.event_repository.refresh(event).await?;

    let survey = state
        .survey_repository
        .find_by_uuid(payload.survey_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Survey not found"))?;

    if state.survey_repository.is_linked(event.id, survey.id).await? {
        return Err(ApiError::conflict("Survey already assigned to this event"));
    }

    state
        .survey_repository
        .link_to_event(event.id, survey.id, event.status == EventStatus::Ongoing)
        .await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "Survey assigned to event successfully",
    )))
}
