//! Event handlers: CRUD, publication, and group assignment

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::lifecycle::plan_transitions;
use crate::middleware::CurrentUser;
use crate::models::ApiResponse;
use crate::models::event::{AssignGroupRequest, CreateEventRequest, EventPatch, EventStatus};
use crate::policy;
use crate::state::AppState;
use crate::validation::validate_event_window;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:uuid", get(get_event).patch(update_event).delete(delete_event))
        .route("/:uuid/publish", patch(publish_event))
        .route("/:uuid/assign_group", post(assign_group))
        .route("/:uuid/remove_group/:group_uuid", delete(remove_group))
}

/// List events visible to the actor
///
/// The lazy transition pass runs over the fetched batch; the response
/// already shows post-transition statuses while the matching writes are
/// committed right after the read.
pub async fn list_events(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let mut events = state
        .event_repository
        .list_for(current_user.role, current_user.id)
        .await?;

    let plan = plan_transitions(&mut events, Utc::now());
    state.event_repository.apply_transition_plan(&plan).await?;

    Ok(Json(ApiResponse::ok("Events fetched successfully", events)))
}

/// Fetch a single event, scoped to the actor's visibility
pub async fn get_event(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .event_repository
        .find_visible_by_uuid(uuid, current_user.role, current_user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    let event = state.event_repository.refresh(event).await?;

    Ok(Json(ApiResponse::ok("Event fetched successfully", event)))
}

/// Create an event; it starts archived
pub async fn create_event(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateEventRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Event name cannot be empty"));
    }
    validate_event_window(payload.time_start, payload.time_end).map_err(ApiError::validation)?;

    let event = state
        .event_repository
        .create(&payload, current_user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Event created successfully", event)),
    ))
}

/// Edit core fields; only legal while archived, and always resets the
/// event to archived (an edit invalidates any publication)
pub async fn update_event(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if patch.is_empty() {
        return Err(ApiError::validation("No fields provided for update"));
    }

    let event = state
        .event_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    let event = state.event_repository.refresh(event).await?;

    if event.status != EventStatus::Archived {
        return Err(ApiError::conflict("Cannot update a non-archived event"));
    }

    let time_start = patch.time_start.unwrap_or(event.time_start);
    let time_end = patch.time_end.unwrap_or(event.time_end);
    validate_event_window(time_start, time_end).map_err(ApiError::validation)?;

    let updated = state
        .event_repository
        .apply_patch(uuid, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    Ok(Json(ApiResponse::ok("Event updated successfully", updated)))
}

/// Publish an archived event (superadmin only)
pub async fn publish_event(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    policy::require_superadmin(current_user.role)?;

    let event = state
        .event_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    if event.status != EventStatus::Archived {
        return Err(ApiError::conflict("Only archived events can be published"));
    }

    state
        .event_repository
        .set_status(uuid, EventStatus::Published)
        .await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "Event published successfully",
    )))
}

/// Delete an event; blocked while answers reference it
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let event = state
        .event_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    if state.event_repository.has_answer_links(event.id).await? {
        return Err(ApiError::conflict(
            "Cannot delete an event that already has answers",
        ));
    }

    state.event_repository.delete(event.id).await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "Event deleted successfully",
    )))
}

/// Link a group to an event; frozen once the event has started
pub async fn assign_group(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<AssignGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let event = state
        .event_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    let event = state.event_repository.refresh(event).await?;

    if event.status.is_locked() {
        return Err(ApiError::conflict(
            "Cannot assign a group to an ongoing or completed event",
        ));
    }

    let group = state
        .group_repository
        .find_by_uuid(payload.group_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    if state.event_repository.is_group_linked(event.id, group.id).await? {
        return Err(ApiError::conflict("Group already assigned to this event"));
    }

    state.event_repository.link_group(event.id, group.id).await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "Group assigned to event successfully",
    )))
}

/// Unlink a group from an event; same freeze as assignment
pub async fn remove_group(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((uuid, group_uuid)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let event = state
        .event_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    let event = state.event_repository.refresh(event).await?;

    if event.status.is_locked() {
        return Err(ApiError::conflict(
            "Cannot remove a group from an ongoing or completed event",
        ));
    }

    let group = state
        .group_repository
        .find_by_uuid(group_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    if !state.event_repository.unlink_group(event.id, group.id).await? {
        return Err(ApiError::not_found("Group is not assigned to this event"));
    }

    Ok(Json(ApiResponse::<()>::message_only(
        "Group removed from event successfully",
    )))
}
