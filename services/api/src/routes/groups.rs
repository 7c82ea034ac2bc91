//! Group handlers: CRUD, membership, and roster import

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::ApiResponse;
use crate::models::group::{CreateGroupRequest, GroupPatch};
use crate::policy;
use crate::roster::parse_roster;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/:uuid", get(get_group).patch(update_group).delete(delete_group))
        .route("/upload/users/:uuid", post(upload_roster))
        .route("/:uuid/assign_user/:user_uuid", post(assign_user))
        .route("/:uuid/remove_user/:user_uuid", delete(remove_user))
}

/// List all groups
pub async fn list_groups(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let groups = state.group_repository.list_all().await?;
    Ok(Json(ApiResponse::ok("Groups fetched successfully", groups)))
}

/// Fetch a single group
pub async fn get_group(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let group = state
        .group_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    Ok(Json(ApiResponse::ok("Group fetched successfully", group)))
}

/// Create a group
pub async fn create_group(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Group name cannot be empty"));
    }

    let group = state.group_repository.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Group created successfully", group)),
    ))
}

/// Update a group; frozen while it is part of a started event
pub async fn update_group(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
    Json(patch): Json<GroupPatch>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if patch.is_empty() {
        return Err(ApiError::validation("No fields provided for update"));
    }

    let group = state
        .group_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    if state.group_repository.is_in_locked_event(group.id).await? {
        return Err(ApiError::conflict(
            "Cannot modify a group while it is part of an ongoing or completed event",
        ));
    }

    let updated = state
        .group_repository
        .apply_patch(uuid, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    Ok(Json(ApiResponse::ok("Group updated successfully", updated)))
}

/// Delete a group; requires zero members
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let group = state
        .group_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    if state.group_repository.member_count(group.id).await? > 0 {
        return Err(ApiError::conflict(
            "Cannot delete group: users are still assigned to it",
        ));
    }

    state.group_repository.delete(group.id).await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "Group deleted successfully",
    )))
}

/// Bulk-import member accounts from a multipart roster file
///
/// The roster is one CSV file field; rows whose email already exists are
/// skipped, everything else lands in a single all-or-nothing batch.
pub async fn upload_roster(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let group = state
        .group_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    let mut file_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Could not read roster file: {}", e)))?;
            file_bytes = Some(bytes);
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| ApiError::validation("Missing roster file field 'file'"))?;

    let rows = parse_roster(&file_bytes).map_err(ApiError::validation)?;

    let report = state.group_repository.import_roster(group.id, &rows).await?;

    Ok(Json(ApiResponse::ok(
        "Users inserted and assigned to group successfully",
        report,
    )))
}

/// Add a user to a group; frozen while the group is in a started event
pub async fn assign_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((uuid, user_uuid)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let group = state
        .group_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    if state.group_repository.is_in_locked_event(group.id).await? {
        return Err(ApiError::conflict(
            "Cannot assign a user to a group that is in an ongoing or completed event",
        ));
    }

    let user = state
        .user_repository
        .find_by_uuid(user_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if state.group_repository.is_member(group.id, user.id).await? {
        return Err(ApiError::conflict("User already assigned to this group"));
    }

    state.group_repository.add_member(group.id, user.id).await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "User assigned to group successfully",
    )))
}

/// Remove a user from a group; same freeze as assignment
pub async fn remove_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((uuid, user_uuid)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    let group = state
        .group_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    if state.group_repository.is_in_locked_event(group.id).await? {
        return Err(ApiError::conflict(
            "Cannot remove a user from a group that is in an ongoing or completed event",
        ));
    }

    let user = state
        .user_repository
        .find_by_uuid(user_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !state.group_repository.remove_member(group.id, user.id).await? {
        return Err(ApiError::not_found("User is not assigned to this group"));
    }

    Ok(Json(ApiResponse::<()>::message_only(
        "User removed from group successfully",
    )))
}
