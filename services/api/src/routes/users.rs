//! User management handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::ApiResponse;
use crate::models::user::{CreateUserRequest, Role, UserPatch, UserStatus};
use crate::policy;
use crate::repositories::user::verify_password;
use crate::state::AppState;
use crate::validation::{validate_email, validate_password, validate_username};

/// Register a new user (admin and superadmin only)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    validate_username(&payload.username).map_err(ApiError::validation)?;
    validate_email(&payload.email).map_err(ApiError::validation)?;
    validate_password(&payload.password).map_err(ApiError::validation)?;

    if payload.role == Role::Superadmin {
        policy::require_superadmin(current_user.role)?;
    }

    if state.user_repository.username_taken(&payload.username).await? {
        return Err(ApiError::conflict("Username already registered"));
    }
    if state.user_repository.email_taken(&payload.email).await? {
        return Err(ApiError::conflict("Email already registered"));
    }

    let user = state.user_repository.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User created successfully", user.profile())),
    ))
}

/// Profile of the current actor
pub async fn me(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_uuid(current_user.uuid)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Could not validate credentials"))?;

    Ok(Json(ApiResponse::ok(
        "Profile fetched successfully",
        user.profile(),
    )))
}

/// Role-gated partial user update
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<impl IntoResponse> {
    if patch.is_empty() {
        return Err(ApiError::validation("No fields provided for update"));
    }

    let target = state
        .user_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let is_self = current_user.uuid == target.uuid;
    policy::authorize_user_patch(current_user.role, is_self, target.role, &patch)?;

    // Self-service password changes prove knowledge of the current one;
    // the policy layer has already required its presence.
    if current_user.role == Role::User {
        let old_password = patch.old_password.as_deref().unwrap_or_default();
        if !verify_password(&target.password_hash, old_password)? {
            return Err(ApiError::forbidden("Current password is incorrect"));
        }
    }

    if let Some(username) = &patch.username {
        validate_username(username).map_err(ApiError::validation)?;
        if username != &target.username && state.user_repository.username_taken(username).await? {
            return Err(ApiError::conflict("Username already registered"));
        }
    }
    if let Some(email) = &patch.email {
        validate_email(email).map_err(ApiError::validation)?;
        if email != &target.email && state.user_repository.email_taken(email).await? {
            return Err(ApiError::conflict("Email already registered"));
        }
    }
    if let Some(password) = &patch.password {
        validate_password(password).map_err(ApiError::validation)?;
    }

    let updated = state
        .user_repository
        .apply_patch(uuid, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::ok(
        "User updated successfully",
        updated.profile(),
    )))
}

/// Deactivate an account
pub async fn close_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let target = state
        .user_repository
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    policy::authorize_deactivation(current_user.role, target.role)?;

    if target.status == UserStatus::Inactive {
        return Err(ApiError::conflict("Account is already inactive"));
    }

    state.user_repository.deactivate(uuid).await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "Account deactivated successfully",
    )))
}
