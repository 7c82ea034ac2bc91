//! Login and logout handlers

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::ApiResponse;
use crate::models::user::{LoginRequest, LoginResponse, UserStatus};
use crate::repositories::user::verify_password;
use crate::state::AppState;

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for user: {}", payload.username);

    let user = state
        .user_repository
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Incorrect username or password"))?;

    if !verify_password(&user.password_hash, &payload.password)? {
        return Err(ApiError::unauthenticated("Incorrect username or password"));
    }

    if user.status == UserStatus::Inactive {
        return Err(ApiError::forbidden("Account is inactive"));
    }

    let token = state.jwt_service.issue(&user)?;

    let response = LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.token_ttl(),
        user: user.profile(),
    };

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("Login successful", response)),
    ))
}

/// Logout endpoint
///
/// Puts the presented token on the denylist for exactly as long as it
/// would otherwise stay valid. Every later request carrying it fails
/// before signature checks even run.
pub async fn logout(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> ApiResult<impl IntoResponse> {
    info!("Logout request");

    let token = bearer.token();
    let claims = state
        .jwt_service
        .decode(token)
        .map_err(|_| ApiError::unauthenticated("Could not validate credentials"))?;

    state
        .jwt_service
        .revoke(&state.redis_pool, token, &claims)
        .await?;

    Ok(Json(ApiResponse::<()>::message_only(
        "Logged out successfully",
    )))
}
