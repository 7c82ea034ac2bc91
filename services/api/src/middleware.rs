//! Authentication middleware
//!
//! Resolves the bearer token on every protected request. The denylist is
//! consulted first: a revoked token is dead even while its signature and
//! expiry would still verify. After decoding, the live user record is
//! re-fetched so role and status changes take effect immediately rather
//! than at the next login.

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::user::{Role, UserStatus};
use crate::state::AppState;

/// The authenticated actor, resolved from the live user record
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub uuid: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthenticated("Missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthenticated("Invalid authorization header"))?;

    // Denylist first: revocation outlives any validity the claims may have.
    if state.jwt_service.is_revoked(&state.redis_pool, token).await? {
        return Err(ApiError::unauthenticated("Token has been revoked"));
    }

    let claims = state
        .jwt_service
        .decode(token)
        .map_err(|_| ApiError::unauthenticated("Could not validate credentials"))?;

    let user = state
        .user_repository
        .find_by_uuid(claims.uid)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Could not validate credentials"))?;

    if user.status == UserStatus::Inactive {
        return Err(ApiError::forbidden("Account is inactive"));
    }

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        uuid: user.uuid,
        username: user.username,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(req).await)
}
