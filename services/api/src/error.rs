//! Error taxonomy for the API service
//!
//! One envelope, one set of status codes, applied uniformly: 401 for
//! missing/invalid/revoked credentials, 403 for policy denials, 404 for
//! anything the actor cannot see (existence is never leaked), 409 for
//! duplicate keys and illegal state transitions, 400 for malformed input.
//! Store failures surface as a generic 500 with the detail logged.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, malformed, expired, or revoked credentials
    #[error("{0}")]
    Unauthenticated(String),

    /// The actor may see the resource but not perform the operation
    #[error("{0}")]
    Forbidden(String),

    /// The resource does not resolve, or is outside the actor's visibility
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique field, illegal state transition, or non-empty dependency
    #[error("{0}")]
    Conflict(String),

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// Internal server error; detail is logged, never returned
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        ApiError::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("internal error: {:#}", err);
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        let cases = [
            (ApiError::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (ApiError::forbidden("x"), StatusCode::FORBIDDEN),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::conflict("x"), StatusCode::CONFLICT),
            (ApiError::validation("x"), StatusCode::BAD_REQUEST),
            (ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_error_hides_detail() {
        let err: ApiError = anyhow::anyhow!("connection refused to 10.0.0.1").into();
        assert_eq!(err.to_string(), "Internal server error");
    }
}
