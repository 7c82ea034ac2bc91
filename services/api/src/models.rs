//! API models for entities, request and response payloads

use serde::Serialize;

pub mod answer;
pub mod customer;
pub mod event;
pub mod group;
pub mod image;
pub mod recap;
pub mod survey;
pub mod user;

/// Uniform response envelope
///
/// Every endpoint answers with the same shape: `success`, a human-readable
/// `message`, and an optional `data` payload. Error responses use the same
/// envelope through `ApiError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
