//! Answer model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answer as returned to callers, with its linked references resolved to
/// UUIDs. The association rows are left-joined, so a reference may be
/// absent if a link row was removed out of band.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub uuid: Uuid,
    pub answer_data: String,
    pub user_uuid: Option<Uuid>,
    pub group_uuid: Option<Uuid>,
    pub event_uuid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for answer submission
#[derive(Debug, Deserialize)]
pub struct CreateAnswerRequest {
    pub answer_data: String,
    pub user_uuid: Uuid,
    pub group_uuid: Uuid,
    pub event_uuid: Uuid,
}

/// Answer update; only the payload is replaceable
#[derive(Debug, Deserialize)]
pub struct AnswerPatch {
    pub answer_data: String,
}
