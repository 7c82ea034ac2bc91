//! Recap model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recap entity as stored
#[derive(Debug, Clone, Serialize)]
pub struct Recap {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub summarize: Option<String>,
    pub history_chat: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for recap creation
#[derive(Debug, Deserialize)]
pub struct CreateRecapRequest {
    pub name: String,
    pub summarize: Option<String>,
    pub history_chat: Option<String>,
}

/// Partial recap update
#[derive(Debug, Default, Deserialize)]
pub struct RecapPatch {
    pub name: Option<String>,
    pub summarize: Option<String>,
    pub history_chat: Option<String>,
}

impl RecapPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.summarize.is_none() && self.history_chat.is_none()
    }
}
