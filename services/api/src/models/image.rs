//! Uploaded image metadata

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata row for an uploaded file
#[derive(Debug, Clone, Serialize)]
pub struct ImageMetadata {
    pub id: i64,
    pub name: String,
    pub file_hash: String,
    pub file_original: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
