//! Survey model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Survey status
///
/// A survey starts as a draft, is promoted to `ongoing` when assigned to an
/// event that has started, and is forced to `done` when its owning event
/// passes its end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Draft,
    Ongoing,
    Done,
}

impl SurveyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyStatus::Draft => "draft",
            SurveyStatus::Ongoing => "ongoing",
            SurveyStatus::Done => "done",
        }
    }
}

impl FromStr for SurveyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SurveyStatus::Draft),
            "ongoing" => Ok(SurveyStatus::Ongoing),
            "done" => Ok(SurveyStatus::Done),
            other => Err(format!("unknown survey status: {}", other)),
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Survey entity as stored
#[derive(Debug, Clone, Serialize)]
pub struct Survey {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    /// Form definition, an arbitrary JSON blob
    pub form: Option<serde_json::Value>,
    pub setpoint: Option<i32>,
    pub status: SurveyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for survey creation
///
/// The form arrives as a JSON string and must parse; an unparsable blob is
/// a validation error, not a silently stored string.
#[derive(Debug, Deserialize)]
pub struct CreateSurveyRequest {
    pub name: String,
    pub form: Option<String>,
    pub setpoint: Option<i32>,
}

/// Partial survey update
#[derive(Debug, Default, Deserialize)]
pub struct SurveyPatch {
    pub name: Option<String>,
    pub form: Option<String>,
    pub setpoint: Option<i32>,
    pub status: Option<SurveyStatus>,
}

impl SurveyPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.form.is_none()
            && self.setpoint.is_none()
            && self.status.is_none()
    }
}

/// Request payload for linking a survey to an event
#[derive(Debug, Deserialize)]
pub struct AssignSurveyRequest {
    pub survey_uuid: Uuid,
}
