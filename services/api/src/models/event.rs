//! Event model and lifecycle status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Event lifecycle status
///
/// `archived -> published -> ongoing -> done`. The only backward move is
/// the explicit "edit resets to archived" rule; publishing is a manual,
/// superadmin-only step while the two later transitions are derived from
/// wall-clock time against the event window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Archived,
    Published,
    Ongoing,
    Done,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Archived => "archived",
            EventStatus::Published => "published",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Done => "done",
        }
    }

    /// Group/survey assignment and membership changes are frozen once the
    /// event has started.
    pub fn is_locked(&self) -> bool {
        matches!(self, EventStatus::Ongoing | EventStatus::Done)
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "archived" => Ok(EventStatus::Archived),
            "published" => Ok(EventStatus::Published),
            "ongoing" => Ok(EventStatus::Ongoing),
            "done" => Ok(EventStatus::Done),
            other => Err(format!("unknown event status: {}", other)),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event entity as stored
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for event creation
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: Option<String>,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
}

/// Partial event update; only legal while the event is archived
#[derive(Debug, Default, Deserialize)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.time_start.is_none()
            && self.time_end.is_none()
    }
}

/// Request payload for linking a group to an event
#[derive(Debug, Deserialize)]
pub struct AssignGroupRequest {
    pub group_uuid: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            EventStatus::Archived,
            EventStatus::Published,
            EventStatus::Ongoing,
            EventStatus::Done,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<EventStatus>().is_err());
    }

    #[test]
    fn assignment_is_locked_once_started() {
        assert!(!EventStatus::Archived.is_locked());
        assert!(!EventStatus::Published.is_locked());
        assert!(EventStatus::Ongoing.is_locked());
        assert!(EventStatus::Done.is_locked());
    }
}
