//! Event lifecycle engine
//!
//! Status transitions are derived from wall-clock time against the event
//! window, evaluated lazily on every event read; there is no background
//! scheduler. The planner here is pure: it mutates the in-memory view so
//! the caller can return post-transition statuses immediately, and emits
//! the writes to be committed in one batch after the read.
//!
//! Machine: `archived -> published -> ongoing -> done`. Archived events are
//! frozen until explicitly published (or edited); once published, time
//! takes over. When an event crosses its end the cascade closes any linked
//! survey still marked ongoing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::event::{Event, EventStatus};

/// Writes pending after a lazy transition pass
#[derive(Debug, Default)]
pub struct TransitionPlan {
    /// New statuses to persist, keyed by event uuid
    pub event_updates: Vec<(Uuid, EventStatus)>,
    /// Events whose linked `ongoing` surveys must be forced to `done`
    pub survey_cascade: Vec<Uuid>,
}

impl TransitionPlan {
    pub fn is_empty(&self) -> bool {
        self.event_updates.is_empty() && self.survey_cascade.is_empty()
    }
}

/// Compute status transitions for a batch of events at time `now`
///
/// Events are updated in place; the returned plan carries the matching
/// store writes. Statuses only ever move forward here.
pub fn plan_transitions(events: &mut [Event], now: DateTime<Utc>) -> TransitionPlan {
    let mut plan = TransitionPlan::default();

    for event in events.iter_mut() {
        if event.status == EventStatus::Archived {
            continue;
        }

        if now >= event.time_end && event.status != EventStatus::Done {
            event.status = EventStatus::Done;
            plan.event_updates.push((event.uuid, EventStatus::Done));
            plan.survey_cascade.push(event.uuid);
        } else if now >= event.time_start
            && !matches!(event.status, EventStatus::Ongoing | EventStatus::Done)
        {
            event.status = EventStatus::Ongoing;
            plan.event_updates.push((event.uuid, EventStatus::Ongoing));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event(status: EventStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event {
            id: 1,
            uuid: Uuid::new_v4(),
            name: "conference".to_string(),
            description: None,
            time_start: start,
            time_end: end,
            status,
            created_at: start,
            updated_at: start,
        }
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        (start, start + Duration::hours(8))
    }

    #[test]
    fn published_event_follows_the_clock() {
        let (start, end) = window();
        let mut events = vec![event(EventStatus::Published, start, end)];

        // before the window: untouched
        let plan = plan_transitions(&mut events, start - Duration::hours(1));
        assert!(plan.is_empty());
        assert_eq!(events[0].status, EventStatus::Published);

        // inside the window: ongoing
        let plan = plan_transitions(&mut events, start + Duration::hours(1));
        assert_eq!(events[0].status, EventStatus::Ongoing);
        assert_eq!(plan.event_updates, vec![(events[0].uuid, EventStatus::Ongoing)]);
        assert!(plan.survey_cascade.is_empty());

        // past the window: done, with the survey cascade scheduled
        let plan = plan_transitions(&mut events, end + Duration::hours(1));
        assert_eq!(events[0].status, EventStatus::Done);
        assert_eq!(plan.survey_cascade, vec![events[0].uuid]);
    }

    #[test]
    fn boundary_instants_count_as_crossed() {
        let (start, end) = window();

        let mut events = vec![event(EventStatus::Published, start, end)];
        plan_transitions(&mut events, start);
        assert_eq!(events[0].status, EventStatus::Ongoing);

        let mut events = vec![event(EventStatus::Ongoing, start, end)];
        plan_transitions(&mut events, end);
        assert_eq!(events[0].status, EventStatus::Done);
    }

    #[test]
    fn archived_events_never_auto_transition() {
        let (start, end) = window();
        let mut events = vec![event(EventStatus::Archived, start, end)];

        for now in [start - Duration::hours(1), start, end + Duration::days(30)] {
            let plan = plan_transitions(&mut events, now);
            assert!(plan.is_empty());
            assert_eq!(events[0].status, EventStatus::Archived);
        }
    }

    #[test]
    fn published_event_past_end_jumps_straight_to_done() {
        let (start, end) = window();
        let mut events = vec![event(EventStatus::Published, start, end)];

        let plan = plan_transitions(&mut events, end + Duration::minutes(1));
        assert_eq!(events[0].status, EventStatus::Done);
        assert_eq!(plan.event_updates.len(), 1);
        assert_eq!(plan.survey_cascade, vec![events[0].uuid]);
    }

    #[test]
    fn done_is_terminal() {
        let (start, end) = window();
        let mut events = vec![event(EventStatus::Done, start, end)];

        let plan = plan_transitions(&mut events, end + Duration::days(1));
        assert!(plan.is_empty());
        assert_eq!(events[0].status, EventStatus::Done);
    }

    #[test]
    fn batch_pass_handles_mixed_statuses() {
        let (start, end) = window();
        let mut events = vec![
            event(EventStatus::Archived, start, end),
            event(EventStatus::Published, start, end),
            event(EventStatus::Ongoing, start, end),
            event(EventStatus::Done, start, end),
        ];

        let plan = plan_transitions(&mut events, end + Duration::hours(1));

        assert_eq!(events[0].status, EventStatus::Archived);
        assert_eq!(events[1].status, EventStatus::Done);
        assert_eq!(events[2].status, EventStatus::Done);
        assert_eq!(events[3].status, EventStatus::Done);

        assert_eq!(plan.event_updates.len(), 2);
        assert_eq!(plan.survey_cascade.len(), 2);
    }
}
