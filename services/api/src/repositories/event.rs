//! Event repository for database operations

use anyhow::{Result, anyhow};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::lifecycle::{TransitionPlan, plan_transitions};
use crate::models::event::{CreateEventRequest, Event, EventPatch, EventStatus};
use crate::models::user::Role;

const EVENT_COLUMNS: &str =
    "id, uuid, name, description, time_start, time_end, status, created_at, updated_at";

// Qualified variant for joined queries where column names would be ambiguous.
const EVENT_COLUMNS_E: &str = "e.id, e.uuid, e.name, e.description, e.time_start, e.time_end, \
     e.status, e.created_at, e.updated_at";

fn map_event(row: &PgRow) -> Result<Event> {
    let status: String = row.get("status");

    Ok(Event {
        id: row.get("id"),
        uuid: row.get("uuid"),
        name: row.get("name"),
        description: row.get("description"),
        time_start: row.get("time_start"),
        time_end: row.get("time_end"),
        status: status.parse::<EventStatus>().map_err(|e| anyhow!(e))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Event repository
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List events visible to an actor
    ///
    /// Superadmin sees everything; admin sees the events they own; a plain
    /// user sees the events assigned to a group they belong to.
    pub async fn list_for(&self, role: Role, user_id: i64) -> Result<Vec<Event>> {
        let rows = match role {
            Role::Superadmin => {
                sqlx::query(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events ORDER BY time_start",
                ))
                .fetch_all(&self.pool)
                .await?
            }
            Role::Admin => {
                sqlx::query(&format!(
                    r#"
                    SELECT {EVENT_COLUMNS} FROM events e
                    WHERE EXISTS (
                        SELECT 1 FROM event_owners eo
                        WHERE eo.event_id = e.id AND eo.user_id = $1
                    )
                    ORDER BY time_start
                    "#,
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            Role::User => {
                sqlx::query(&format!(
                    r#"
                    SELECT DISTINCT {EVENT_COLUMNS_E} FROM events e
                    JOIN event_groups eg ON eg.event_id = e.id
                    JOIN group_members gm ON gm.group_id = eg.group_id
                    WHERE gm.user_id = $1
                    ORDER BY e.time_start
                    "#,
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(map_event).collect()
    }

    /// Find an event regardless of visibility (internal use)
    pub async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE uuid = $1",
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_event).transpose()
    }

    /// Find an event only if the actor is allowed to see it
    pub async fn find_visible_by_uuid(
        &self,
        uuid: Uuid,
        role: Role,
        user_id: i64,
    ) -> Result<Option<Event>> {
        if role.is_admin() {
            let event = self.find_by_uuid(uuid).await?;
            if role == Role::Admin {
                // admins only see the events they own
                if let Some(event) = &event {
                    if !self.is_owner(event.id, user_id).await? {
                        return Ok(None);
                    }
                }
            }
            return Ok(event);
        }

        let row = sqlx::query(&format!(
            r#"
            SELECT DISTINCT {EVENT_COLUMNS_E} FROM events e
            JOIN event_groups eg ON eg.event_id = e.id
            JOIN group_members gm ON gm.group_id = eg.group_id
            WHERE e.uuid = $1 AND gm.user_id = $2
            "#,
        ))
        .bind(uuid)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_event).transpose()
    }

    async fn is_owner(&self, event_id: i64, user_id: i64) -> Result<bool> {
        let row =
            sqlx::query("SELECT 1 AS present FROM event_owners WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Create an event in the archived state, recording its owner
    pub async fn create(&self, payload: &CreateEventRequest, owner_id: i64) -> Result<Event> {
        info!("Creating event: {}", payload.name);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO events (uuid, name, description, time_start, time_end, status)
            VALUES ($1, $2, $3, $4, $5, 'archived')
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.time_start)
        .bind(payload.time_end)
        .fetch_one(&mut *tx)
        .await?;

        let event = map_event(&row)?;

        sqlx::query("INSERT INTO event_owners (event_id, user_id) VALUES ($1, $2)")
            .bind(event.id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(event)
    }

    /// Apply a partial update and reset the event to archived
    ///
    /// The caller has already verified the event is archived; the reset is
    /// still written unconditionally so an edit always invalidates any
    /// publication.
    pub async fn apply_patch(&self, uuid: Uuid, patch: &EventPatch) -> Result<Option<Event>> {
        info!("Updating event {}", uuid);

        let row = sqlx::query(&format!(
            r#"
            UPDATE events SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                time_start = COALESCE($3, time_start),
                time_end = COALESCE($4, time_end),
                status = 'archived',
                updated_at = NOW()
            WHERE uuid = $5
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(patch.time_start)
        .bind(patch.time_end)
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_event).transpose()
    }

    /// Persist a single status change
    pub async fn set_status(&self, uuid: Uuid, status: EventStatus) -> Result<()> {
        sqlx::query("UPDATE events SET status = $1, updated_at = NOW() WHERE uuid = $2")
            .bind(status.as_str())
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Commit a lazy transition pass in one batch
    ///
    /// Event status writes and the survey cascade land in a single
    /// transaction, after the read that computed them has already returned
    /// the post-transition view.
    pub async fn apply_transition_plan(&self, plan: &TransitionPlan) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }

        info!(
            "Committing {} event transition(s), {} cascade(s)",
            plan.event_updates.len(),
            plan.survey_cascade.len()
        );

        let mut tx = self.pool.begin().await?;

        for (uuid, status) in &plan.event_updates {
            sqlx::query("UPDATE events SET status = $1, updated_at = NOW() WHERE uuid = $2")
                .bind(status.as_str())
                .bind(uuid)
                .execute(&mut *tx)
                .await?;
        }

        for event_uuid in &plan.survey_cascade {
            sqlx::query(
                r#"
                UPDATE surveys SET status = 'done', updated_at = NOW()
                WHERE status = 'ongoing' AND id IN (
                    SELECT es.survey_id FROM event_surveys es
                    JOIN events e ON es.event_id = e.id
                    WHERE e.uuid = $1
                )
                "#,
            )
            .bind(event_uuid)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Run the lazy transition pass over a single event
    ///
    /// Recomputes the status against the clock, commits any resulting
    /// writes, and hands back the post-transition view. Mutating handlers
    /// call this before gating on status.
    pub async fn refresh(&self, mut event: Event) -> Result<Event> {
        let plan = plan_transitions(std::slice::from_mut(&mut event), chrono::Utc::now());
        self.apply_transition_plan(&plan).await?;
        Ok(event)
    }

    /// Whether any answers still reference this event
    pub async fn has_answer_links(&self, event_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS present FROM answer_events WHERE event_id = $1 LIMIT 1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Delete an event and its association rows
    pub async fn delete(&self, event_id: i64) -> Result<()> {
        info!("Deleting event id {}", event_id);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM event_groups WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM event_surveys WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM event_owners WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Whether a group is already linked to an event
    pub async fn is_group_linked(&self, event_id: i64, group_id: i64) -> Result<bool> {
        let row =
            sqlx::query("SELECT 1 AS present FROM event_groups WHERE event_id = $1 AND group_id = $2")
                .bind(event_id)
                .bind(group_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Link a group to an event
    pub async fn link_group(&self, event_id: i64, group_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO event_groups (event_id, group_id) VALUES ($1, $2)")
            .bind(event_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove a group/event link; returns whether a row was removed
    pub async fn unlink_group(&self, event_id: i64, group_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM event_groups WHERE event_id = $1 AND group_id = $2")
            .bind(event_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
