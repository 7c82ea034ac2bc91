//! Survey repository for database operations

use anyhow::{Result, anyhow};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::survey::{CreateSurveyRequest, Survey, SurveyPatch, SurveyStatus};

const SURVEY_COLUMNS: &str = "id, uuid, name, form, setpoint, status, created_at, updated_at";

// Qualified variant for joined queries where column names would be ambiguous.
const SURVEY_COLUMNS_S: &str =
    "s.id, s.uuid, s.name, s.form, s.setpoint, s.status, s.created_at, s.updated_at";

fn map_survey(row: &PgRow) -> Result<Survey> {
    let status: String = row.get("status");

    Ok(Survey {
        id: row.get("id"),
        uuid: row.get("uuid"),
        name: row.get("name"),
        form: row.get("form"),
        setpoint: row.get("setpoint"),
        status: status.parse::<SurveyStatus>().map_err(|e| anyhow!(e))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Survey repository
#[derive(Clone)]
pub struct SurveyRepository {
    pool: PgPool,
}

impl SurveyRepository {
    /// Create a new survey repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every survey (admin view)
    pub async fn list_all(&self) -> Result<Vec<Survey>> {
        let rows = sqlx::query(&format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_survey).collect()
    }

    /// List surveys a plain user may answer
    ///
    /// Only surveys that are themselves ongoing and whose owning event is
    /// currently ongoing are visible.
    pub async fn list_open(&self) -> Result<Vec<Survey>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT DISTINCT {SURVEY_COLUMNS_S} FROM surveys s
            JOIN event_surveys es ON es.survey_id = s.id
            JOIN events e ON e.id = es.event_id
            WHERE e.status = 'ongoing' AND s.status = 'ongoing'
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_survey).collect()
    }

    /// Find a survey by its external identifier (admin view)
    pub async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Survey>> {
        let row = sqlx::query(&format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys WHERE uuid = $1",
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_survey).transpose()
    }

    /// Find a survey only if it is open to plain users
    pub async fn find_open_by_uuid(&self, uuid: Uuid) -> Result<Option<Survey>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT DISTINCT {SURVEY_COLUMNS_S} FROM surveys s
            JOIN event_surveys es ON es.survey_id = s.id
            JOIN events e ON e.id = es.event_id
            WHERE s.uuid = $1 AND e.status = 'ongoing' AND s.status = 'ongoing'
            "#,
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_survey).transpose()
    }

    /// Create a survey in the draft state
    ///
    /// `form` is the already-parsed JSON blob from the request payload.
    pub async fn create(
        &self,
        payload: &CreateSurveyRequest,
        form: Option<serde_json::Value>,
    ) -> Result<Survey> {
        info!("Creating survey: {}", payload.name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO surveys (uuid, name, form, setpoint, status)
            VALUES ($1, $2, $3, $4, 'draft')
            RETURNING {SURVEY_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&payload.name)
        .bind(form)
        .bind(payload.setpoint)
        .fetch_one(&self.pool)
        .await?;

        map_survey(&row)
    }

    /// Apply a partial update to a survey
    pub async fn apply_patch(
        &self,
        uuid: Uuid,
        patch: &SurveyPatch,
        form: Option<serde_json::Value>,
    ) -> Result<Option<Survey>> {
        info!("Updating survey {}", uuid);

        let row = sqlx::query(&format!(
            r#"
            UPDATE surveys SET
                name = COALESCE($1, name),
                form = COALESCE($2, form),
                setpoint = COALESCE($3, setpoint),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE uuid = $5
            RETURNING {SURVEY_COLUMNS}
            "#,
        ))
        .bind(&patch.name)
        .bind(form)
        .bind(patch.setpoint)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_survey).transpose()
    }

    /// Whether a survey is already linked to an event
    pub async fn is_linked(&self, event_id: i64, survey_id: i64) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM event_surveys WHERE event_id = $1 AND survey_id = $2",
        )
        .bind(event_id)
        .bind(survey_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Link a survey to an event
    ///
    /// When the event is already ongoing the survey is promoted to ongoing
    /// in the same transaction, so it becomes answerable immediately.
    pub async fn link_to_event(
        &self,
        event_id: i64,
        survey_id: i64,
        event_is_ongoing: bool,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO event_surveys (event_id, survey_id) VALUES ($1, $2)")
            .bind(event_id)
            .bind(survey_id)
            .execute(&mut *tx)
            .await?;

        if event_is_ongoing {
            sqlx::query("UPDATE surveys SET status = 'ongoing', updated_at = NOW() WHERE id = $1")
                .bind(survey_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
