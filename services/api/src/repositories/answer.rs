//! Answer repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::answer::Answer;

const ANSWER_SELECT: &str = r#"
    SELECT a.uuid, a.answer_data, a.created_at, a.updated_at,
           uu.uuid AS user_uuid, gg.uuid AS group_uuid, ee.uuid AS event_uuid
    FROM answers a
    LEFT JOIN answer_users au ON au.answer_id = a.id
    LEFT JOIN users uu ON uu.id = au.user_id
    LEFT JOIN answer_groups ag ON ag.answer_id = a.id
    LEFT JOIN groups gg ON gg.id = ag.group_id
    LEFT JOIN answer_events ae ON ae.answer_id = a.id
    LEFT JOIN events ee ON ee.id = ae.event_id
"#;

fn map_answer(row: &PgRow) -> Answer {
    Answer {
        uuid: row.get("uuid"),
        answer_data: row.get("answer_data"),
        user_uuid: row.get("user_uuid"),
        group_uuid: row.get("group_uuid"),
        event_uuid: row.get("event_uuid"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Answer repository
#[derive(Clone)]
pub struct AnswerRepository {
    pool: PgPool,
}

impl AnswerRepository {
    /// Create a new answer repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an answer and its user/group/event links in one transaction
    pub async fn create(
        &self,
        answer_data: &str,
        user_id: i64,
        group_id: i64,
        event_id: i64,
    ) -> Result<Uuid> {
        let uuid = Uuid::new_v4();
        info!("Creating answer {}", uuid);

        let mut tx = self.pool.begin().await?;

        let answer_id: i64 = sqlx::query_scalar(
            "INSERT INTO answers (uuid, answer_data) VALUES ($1, $2) RETURNING id",
        )
        .bind(uuid)
        .bind(answer_data)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO answer_users (answer_id, user_id) VALUES ($1, $2)")
            .bind(answer_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO answer_groups (answer_id, group_id) VALUES ($1, $2)")
            .bind(answer_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO answer_events (answer_id, event_id) VALUES ($1, $2)")
            .bind(answer_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(uuid)
    }

    /// List all answers, newest first
    pub async fn list_all(&self) -> Result<Vec<Answer>> {
        let rows = sqlx::query(&format!("{ANSWER_SELECT} ORDER BY a.created_at DESC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_answer).collect())
    }

    /// Find an answer by its external identifier
    pub async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Answer>> {
        let row = sqlx::query(&format!("{ANSWER_SELECT} WHERE a.uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_answer))
    }

    /// Replace the answer payload; returns whether the uuid resolved
    pub async fn update_data(&self, uuid: Uuid, answer_data: &str) -> Result<bool> {
        info!("Updating answer {}", uuid);

        let result =
            sqlx::query("UPDATE answers SET answer_data = $1, updated_at = NOW() WHERE uuid = $2")
                .bind(answer_data)
                .bind(uuid)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an answer, cascading through all its association rows
    pub async fn delete(&self, uuid: Uuid) -> Result<bool> {
        info!("Deleting answer {}", uuid);

        let mut tx = self.pool.begin().await?;

        let answer_id: Option<i64> = sqlx::query_scalar("SELECT id FROM answers WHERE uuid = $1")
            .bind(uuid)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(answer_id) = answer_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM answer_users WHERE answer_id = $1")
            .bind(answer_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM answer_groups WHERE answer_id = $1")
            .bind(answer_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM answer_events WHERE answer_id = $1")
            .bind(answer_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(answer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
