//! Recap repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::recap::{CreateRecapRequest, Recap, RecapPatch};

const RECAP_COLUMNS: &str = "id, uuid, name, summarize, history_chat, created_at, updated_at";

fn map_recap(row: &PgRow) -> Recap {
    Recap {
        id: row.get("id"),
        uuid: row.get("uuid"),
        name: row.get("name"),
        summarize: row.get("summarize"),
        history_chat: row.get("history_chat"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Recap repository
#[derive(Clone)]
pub struct RecapRepository {
    pool: PgPool,
}

impl RecapRepository {
    /// Create a new recap repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new recap
    pub async fn create(&self, payload: &CreateRecapRequest) -> Result<Recap> {
        info!("Creating recap: {}", payload.name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO recaps (uuid, name, summarize, history_chat)
            VALUES ($1, $2, $3, $4)
            RETURNING {RECAP_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&payload.name)
        .bind(&payload.summarize)
        .bind(&payload.history_chat)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_recap(&row))
    }

    /// List all recaps, newest first
    pub async fn list_all(&self) -> Result<Vec<Recap>> {
        let rows = sqlx::query(&format!(
            "SELECT {RECAP_COLUMNS} FROM recaps ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_recap).collect())
    }

    /// Find a recap by its external identifier
    pub async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Recap>> {
        let row = sqlx::query(&format!("SELECT {RECAP_COLUMNS} FROM recaps WHERE uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_recap))
    }

    /// Apply a partial update to a recap
    pub async fn apply_patch(&self, uuid: Uuid, patch: &RecapPatch) -> Result<Option<Recap>> {
        info!("Updating recap {}", uuid);

        let row = sqlx::query(&format!(
            r#"
            UPDATE recaps SET
                name = COALESCE($1, name),
                summarize = COALESCE($2, summarize),
                history_chat = COALESCE($3, history_chat),
                updated_at = NOW()
            WHERE uuid = $4
            RETURNING {RECAP_COLUMNS}
            "#,
        ))
        .bind(&patch.name)
        .bind(&patch.summarize)
        .bind(&patch.history_chat)
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_recap))
    }

    /// Delete a recap; returns whether the uuid resolved
    pub async fn delete(&self, uuid: Uuid) -> Result<bool> {
        info!("Deleting recap {}", uuid);

        let result = sqlx::query("DELETE FROM recaps WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
