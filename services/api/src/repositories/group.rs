//! Group repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::group::{CreateGroupRequest, Group, GroupPatch, RosterImportReport};
use crate::repositories::user::hash_password;
use crate::roster::RosterRow;

const GROUP_COLUMNS: &str = "id, uuid, name, description, created_at, updated_at";

fn map_group(row: &PgRow) -> Group {
    Group {
        id: row.get("id"),
        uuid: row.get("uuid"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Group repository
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new group repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all groups
    pub async fn list_all(&self) -> Result<Vec<Group>> {
        let rows = sqlx::query(&format!("SELECT {GROUP_COLUMNS} FROM groups ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_group).collect())
    }

    /// Find a group by its external identifier
    pub async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Group>> {
        let row = sqlx::query(&format!("SELECT {GROUP_COLUMNS} FROM groups WHERE uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_group))
    }

    /// Create a new group
    pub async fn create(&self, payload: &CreateGroupRequest) -> Result<Group> {
        info!("Creating group: {}", payload.name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO groups (uuid, name, description)
            VALUES ($1, $2, $3)
            RETURNING {GROUP_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_group(&row))
    }

    /// Apply a partial update to a group
    pub async fn apply_patch(&self, uuid: Uuid, patch: &GroupPatch) -> Result<Option<Group>> {
        info!("Updating group {}", uuid);

        let row = sqlx::query(&format!(
            r#"
            UPDATE groups SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                updated_at = NOW()
            WHERE uuid = $3
            RETURNING {GROUP_COLUMNS}
            "#,
        ))
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_group))
    }

    /// Delete a group; the caller has verified it has no members
    pub async fn delete(&self, group_id: i64) -> Result<()> {
        info!("Deleting group id {}", group_id);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM event_groups WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Number of users currently in the group
    pub async fn member_count(&self, group_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Whether the group is linked to any event that has already started
    ///
    /// Membership and group edits are frozen while any linked event is
    /// ongoing or done.
    pub async fn is_in_locked_event(&self, group_id: i64) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS present FROM events e
            JOIN event_groups eg ON eg.event_id = e.id
            WHERE eg.group_id = $1 AND e.status IN ('ongoing', 'done')
            LIMIT 1
            "#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Whether a user is a member of the group
    pub async fn is_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let row =
            sqlx::query("SELECT 1 AS present FROM group_members WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Add a user to the group
    pub async fn add_member(&self, group_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove a user from the group; returns whether a row was removed
    pub async fn remove_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Import roster rows as new member accounts
    ///
    /// One transaction for the whole batch: rows whose email already exists
    /// are skipped (idempotent re-import), every other row becomes an
    /// active `user`-role account linked to the group. A failure anywhere
    /// rolls the entire batch back.
    pub async fn import_roster(
        &self,
        group_id: i64,
        rows: &[RosterRow],
    ) -> Result<RosterImportReport> {
        info!("Importing {} roster row(s) into group id {}", rows.len(), group_id);

        let mut tx = self.pool.begin().await?;
        let mut report = RosterImportReport {
            created: 0,
            skipped: 0,
        };

        for row in rows {
            let existing = sqlx::query("SELECT 1 AS present FROM users WHERE email = $1")
                .bind(&row.email)
                .fetch_optional(&mut *tx)
                .await?;

            if existing.is_some() {
                report.skipped += 1;
                continue;
            }

            let password_hash = hash_password(&row.password)?;

            let user_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO users (uuid, username, email, password_hash, role, status)
                VALUES ($1, $2, $3, $4, 'user', 'active')
                RETURNING id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&row.username)
            .bind(&row.email)
            .bind(&password_hash)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
                .bind(group_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

            report.created += 1;
        }

        tx.commit().await?;
        Ok(report)
    }
}
