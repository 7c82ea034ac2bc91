//! User repository for database operations

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::user::{CreateUserRequest, Role, User, UserPatch, UserStatus};

const USER_COLUMNS: &str =
    "id, uuid, username, email, password_hash, role, status, created_at, updated_at";

/// Hash a raw password with Argon2
pub fn hash_password(raw: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(raw.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Verify a raw password against a stored hash
pub fn verify_password(stored_hash: &str, raw: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(stored_hash).map_err(|e| anyhow!("Failed to parse password hash: {}", e))?;

    let argon2 = Argon2::default();
    Ok(argon2.verify_password(raw.as_bytes(), &parsed_hash).is_ok())
}

pub(crate) fn map_user(row: &PgRow) -> Result<User> {
    let role: String = row.get("role");
    let status: String = row.get("status");

    Ok(User {
        id: row.get("id"),
        uuid: row.get("uuid"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: role.parse::<Role>().map_err(|e| anyhow!(e))?,
        status: status.parse::<UserStatus>().map_err(|e| anyhow!(e))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user; the raw password is hashed here
    pub async fn create(&self, payload: &CreateUserRequest) -> Result<User> {
        info!("Creating new user: {}", payload.username);

        let password_hash = hash_password(&payload.password)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (uuid, username, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(payload.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_user(&row)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1",
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Find a user by their external identifier
    pub async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Check whether a username is already taken
    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS present FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Check whether an email is already registered
    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS present FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Apply a partial update to a user
    ///
    /// Field-level authorization has already happened in the policy layer;
    /// this only persists whatever deltas the patch carries. A raw password
    /// in the patch is hashed here. Returns the updated record, or `None`
    /// when the uuid does not resolve.
    pub async fn apply_patch(&self, uuid: Uuid, patch: &UserPatch) -> Result<Option<User>> {
        info!("Updating user {}", uuid);

        let password_hash = match &patch.password {
            Some(raw) => Some(hash_password(raw)?),
            None => None,
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($1, username),
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                role = COALESCE($4, role),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE uuid = $6
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&patch.username)
        .bind(&patch.email)
        .bind(&password_hash)
        .bind(patch.role.map(|r| r.as_str()))
        .bind(patch.status.map(|s| s.as_str()))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Deactivate an account (accounts are never hard-deleted)
    pub async fn deactivate(&self, uuid: Uuid) -> Result<()> {
        info!("Deactivating user {}", uuid);

        sqlx::query("UPDATE users SET status = 'inactive', updated_at = NOW() WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "wrong horse").unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_hash_is_an_error_not_a_match() {
        assert!(verify_password("not-a-phc-string", "anything").is_err());
    }
}
