//! Image metadata repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::image::ImageMetadata;

const IMAGE_COLUMNS: &str = "id, name, file_hash, file_original, url, created_at";

fn map_image(row: &PgRow) -> ImageMetadata {
    ImageMetadata {
        id: row.get("id"),
        name: row.get("name"),
        file_hash: row.get("file_hash"),
        file_original: row.get("file_original"),
        url: row.get("url"),
        created_at: row.get("created_at"),
    }
}

/// Image metadata repository
#[derive(Clone)]
pub struct ImageRepository {
    pool: PgPool,
}

impl ImageRepository {
    /// Create a new image repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record metadata for a stored file
    pub async fn create(
        &self,
        name: &str,
        file_hash: &str,
        file_original: &str,
        url: &str,
    ) -> Result<ImageMetadata> {
        info!("Recording upload: {}", name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO images (name, file_hash, file_original, url)
            VALUES ($1, $2, $3, $4)
            RETURNING {IMAGE_COLUMNS}
            "#,
        ))
        .bind(name)
        .bind(file_hash)
        .bind(file_original)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_image(&row))
    }

    /// Find an image metadata row by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ImageMetadata>> {
        let row = sqlx::query(&format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_image))
    }

    /// Update metadata after a rename and/or content replacement
    pub async fn update(
        &self,
        id: i64,
        name: &str,
        file_hash: &str,
        file_original: &str,
        url: &str,
    ) -> Result<Option<ImageMetadata>> {
        info!("Updating upload id {}", id);

        let row = sqlx::query(&format!(
            r#"
            UPDATE images SET name = $1, file_hash = $2, file_original = $3, url = $4
            WHERE id = $5
            RETURNING {IMAGE_COLUMNS}
            "#,
        ))
        .bind(name)
        .bind(file_hash)
        .bind(file_original)
        .bind(url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_image))
    }

    /// Delete an image metadata row; returns whether the id resolved
    pub async fn delete(&self, id: i64) -> Result<bool> {
        info!("Deleting upload id {}", id);

        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
