//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::{ClickDelta, UrlRepository};
use crate::error::AppError;

const COLUMNS: &str = "id, code, original_url, owner_id, clicks, created_at, last_visited_at";

/// PostgreSQL repository for short URL mappings.
///
/// Uses bound parameters throughout for SQL injection protection. Click
/// batches run inside one transaction so a reconciliation cycle either
/// lands completely or not at all.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let mapping = sqlx::query_as::<_, ShortUrl>(&format!(
            "INSERT INTO short_urls (code, original_url, owner_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        ))
        .bind(&new_url.code)
        .bind(&new_url.original_url)
        .bind(&new_url.owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(mapping)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        let mapping = sqlx::query_as::<_, ShortUrl>(&format!(
            "SELECT {COLUMNS} FROM short_urls WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(mapping)
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        original_url: &str,
    ) -> Result<Option<ShortUrl>, AppError> {
        let mapping = sqlx::query_as::<_, ShortUrl>(&format!(
            "SELECT {COLUMNS} FROM short_urls \
             WHERE owner_id = $1 AND original_url = $2 \
             LIMIT 1"
        ))
        .bind(owner_id)
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(mapping)
    }

    async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<ShortUrl>, AppError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let mappings = sqlx::query_as::<_, ShortUrl>(&format!(
            "SELECT {COLUMNS} FROM short_urls WHERE code = ANY($1)"
        ))
        .bind(codes)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(mappings)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortUrl>, AppError> {
        let mappings = sqlx::query_as::<_, ShortUrl>(&format!(
            "SELECT {COLUMNS} FROM short_urls \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(mappings)
    }

    async fn delete(&self, id: i64, owner_id: &str) -> Result<Option<ShortUrl>, AppError> {
        let deleted = sqlx::query_as::<_, ShortUrl>(&format!(
            "DELETE FROM short_urls \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(deleted)
    }

    async fn apply_click_batch(&self, batch: &[ClickDelta]) -> Result<u64, AppError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut updated = 0u64;

        for delta in batch {
            let result = sqlx::query(
                "UPDATE short_urls \
                 SET clicks = clicks + $2, last_visited_at = now() \
                 WHERE code = $1",
            )
            .bind(&delta.code)
            .bind(delta.clicks)
            .execute(&mut *tx)
            .await?;

            // A code deleted between snapshot and flush matches nothing.
            updated += result.rows_affected();
        }

        tx.commit().await?;

        Ok(updated)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
