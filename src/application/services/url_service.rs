//! Shorten, owner analytics and delete.

use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CounterStore};
use crate::utils::code_generator::generate_code;
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;
use tracing::warn;

/// Collision retries before giving up. The unique constraint on `code` is
/// the backstop; with 48 bits of entropy per code this loop should never
/// pass the first iteration in practice.
const MAX_CODE_ATTEMPTS: usize = 5;

/// An owner's mapping with its live click total (durable + pending).
#[derive(Debug, Clone)]
pub struct AnalyticsEntry {
    pub mapping: ShortUrl,
    pub clicks: i64,
}

/// Service for creating, listing and deleting mappings.
pub struct UrlService {
    repository: Arc<dyn UrlRepository>,
    cache: Arc<dyn CacheService>,
    counters: Arc<dyn CounterStore>,
}

impl UrlService {
    /// Creates a new URL service.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            repository,
            cache,
            counters,
        }
    }

    /// Shortens a URL for a caller.
    ///
    /// # Deduplication
    ///
    /// If the owner already shortened the same (normalized) URL, the
    /// existing mapping is returned with `cached = true` instead of minting
    /// a second code. Distinct owners always get distinct codes.
    ///
    /// # Code Generation
    ///
    /// A fresh random code is inserted directly; a unique-constraint
    /// violation (astronomically rare collision) triggers regeneration, up
    /// to [`MAX_CODE_ATTEMPTS`] times.
    ///
    /// New mappings are written through to the resolution cache so the
    /// first redirect is already a cache hit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed or non-HTTP(S) URLs.
    /// Returns [`AppError::Internal`] on database errors or exhausted
    /// collision retries.
    pub async fn shorten(
        &self,
        owner_id: &str,
        original_url: &str,
    ) -> Result<(ShortUrl, bool), AppError> {
        let normalized_url = normalize_url(original_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(existing) = self
            .repository
            .find_by_owner_and_url(owner_id, &normalized_url)
            .await?
        {
            return Ok((existing, true));
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let new_url = NewShortUrl {
                code: generate_code(),
                original_url: normalized_url.clone(),
                owner_id: owner_id.to_string(),
            };

            match self.repository.create(new_url).await {
                Ok(mapping) => {
                    // Write-through: failures are swallowed by the adapter,
                    // the entry is a disposable projection either way.
                    if let Err(e) = self
                        .cache
                        .set_url(&mapping.code, &mapping.original_url, None)
                        .await
                    {
                        warn!("Failed to cache new mapping {}: {}", mapping.code, e);
                    }

                    return Ok((mapping, false));
                }
                Err(AppError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Lists a caller's mappings, newest first, with live click totals.
    ///
    /// The durable count lags by whatever is still in the pending buffer,
    /// so the buffer snapshot is merged in at read time. A buffer read
    /// failure degrades to durable counts only.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn analytics(&self, owner_id: &str) -> Result<Vec<AnalyticsEntry>, AppError> {
        let mappings = self.repository.list_by_owner(owner_id).await?;

        let pending = match self.counters.snapshot_buffer().await {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Pending click buffer unavailable for analytics: {}", e);
                Default::default()
            }
        };

        Ok(mappings
            .into_iter()
            .map(|mapping| {
                let buffered = pending.get(&mapping.code).copied().unwrap_or(0) as i64;
                let clicks = mapping.clicks + buffered;
                AnalyticsEntry { mapping, clicks }
            })
            .collect())
    }

    /// Deletes a caller-owned mapping and purges its derived state: the
    /// cached URL and the leaderboard member. Both purges are best-effort;
    /// a leftover leaderboard member is filtered out of trending results.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id does not exist or belongs
    /// to a different owner. Returns [`AppError::Internal`] on database
    /// errors.
    pub async fn delete(&self, id: i64, owner_id: &str) -> Result<ShortUrl, AppError> {
        let deleted = self
            .repository
            .delete(id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "id": id })))?;

        if let Err(e) = self.cache.invalidate(&deleted.code).await {
            warn!("Failed to invalidate cache for {}: {}", deleted.code, e);
        }
        if let Err(e) = self.counters.remove_score(&deleted.code).await {
            warn!(
                "Failed to remove leaderboard entry for {}: {}",
                deleted.code, e
            );
        }

        Ok(deleted)
    }

    /// Cheap durable-store probe for the health endpoint.
    pub async fn store_health(&self) -> bool {
        self.repository.ping().await.is_ok()
    }
}
