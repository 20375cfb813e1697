//! Short-code resolution and click recording (the redirect hot path).

use std::sync::Arc;

use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CounterStore};
use serde_json::json;
use tracing::{debug, error, warn};

/// Service behind `GET /{code}`.
///
/// Resolution is read-through: cache first, durable store on a miss, cache
/// repopulated write-through with the default TTL. Click recording is
/// best-effort and must never fail the redirect.
pub struct RedirectService {
    repository: Arc<dyn UrlRepository>,
    cache: Arc<dyn CacheService>,
    counters: Arc<dyn CounterStore>,
}

impl RedirectService {
    /// Creates a new redirect service.
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

    /// Resolves a short code to its destination URL.
    ///
    /// Cache hits return sub-millisecond. On a miss the durable store is
    /// queried and the cache repopulated; misses themselves are never
    /// cached, so unknown codes re-query the store every time. A cache
    /// read error degrades to a store lookup; only a durable-store
    /// failure is fatal to the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping exists for the code.
    /// Returns [`AppError::Internal`] if the durable store is unreachable.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        match self.cache.get_url(code).await {
            Ok(Some(cached_url)) => return Ok(cached_url),
            Ok(None) => {}
            Err(e) => {
                error!("Cache error resolving {}: {}", code, e);
            }
        }

        let mapping = self
            .repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Not Found", json!({ "code": code })))?;

        // Write-through with the default TTL; the entry is disposable, so a
        // failed SET is already swallowed by the cache adapter.
        if let Err(e) = self
            .cache
            .set_url(code, &mapping.original_url, None)
            .await
        {
            warn!("Failed to cache URL for {}: {}", code, e);
        }

        Ok(mapping.original_url)
    }

    /// Records one click against the leaderboard and the pending buffer.
    ///
    /// Awaited before the redirect response is sent so the click is in the
    /// buffer first. Any failure is logged and swallowed; a recording
    /// problem must never fail the redirect.
    pub async fn record_click(&self, code: &str) {
        if let Err(e) = self.counters.record_click(code).await {
            warn!("Click recording failed for {}: {}", code, e);
        } else {
            debug!("Click recorded for {}", code);
        }
    }
}
