//! No-op cache implementation for testing or disabled caching.

use super::counters::{CounterStore, RateLimitStore};
use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// A cache-layer implementation that does nothing.
///
/// Used when Redis is unavailable or caching is explicitly disabled. Every
/// route stays functional: resolution always goes to the durable store,
/// clicks are dropped (with a debug log), the leaderboard is empty, and the
/// rate limiter fails open.
///
/// # Use Cases
///
/// - Development environments without Redis
/// - Testing scenarios where caching should be bypassed
/// - Fallback when Redis connection fails at startup
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (cache layer disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _original_url: &str,
        _ttl: Option<usize>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl CounterStore for NullCache {
    async fn record_click(&self, code: &str) -> CacheResult<()> {
        debug!("Click for {} dropped (cache layer disabled)", code);
        Ok(())
    }

    async fn top_scores(&self, _limit: usize) -> CacheResult<Vec<(String, u64)>> {
        Ok(Vec::new())
    }

    async fn snapshot_buffer(&self) -> CacheResult<HashMap<String, u64>> {
        Ok(HashMap::new())
    }

    async fn decrement_buffer(&self, _drained: &[(String, u64)]) -> CacheResult<()> {
        Ok(())
    }

    async fn remove_score(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for NullCache {
    async fn incr_window(&self, _key: &str, _window_seconds: u64) -> Option<u64> {
        // No shared counter to consult: fail open.
        None
    }
}
