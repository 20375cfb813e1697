//! Redis-backed implementation of the cache layer.

use super::counters::{CounterStore, RateLimitStore};
use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use metrics::counter;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Sorted set holding the trending leaderboard (member = code, score = clicks).
const TRENDING_KEY: &str = "trending_urls";

/// Hash holding pending click counts awaiting reconciliation (field = code).
const BUFFER_KEY: &str = "analytics_buffer";

/// Redis implementation of [`CacheService`], [`CounterStore`] and
/// [`RateLimitStore`].
///
/// Uses connection pooling via `ConnectionManager` for efficient connection
/// reuse. Hot-path operations (URL reads, click recording) are fail-open:
/// errors are logged but don't propagate to callers. Reconciliation reads
/// and writes propagate errors so a cycle can abort cleanly.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: usize,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - TTL applied to cached entries when [`CacheService::set_url`]
    ///   is called with `ttl_seconds = None`; controlled via `CACHE_TTL_SECONDS` env var
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds as usize,
            key_prefix: "url:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(url)) => {
                debug!("Cache HIT: {} -> {}", short_code, url);
                counter!("linkpulse_cache_hits_total").increment(1);
                Ok(Some(url))
            }
            Ok(None) => {
                debug!("Cache MISS: {}", short_code);
                counter!("linkpulse_cache_misses_total").increment(1);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", short_code, e);
                Ok(None)
            }
        }
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl: Option<usize>,
    ) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();
        let ttl_seconds = ttl.unwrap_or(self.default_ttl);

        match conn
            .set_ex::<_, _, ()>(&key, original_url, ttl_seconds as u64)
            .await
        {
            Ok(_) => {
                debug!(
                    "Cache SET: {} -> {} (TTL: {}s)",
                    short_code, original_url, ttl_seconds
                );
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", short_code, e);
                Ok(())
            }
        }
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: {}", short_code);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", short_code, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}

#[async_trait]
impl CounterStore for RedisCache {
    async fn record_click(&self, code: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        // One round trip: ZINCRBY trending + HINCRBY pending buffer.
        match redis::pipe()
            .zincr(TRENDING_KEY, code, 1i64)
            .ignore()
            .hincr(BUFFER_KEY, code, 1i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
        {
            Ok(()) => {
                counter!("linkpulse_clicks_recorded_total").increment(1);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to record click for {}: {}", code, e);
                counter!("linkpulse_clicks_dropped_total").increment(1);
                Ok(())
            }
        }
    }

    async fn top_scores(&self, limit: usize) -> CacheResult<Vec<(String, u64)>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.client.clone();

        // Normalize the backend shape here: an ordered list of
        // (member, score) pairs is the only form business logic sees.
        let ranked: Vec<(String, f64)> = conn
            .zrevrange_withscores(TRENDING_KEY, 0, limit as isize - 1)
            .await
            .map_err(|e| CacheError::OperationError(format!("ZREVRANGE failed: {}", e)))?;

        Ok(ranked
            .into_iter()
            .map(|(code, score)| (code, score.max(0.0) as u64))
            .collect())
    }

    async fn snapshot_buffer(&self) -> CacheResult<HashMap<String, u64>> {
        let mut conn = self.client.clone();

        let raw: HashMap<String, i64> = conn
            .hgetall(BUFFER_KEY)
            .await
            .map_err(|e| CacheError::OperationError(format!("HGETALL failed: {}", e)))?;

        Ok(raw
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .map(|(code, count)| (code, count as u64))
            .collect())
    }

    async fn decrement_buffer(&self, drained: &[(String, u64)]) -> CacheResult<()> {
        if drained.is_empty() {
            return Ok(());
        }

        let mut conn = self.client.clone();

        let mut pipe = redis::pipe();
        for (code, count) in drained {
            pipe.hincr(BUFFER_KEY, code, -(*count as i64)).ignore();
        }

        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::OperationError(format!("Buffer decrement failed: {}", e)))
    }

    async fn remove_score(&self, code: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        match conn.zrem::<_, _, ()>(TRENDING_KEY, code).await {
            Ok(()) => {
                debug!("Leaderboard REMOVE: {}", code);
                Ok(())
            }
            Err(e) => {
                warn!("Redis ZREM error for {}: {}", code, e);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl RateLimitStore for RedisCache {
    async fn incr_window(&self, key: &str, window_seconds: u64) -> Option<u64> {
        let counter_key = format!("ratelimit:{}", key);
        let mut conn = self.client.clone();

        let count: u64 = match conn.incr(&counter_key, 1u32).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Rate limit INCR failed for {}: {} (failing open)", key, e);
                return None;
            }
        };

        // First request in the window arms the expiry; the counter is only
        // ever cleared by that expiry.
        if count == 1
            && let Err(e) = conn
                .expire::<_, ()>(&counter_key, window_seconds as i64)
                .await
        {
            warn!("Rate limit EXPIRE failed for {}: {}", key, e);
        }

        Some(count)
    }
}
