#![allow(dead_code)]

//! Shared test fixtures: in-memory implementations of the repository and
//! the cache-layer traits, so the suite runs without Postgres or Redis.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use linkpulse::domain::entities::{NewShortUrl, ShortUrl};
use linkpulse::domain::repositories::{ClickDelta, UrlRepository};
use linkpulse::error::AppError;
use linkpulse::infrastructure::cache::{
    CacheError, CacheResult, CacheService, CounterStore, RateLimitStore,
};
use linkpulse::state::{AppState, RateLimitPolicy};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// In-memory durable store standing in for PostgreSQL.
#[derive(Default)]
pub struct MemoryUrlRepository {
    rows: Mutex<Vec<ShortUrl>>,
    next_id: AtomicI64,
    /// When set, `apply_click_batch` fails as a unit (store outage).
    pub fail_batches: AtomicBool,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Seeds a mapping directly, bypassing the service layer.
    pub fn seed(&self, code: &str, original_url: &str, owner_id: &str) -> ShortUrl {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        // Spread creation times so newest-first ordering is deterministic.
        let created_at = Utc::now() + ChronoDuration::milliseconds(id);
        let mapping = ShortUrl::new(
            id,
            code.to_string(),
            original_url.to_string(),
            owner_id.to_string(),
            0,
            created_at,
            created_at,
        );
        self.rows.lock().unwrap().push(mapping.clone());
        mapping
    }

    /// Overwrites the durable click count for a seeded code.
    pub fn seed_clicks(&self, code: &str, clicks: i64) {
        if let Some(row) = self
            .rows
            .lock()
            .unwrap()
            .iter_mut()
            .find(|r| r.code == code)
        {
            row.clicks = clicks;
        }
    }

    /// Returns the durable click count for a code.
    pub fn clicks_for(&self, code: &str) -> Option<i64> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.code == code)
            .map(|r| r.clicks)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.rows.lock().unwrap().iter().any(|r| r.code == code)
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let mut rows = self.rows.lock().unwrap();

        if rows.iter().any(|r| r.code == new_url.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                serde_json::json!({ "constraint": "short_urls_code_key" }),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created_at = Utc::now() + ChronoDuration::milliseconds(id);
        let mapping = ShortUrl::new(
            id,
            new_url.code,
            new_url.original_url,
            new_url.owner_id,
            0,
            created_at,
            created_at,
        );
        rows.push(mapping.clone());

        Ok(mapping)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.code == code)
            .cloned())
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        original_url: &str,
    ) -> Result<Option<ShortUrl>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.owner_id == owner_id && r.original_url == original_url)
            .cloned())
    }

    async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<ShortUrl>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| codes.contains(&r.code))
            .cloned()
            .collect())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortUrl>, AppError> {
        let mut owned: Vec<ShortUrl> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn delete(&self, id: i64, owner_id: &str) -> Result<Option<ShortUrl>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let pos = rows
            .iter()
            .position(|r| r.id == id && r.owner_id == owner_id);
        Ok(pos.map(|pos| rows.remove(pos)))
    }

    async fn apply_click_batch(&self, batch: &[ClickDelta]) -> Result<u64, AppError> {
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(AppError::internal(
                "Database error",
                serde_json::json!({}),
            ));
        }

        let mut rows = self.rows.lock().unwrap();
        let mut updated = 0u64;

        for delta in batch {
            if let Some(row) = rows.iter_mut().find(|r| r.code == delta.code) {
                row.clicks += delta.clicks;
                row.last_visited_at = Utc::now();
                updated += 1;
            }
        }

        Ok(updated)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// In-memory cache layer standing in for Redis: URL cache, leaderboard,
/// pending click buffer and rate-limit windows behind the same traits.
#[derive(Default)]
pub struct MemoryCacheLayer {
    urls: Mutex<HashMap<String, String>>,
    scores: Mutex<HashMap<String, u64>>,
    buffer: Mutex<HashMap<String, i64>>,
    windows: Mutex<HashMap<String, (u64, Instant)>>,
    bump_on_snapshot: Mutex<Option<(String, i64)>>,
    /// When set, `record_click` reports a backend failure.
    pub fail_clicks: AtomicBool,
    /// When set, `incr_window` reports a backend failure (fail-open path).
    pub fail_windows: AtomicBool,
}

impl MemoryCacheLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_url(&self, code: &str, url: &str) {
        self.urls
            .lock()
            .unwrap()
            .insert(code.to_string(), url.to_string());
    }

    pub fn cached_url(&self, code: &str) -> Option<String> {
        self.urls.lock().unwrap().get(code).cloned()
    }

    /// Drops a cached entry, simulating TTL expiry or an eviction.
    pub fn purge_url(&self, code: &str) {
        self.urls.lock().unwrap().remove(code);
    }

    pub fn score(&self, code: &str) -> u64 {
        self.scores.lock().unwrap().get(code).copied().unwrap_or(0)
    }

    pub fn seed_score(&self, code: &str, score: u64) {
        self.scores.lock().unwrap().insert(code.to_string(), score);
    }

    pub fn buffered(&self, code: &str) -> i64 {
        self.buffer.lock().unwrap().get(code).copied().unwrap_or(0)
    }

    pub fn seed_buffer(&self, code: &str, count: i64) {
        self.buffer.lock().unwrap().insert(code.to_string(), count);
    }

    /// Adds pending clicks directly.
    pub fn bump_buffer(&self, code: &str, count: i64) {
        *self
            .buffer
            .lock()
            .unwrap()
            .entry(code.to_string())
            .or_insert(0) += count;
    }

    /// One-shot: adds pending clicks immediately *after* the next snapshot
    /// is taken, simulating a click landing between a reconciliation
    /// snapshot and its decrement.
    pub fn bump_after_next_snapshot(&self, code: &str, count: i64) {
        *self.bump_on_snapshot.lock().unwrap() = Some((code.to_string(), count));
    }
}

#[async_trait]
impl CacheService for MemoryCacheLayer {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        Ok(self.urls.lock().unwrap().get(short_code).cloned())
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        _ttl: Option<usize>,
    ) -> CacheResult<()> {
        self.urls
            .lock()
            .unwrap()
            .insert(short_code.to_string(), original_url.to_string());
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.urls.lock().unwrap().remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl CounterStore for MemoryCacheLayer {
    async fn record_click(&self, code: &str) -> CacheResult<()> {
        if self.fail_clicks.load(Ordering::SeqCst) {
            return Err(CacheError::OperationError("counter store down".to_string()));
        }

        *self
            .scores
            .lock()
            .unwrap()
            .entry(code.to_string())
            .or_insert(0) += 1;
        *self
            .buffer
            .lock()
            .unwrap()
            .entry(code.to_string())
            .or_insert(0) += 1;
        Ok(())
    }

    async fn top_scores(&self, limit: usize) -> CacheResult<Vec<(String, u64)>> {
        let mut ranked: Vec<(String, u64)> = self
            .scores
            .lock()
            .unwrap()
            .iter()
            .map(|(code, score)| (code.clone(), *score))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn snapshot_buffer(&self) -> CacheResult<HashMap<String, u64>> {
        let snapshot = self
            .buffer
            .lock()
            .unwrap()
            .iter()
            .filter(|&(_, count)| *count > 0)
            .map(|(code, count)| (code.clone(), *count as u64))
            .collect();

        if let Some((code, count)) = self.bump_on_snapshot.lock().unwrap().take() {
            self.bump_buffer(&code, count);
        }

        Ok(snapshot)
    }

    async fn decrement_buffer(&self, drained: &[(String, u64)]) -> CacheResult<()> {
        let mut buffer = self.buffer.lock().unwrap();
        for (code, count) in drained {
            *buffer.entry(code.clone()).or_insert(0) -= *count as i64;
        }
        Ok(())
    }

    async fn remove_score(&self, code: &str) -> CacheResult<()> {
        self.scores.lock().unwrap().remove(code);
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for MemoryCacheLayer {
    async fn incr_window(&self, key: &str, window_seconds: u64) -> Option<u64> {
        if self.fail_windows.load(Ordering::SeqCst) {
            return None;
        }

        let mut windows = self.windows.lock().unwrap();
        let entry = windows
            .entry(key.to_string())
            .or_insert_with(|| (0, Instant::now()));

        if entry.1.elapsed().as_secs() >= window_seconds {
            *entry = (0, Instant::now());
        }

        entry.0 += 1;
        Some(entry.0)
    }
}

/// Default rate-limit policy used by most tests: generous enough that only
/// the dedicated limiter tests ever trip it.
pub fn relaxed_policy() -> RateLimitPolicy {
    RateLimitPolicy {
        max_requests: 10_000,
        window_seconds: 60,
        behind_proxy: false,
    }
}

/// Builds application state over the in-memory fakes.
pub fn create_test_state(
    repository: Arc<MemoryUrlRepository>,
    cache: Arc<MemoryCacheLayer>,
    policy: RateLimitPolicy,
) -> AppState {
    AppState::new(
        repository,
        cache.clone(),
        cache.clone(),
        cache,
        policy,
        10,
    )
}
