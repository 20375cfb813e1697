//! Counter-store contracts: trending leaderboard, pending click buffer and
//! rate-limit windows.
//!
//! These counters live in the shared cache backend, never in process
//! memory: request handlers and the reconciler (possibly on other
//! instances) must observe one consistent state, and all mutations must be
//! backend-atomic increments rather than read-modify-write.

use super::service::CacheResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Click counters backing the trending leaderboard and the write-behind
/// pending buffer.
///
/// The leaderboard score for a code is updated synchronously with each
/// click while the durable count trails behind, so a score is always >= the
/// durable count; reconciliation never rewrites scores, it only drains the
/// pending buffer into the durable store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Records one click: leaderboard score +1 and pending buffer +1, both
    /// atomic, batched into one round trip where the backend pipelines.
    ///
    /// Best-effort: implementations log and swallow backend failures so a
    /// recording problem can never fail the redirect that triggered it.
    async fn record_click(&self, code: &str) -> CacheResult<()>;

    /// Returns up to `limit` leaderboard entries as `(code, score)` pairs,
    /// highest score first. Ties are broken by the backend (unspecified).
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the trending endpoint surfaces them.
    async fn top_scores(&self, limit: usize) -> CacheResult<Vec<(String, u64)>>;

    /// Snapshots the pending click buffer: every code with a positive
    /// pending count.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; a reconciliation cycle aborts on them.
    async fn snapshot_buffer(&self) -> CacheResult<HashMap<String, u64>>;

    /// Decrements buffer entries by exactly the given amounts, never "to
    /// zero", so clicks that arrived after the snapshot survive for the
    /// next cycle.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; see the reconciler for the double-flush
    /// consequence of failing here after a durable write.
    async fn decrement_buffer(&self, drained: &[(String, u64)]) -> CacheResult<()>;

    /// Removes a code from the leaderboard (mapping deleted).
    ///
    /// Best-effort, like [`Self::record_click`]: a leftover member is
    /// filtered out of trending results rather than surfaced.
    async fn remove_score(&self, code: &str) -> CacheResult<()>;
}

/// Fixed-window request counters for rate limiting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Increments the counter for `key` and returns the post-increment
    /// count. The first hit in a window arms a `window_seconds` expiry; the
    /// counter is cleared by expiry only, never explicitly.
    ///
    /// Returns `None` when the backend is unreachable; callers fail open
    /// and allow the request.
    async fn incr_window(&self, key: &str, window_seconds: u64) -> Option<u64>;
}
