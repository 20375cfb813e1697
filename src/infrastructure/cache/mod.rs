//! Cache layer: URL resolution cache, click counters and rate-limit windows.
//!
//! Three capability traits, one backend:
//! - [`CacheService`] - TTL'd short-code → URL cache (fail-open)
//! - [`CounterStore`] - trending leaderboard + pending click buffer
//! - [`RateLimitStore`] - fixed-window request counters (fail-open)
//!
//! [`RedisCache`] implements all three against Redis; [`NullCache`] is the
//! no-op fallback used when Redis is not configured.

mod counters;
mod null_cache;
mod redis_cache;
mod service;

pub use counters::{CounterStore, RateLimitStore};
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use counters::{MockCounterStore, MockRateLimitStore};
#[cfg(test)]
pub use service::MockCacheService;
