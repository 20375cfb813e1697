//! HTTP middleware for request processing and protection.
//!
//! Provides caller-identity extraction, distributed rate limiting and
//! observability middleware.

pub mod identity;
pub mod rate_limit;
pub mod tracing;
