//! Business logic services.
//!
//! - [`RedirectService`] - short-code resolution and click recording (hot path)
//! - [`UrlService`] - shorten, owner analytics and delete
//! - [`TrendingService`] - leaderboard query merged with durable metadata
//! - [`SyncService`] - write-behind reconciliation of pending clicks

pub mod redirect_service;
pub mod sync_service;
pub mod trending_service;
pub mod url_service;

pub use redirect_service::RedirectService;
pub use sync_service::{SyncReport, SyncService, run_sync_worker};
pub use trending_service::{TrendingEntry, TrendingService};
pub use url_service::{AnalyticsEntry, UrlService};
