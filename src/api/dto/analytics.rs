//! DTOs for the owner analytics endpoint.

use crate::application::services::AnalyticsEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One mapping owned by the caller, with its live click total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsItem {
    pub id: i64,
    pub code: String,
    pub original_url: String,
    /// Durable clicks plus clicks still pending reconciliation.
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub last_visited_at: DateTime<Utc>,
}

impl From<AnalyticsEntry> for AnalyticsItem {
    fn from(entry: AnalyticsEntry) -> Self {
        Self {
            id: entry.mapping.id,
            code: entry.mapping.code,
            original_url: entry.mapping.original_url,
            clicks: entry.clicks,
            created_at: entry.mapping.created_at,
            last_visited_at: entry.mapping.last_visited_at,
        }
    }
}

/// Response body for a deleted mapping.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}
