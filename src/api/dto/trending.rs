//! DTOs for the trending endpoint.

use crate::application::services::TrendingEntry;
use serde::Serialize;

/// One ranked entry of the trending list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingItem {
    pub code: String,
    pub original_url: String,
    /// Real-time leaderboard score; may run ahead of the durable count.
    pub clicks: u64,
}

impl From<TrendingEntry> for TrendingItem {
    fn from(entry: TrendingEntry) -> Self {
        Self {
            code: entry.code,
            original_url: entry.original_url,
            clicks: entry.clicks,
        }
    }
}
