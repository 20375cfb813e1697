//! Trending query: top-N leaderboard merged with durable metadata.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CounterStore;
use serde_json::json;

/// One ranked trending entry.
///
/// `clicks` is the real-time leaderboard score, which may run ahead of the
/// durable count until the next reconciliation cycle.
#[derive(Debug, Clone)]
pub struct TrendingEntry {
    pub code: String,
    pub original_url: String,
    pub clicks: u64,
}

/// Service behind `GET /api/url/trending`.
pub struct TrendingService {
    repository: Arc<dyn UrlRepository>,
    counters: Arc<dyn CounterStore>,
    limit: usize,
}

impl TrendingService {
    /// Creates a new trending service returning at most `limit` entries.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        counters: Arc<dyn CounterStore>,
        limit: usize,
    ) -> Self {
        Self {
            repository,
            counters,
            limit,
        }
    }

    /// Returns the top mappings by click count, highest first.
    ///
    /// Output order follows leaderboard rank. Codes still on the
    /// leaderboard whose mapping has been deleted are filtered out rather
    /// than erroring, so the result may be shorter than the leaderboard
    /// slice that produced it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the leaderboard or the durable
    /// store is unreachable.
    pub async fn get_trending(&self) -> Result<Vec<TrendingEntry>, AppError> {
        let ranked = self.counters.top_scores(self.limit).await.map_err(|e| {
            AppError::internal(
                "Trending leaderboard unavailable",
                json!({ "reason": e.to_string() }),
            )
        })?;

        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let codes: Vec<String> = ranked.iter().map(|(code, _)| code.clone()).collect();
        let mappings = self.repository.find_by_codes(&codes).await?;

        let by_code: HashMap<&str, &str> = mappings
            .iter()
            .map(|m| (m.code.as_str(), m.original_url.as_str()))
            .collect();

        Ok(ranked
            .into_iter()
            .filter_map(|(code, score)| {
                by_code.get(code.as_str()).map(|&url| TrendingEntry {
                    original_url: url.to_string(),
                    code,
                    clicks: score,
                })
            })
            .collect())
    }
}
