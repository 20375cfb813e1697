//! Short URL entity representing a code → URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL mapping with its durable click count.
///
/// `clicks` is the count the durable store has seen; clicks recorded since
/// the last reconciliation cycle live in the cache-side pending buffer and
/// are merged in at read time where the API promises live totals.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShortUrl {
    pub id: i64,
    pub code: String,
    pub original_url: String,
    /// Opaque caller identity that owns this mapping. Authentication is an
    /// external collaborator; this service never interprets the value.
    pub owner_id: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub last_visited_at: DateTime<Utc>,
}

impl ShortUrl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        code: String,
        original_url: String,
        owner_id: String,
        clicks: i64,
        created_at: DateTime<Utc>,
        last_visited_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            original_url,
            owner_id,
            clicks,
            created_at,
            last_visited_at,
        }
    }
}

/// Input data for creating a new mapping.
#[derive(Debug, Clone)]
pub struct NewShortUrl {
    pub code: String,
    pub original_url: String,
    pub owner_id: String,
}
