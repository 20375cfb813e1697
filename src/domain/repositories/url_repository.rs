//! Repository trait for short URL mappings.

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::error::AppError;
use async_trait::async_trait;

/// One batched click increment: `clicks += clicks` and `last_visited_at`
/// refreshed for the mapping with this code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickDelta {
    pub code: String,
    pub clicks: i64,
}

/// Repository interface for the durable short-URL store.
///
/// The store is treated as a document/key-value store with point lookups,
/// upserts and batched counter increments, the only capabilities the
/// service relies on.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - Test mocks auto-generated with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Creates a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code already exists; the unique
    /// constraint is the collision backstop and callers retry with a fresh
    /// code. Returns [`AppError::Internal`] on other database errors.
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Finds a mapping by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Finds an owner's existing mapping for a (normalized) original URL.
    ///
    /// Used by the shorten endpoint to reuse an existing code instead of
    /// minting a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        original_url: &str,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Batch-fetches mappings for a set of codes.
    ///
    /// Missing codes are simply absent from the result; order is
    /// unspecified (callers re-order by their own ranking).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<ShortUrl>, AppError>;

    /// Lists an owner's mappings, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortUrl>, AppError>;

    /// Deletes a mapping by id, scoped to its owner.
    ///
    /// Returns the deleted mapping so the caller can purge derived state
    /// (cache entry, leaderboard member), or `None` when no mapping matches
    /// the (id, owner) pair.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64, owner_id: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Applies a batch of click increments as a single atomic unit.
    ///
    /// Either every delta lands or none does; the reconciler depends on
    /// this to keep its buffer decrement exact. Deltas for codes with no
    /// mapping (deleted mid-flight) affect nothing and are not an error.
    /// Returns the number of mappings actually updated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors; no partial state
    /// is left behind.
    async fn apply_click_batch(&self, batch: &[ClickDelta]) -> Result<u64, AppError>;

    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}
