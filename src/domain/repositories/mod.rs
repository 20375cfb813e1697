//! Repository trait definitions for the domain layer.
//!
//! Traits here define the contract for durable-store access following the
//! Repository pattern; concrete implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are
//! auto-generated via `mockall` for unit tests.

pub mod url_repository;

pub use url_repository::{ClickDelta, UrlRepository};

#[cfg(test)]
pub use url_repository::MockUrlRepository;
