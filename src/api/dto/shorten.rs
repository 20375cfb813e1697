//! DTOs for the shorten endpoint.

use crate::domain::entities::ShortUrl;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,
}

/// Response for a shortened URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub code: String,
    pub original_url: String,
    /// Durable click count at creation/reuse time.
    pub clicks: i64,
    /// Server-side processing latency in milliseconds.
    pub process_time_ms: f64,
    /// True when an existing mapping for this (caller, URL) pair was reused.
    pub cached: bool,
}

impl ShortenResponse {
    pub fn from_mapping(mapping: ShortUrl, cached: bool, process_time_ms: f64) -> Self {
        Self {
            code: mapping.code,
            original_url: mapping.original_url,
            clicks: mapping.clicks,
            process_time_ms,
            cached,
        }
    }
}
