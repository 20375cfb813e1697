//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::is_valid_code;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Reject anything that doesn't look like a generated code (8 chars,
///    URL-safe alphabet) before touching any backend
/// 2. Resolve via cache, falling back to the durable store on a miss
/// 3. Record the click (leaderboard + pending buffer, best-effort)
/// 4. Return `302 Found` with an `X-Response-Time` header
///
/// This path is intentionally not rate-limited and never blocks on click
/// accounting: the click is in the buffer before the response goes out,
/// but a recording failure still redirects.
///
/// # Errors
///
/// Returns 404 Not Found for malformed codes and codes with no mapping.
/// Returns 500 only when the durable store is unreachable on a cache miss.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let started = Instant::now();

    if !is_valid_code(&code) {
        return Err(AppError::not_found(
            "Invalid short code format",
            serde_json::json!({ "code": code }),
        ));
    }

    let original_url = state.redirect_service.resolve(&code).await?;

    state.redirect_service.record_click(&code).await;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, original_url),
            (
                HeaderName::from_static("x-response-time"),
                format!("{elapsed_ms:.3}ms"),
            ),
        ],
    )
        .into_response())
}
