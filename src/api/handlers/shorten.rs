//! Handler for the shorten endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use std::time::Instant;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::identity::CallerIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Creates (or reuses) a short code for a URL.
///
/// # Endpoint
///
/// `POST /api/url/shorten`
///
/// # Request Body
///
/// ```json
/// { "originalUrl": "https://example.com" }
/// ```
///
/// # Response
///
/// `201 Created` with the new mapping, or `200 OK` with `cached: true`
/// when the caller already shortened this URL:
///
/// ```json
/// {
///   "code": "aZ3_x9Qk",
///   "originalUrl": "https://example.com/",
///   "clicks": 0,
///   "processTimeMs": 1.532,
///   "cached": false
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for missing or invalid URLs.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let started = Instant::now();

    payload.validate()?;

    let (mapping, cached) = state
        .url_service
        .shorten(&identity.0, &payload.original_url)
        .await?;

    let status = if cached {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    let process_time_ms = started.elapsed().as_secs_f64() * 1e3;

    Ok((
        status,
        Json(ShortenResponse::from_mapping(mapping, cached, process_time_ms)),
    ))
}
