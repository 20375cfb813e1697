//! Distributed fixed-window rate limiting middleware.
//!
//! Counters live in the shared cache backend (one window per caller key),
//! not in process memory, so every instance of the service enforces the
//! same budget. The limiter protects `/api` routes only; the redirect
//! path stays unmetered.
//!
//! Fail-open: when the counter backend is unreachable the request is
//! allowed. Availability wins over strict enforcement.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use std::net::SocketAddr;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Enforces the per-caller request budget for the current window.
///
/// # Caller Key
///
/// The Bearer token when present (per-identity limiting), otherwise the
/// client IP. The IP comes from `X-Forwarded-For` / `X-Real-IP` only when
/// the service is configured as running behind a trusted proxy; otherwise
/// the socket peer address is used.
///
/// # Errors
///
/// Returns `429 Too Many Requests` once the window budget is exhausted.
/// The counter is cleared by key expiry, not by this middleware.
pub async fn layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = caller_key(&req, state.rate_limit.behind_proxy);

    match state
        .rate_limits
        .incr_window(&key, state.rate_limit.window_seconds)
        .await
    {
        Some(count) if count > state.rate_limit.max_requests => {
            counter!("linkpulse_rate_limited_total").increment(1);
            Err(AppError::too_many_requests(
                "Too many requests",
                serde_json::json!({
                    "window_seconds": state.rate_limit.window_seconds,
                    "limit": state.rate_limit.max_requests,
                }),
            ))
        }
        Some(_) => Ok(next.run(req).await),
        None => {
            warn!("Rate limit backend unavailable, failing open");
            Ok(next.run(req).await)
        }
    }
}

/// Derives the rate-limit key for a request.
fn caller_key(req: &Request, behind_proxy: bool) -> String {
    if let Some(token) = bearer_token(req.headers()) {
        return format!("token:{}", token);
    }

    if behind_proxy && let Some(ip) = forwarded_ip(req.headers()) {
        return format!("ip:{}", ip);
    }

    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("ip:{}", addr.ip()),
        None => "ip:unknown".to_string(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        // First hop is the original client.
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
