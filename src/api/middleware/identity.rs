//! Caller identity extraction middleware.
//!
//! Authentication and session issuance are external collaborators: this
//! service only needs a stable opaque identity per caller, taken from the
//! Bearer token. The token is never interpreted, stored or verified here;
//! the upstream issuer owns its meaning.

use axum::{
    extract::{FromRequestParts, Request},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::error::AppError;

/// Opaque identity of the caller, as presented in the Bearer token.
///
/// Inserted as a request extension by [`layer`]; handlers read it with
/// `Extension<CallerIdentity>`.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub String);

/// Requires a Bearer token and exposes it as [`CallerIdentity`].
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <opaque-identity>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the Authorization header is missing,
/// malformed, or carries an empty token.
pub async fn layer(req: Request, next: Next) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    if token.is_empty() {
        return Err(AppError::unauthorized(
            "Unauthorized",
            serde_json::json!({"reason": "Empty bearer token"}),
        ));
    }

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(CallerIdentity(token));

    Ok(next.run(req).await)
}
