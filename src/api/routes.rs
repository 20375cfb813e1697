//! API route configuration.
//!
//! Every `/api` route sits behind the distributed rate limiter; routes that
//! act on caller-owned data additionally require a Bearer identity via
//! [`crate::api::middleware::identity`].

use crate::api::handlers::{
    analytics_handler, delete_handler, shorten_handler, sync_handler, trending_handler,
};
use crate::api::middleware::{identity, rate_limit};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// All `/api` routes.
///
/// # Endpoints
///
/// - `POST   /url/shorten`   - Create/reuse a short code (identity required)
/// - `GET    /url/analytics` - Caller's mappings with live clicks (identity required)
/// - `DELETE /url/{id}`      - Delete a caller-owned mapping (identity required)
/// - `GET    /url/trending`  - Public top-N leaderboard
/// - `GET|POST /sync`        - Trigger one reconciliation cycle (for an external scheduler)
pub fn api_router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/url/shorten", post(shorten_handler))
        .route("/url/analytics", get(analytics_handler))
        .route("/url/{id}", delete(delete_handler))
        .route_layer(middleware::from_fn(identity::layer));

    let public = Router::new()
        .route("/url/trending", get(trending_handler))
        .route("/sync", get(sync_handler).post(sync_handler));

    protected
        .merge(public)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
}
