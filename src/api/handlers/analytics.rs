//! Handlers for owner analytics and mapping deletion.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::dto::analytics::{AnalyticsItem, DeleteResponse};
use crate::api::middleware::identity::CallerIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's mappings with live click totals.
///
/// # Endpoint
///
/// `GET /api/url/analytics`
///
/// Totals are `durable clicks + pending buffered clicks` at read time, so
/// numbers move even between reconciliation cycles. Newest mappings first.
pub async fn analytics_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<Json<Vec<AnalyticsItem>>, AppError> {
    let entries = state.url_service.analytics(&identity.0).await?;

    Ok(Json(entries.into_iter().map(AnalyticsItem::from).collect()))
}

/// Deletes a caller-owned mapping.
///
/// # Endpoint
///
/// `DELETE /api/url/{id}`
///
/// Also purges the cached URL and the trending leaderboard entry so the
/// code stops resolving and stops ranking immediately.
///
/// # Errors
///
/// Returns 404 Not Found when the id doesn't exist or belongs to another
/// caller; ownership is checked in the same query as the delete.
pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.url_service.delete(id, &identity.0).await?;

    Ok(Json(DeleteResponse {
        message: "Deleted".to_string(),
    }))
}
