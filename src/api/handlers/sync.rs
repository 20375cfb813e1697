//! Handler for the on-demand reconciliation trigger.

use axum::{Json, extract::State};

use crate::api::dto::sync::SyncResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Runs one reconciliation cycle synchronously.
///
/// # Endpoint
///
/// `GET|POST /api/sync`
///
/// Intended for an external scheduler (e.g. a cron-triggered job in
/// deployments where the in-process timer can't run). Shares the exact
/// code path with the periodic background worker.
///
/// # Response
///
/// ```json
/// { "syncedCount": 3, "message": "Synced 3 URL stats" }
/// ```
///
/// # Errors
///
/// Returns 500 when the cycle aborts (buffer unreadable or durable batch
/// failed); the buffer is left intact for the next attempt.
pub async fn sync_handler(State(state): State<AppState>) -> Result<Json<SyncResponse>, AppError> {
    let report = state.sync_service.reconcile().await?;

    Ok(Json(SyncResponse::from(report)))
}
