//! Handler for the trending endpoint.

use axum::{Json, extract::State};

use crate::api::dto::trending::TrendingItem;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the top mappings by click count, highest first.
///
/// # Endpoint
///
/// `GET /api/url/trending` (public)
///
/// Click counts are real-time leaderboard scores, which may run ahead of
/// durable counts until the next reconciliation cycle. Deleted mappings
/// never appear, even if their leaderboard entry hasn't been purged yet.
pub async fn trending_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrendingItem>>, AppError> {
    let trending = state.trending_service.get_trending().await?;

    Ok(Json(trending.into_iter().map(TrendingItem::from).collect()))
}
