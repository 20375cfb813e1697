//! Write-behind reconciliation of pending clicks into the durable store.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::repositories::{ClickDelta, UrlRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CounterStore;
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of codes whose pending clicks were flushed.
    pub synced_count: usize,
    pub message: String,
}

/// Service draining the pending click buffer into the durable store.
///
/// Delivery is at-least-once: a cycle that fails before the durable write
/// leaves the buffer untouched and the next cycle retries the same
/// amounts. The decrement step always subtracts the snapshotted values,
/// never resets, so clicks arriving mid-cycle are preserved.
pub struct SyncService {
    repository: Arc<dyn UrlRepository>,
    counters: Arc<dyn CounterStore>,
}

impl SyncService {
    /// Creates a new sync service.
    pub fn new(repository: Arc<dyn UrlRepository>, counters: Arc<dyn CounterStore>) -> Self {
        Self {
            repository,
            counters,
        }
    }

    /// Runs one reconciliation cycle.
    ///
    /// 1. Snapshot the pending buffer.
    /// 2. Empty: report `synced_count = 0` and stop.
    /// 3. Apply every `clicks += count` as one durable batch (a single
    ///    all-or-nothing transaction).
    /// 4. Decrement the buffer by exactly the snapshotted amounts.
    ///
    /// The leaderboard is never touched here; scores were already bumped
    /// at click time and only converge with durable counts, they are not
    /// rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the buffer cannot be read, the
    /// durable batch fails (buffer intact, safe retry next cycle), or the
    /// decrement fails after a successful durable write. In that last case
    /// the flushed amounts are still buffered and will be applied again
    /// next cycle (bounded double count), so it is logged loudly.
    pub async fn reconcile(&self) -> Result<SyncReport, AppError> {
        let snapshot = self.counters.snapshot_buffer().await.map_err(|e| {
            error!("Reconciliation aborted, cannot read pending buffer: {}", e);
            AppError::internal(
                "Pending click buffer unavailable",
                json!({ "reason": e.to_string() }),
            )
        })?;

        if snapshot.is_empty() {
            debug!("Reconciliation cycle: nothing to sync");
            return Ok(SyncReport {
                synced_count: 0,
                message: "Nothing to sync".to_string(),
            });
        }

        // Deterministic order for logs and the durable batch.
        let mut drained: Vec<(String, u64)> = snapshot.into_iter().collect();
        drained.sort();

        let batch: Vec<ClickDelta> = drained
            .iter()
            .map(|(code, count)| ClickDelta {
                code: code.clone(),
                clicks: *count as i64,
            })
            .collect();

        self.repository.apply_click_batch(&batch).await.map_err(|e| {
            error!(
                "Reconciliation aborted, durable batch of {} codes failed: {} (buffer left intact)",
                batch.len(),
                e
            );
            e
        })?;

        if let Err(e) = self.counters.decrement_buffer(&drained).await {
            // The durable write already landed; the amounts left in the
            // buffer will be flushed again next cycle.
            error!(
                "Buffer decrement failed after durable write, {} codes will double-flush: {}",
                drained.len(),
                e
            );
            return Err(AppError::internal(
                "Buffer decrement failed after durable write",
                json!({ "codes": drained.len(), "reason": e.to_string() }),
            ));
        }

        let synced_count = drained.len();
        info!("Synced {} URL stats to durable store", synced_count);

        Ok(SyncReport {
            synced_count,
            message: format!("Synced {} URL stats", synced_count),
        })
    }
}

/// Periodic reconciliation loop.
///
/// Runs [`SyncService::reconcile`] every `interval` until `shutdown`
/// observes `true`. Cycle failures are already logged inside `reconcile`
/// and the loop simply waits for the next tick. The on-demand sync
/// endpoint shares the same `reconcile` path.
pub async fn run_sync_worker(
    service: Arc<SyncService>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so startup isn't a cycle.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Ok(report) = service.reconcile().await
                    && report.synced_count > 0
                {
                    debug!("Scheduled reconciliation: {}", report.message);
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("Reconciliation worker stopping");
                    break;
                }
            }
        }
    }
}
