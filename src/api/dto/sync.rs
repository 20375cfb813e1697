//! DTOs for the reconciliation trigger endpoint.

use crate::application::services::SyncReport;
use serde::Serialize;

/// Result of one reconciliation cycle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub synced_count: usize,
    pub message: String,
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            synced_count: report.synced_count,
            message: report.message,
        }
    }
}
