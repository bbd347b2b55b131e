//! Types for differential sync.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::listing::ListingError;

/// Errors that abort a sync run.
///
/// Batches committed before the failure stay committed; re-running is safe.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote listing could not be read (auth, network, unknown bucket).
    #[error("listing unavailable: {0}")]
    ListingUnavailable(#[source] ListingError),

    /// The catalog could not be read or a batch could not be committed.
    #[error("catalog persistence failed: {0}")]
    StorePersistence(#[source] CatalogError),

    /// Another run is in progress (raised by the scheduler, never the engine).
    #[error("a sync run is already in progress")]
    AlreadyRunning,
}

impl SyncError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ListingUnavailable(_) => "listing_error",
            SyncError::StorePersistence(_) => "store_error",
            SyncError::AlreadyRunning => "already_running",
        }
    }
}

/// Summary of a completed sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// New catalog rows committed by this run.
    pub inserted_count: usize,
    /// Listing entries examined.
    pub scanned_count: usize,
    /// Entries skipped because their key has no file name (folder markers).
    pub skipped_folder_markers: usize,
    /// Entries skipped because they are not newer than the watermark.
    pub skipped_by_watermark: usize,
    /// Entries skipped because the key is already catalogued.
    pub skipped_existing: usize,
    /// Number of commits issued.
    pub batches_committed: usize,
    /// Watermark the run started from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark_before: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub(crate) fn new(started_at: DateTime<Utc>, watermark_before: Option<DateTime<Utc>>) -> Self {
        Self {
            inserted_count: 0,
            scanned_count: 0,
            skipped_folder_markers: 0,
            skipped_by_watermark: 0,
            skipped_existing: 0,
            batches_committed: 0,
            watermark_before,
            started_at,
            finished_at: started_at,
        }
    }
}

/// Progress notification emitted after each full batch is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncProgress {
    /// 1-based number of the batch just committed.
    pub batch_number: usize,
    /// Rows inserted by that batch.
    pub batch_inserted: usize,
    /// Rows inserted so far in this run.
    pub total_inserted: usize,
}

/// Callback invoked with each progress notification.
pub type SyncProgressCallback = Arc<dyn Fn(&SyncProgress) + Send + Sync>;
