//! Prometheus metrics for core components.
//!
//! This module provides metrics for the sync engine (runs, throughput,
//! commits) and for access URL issuance.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync Metrics
// =============================================================================

/// Sync runs total by result.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("objdex_sync_runs_total", "Total sync runs"),
        &["result"], // "success", "listing_error", "store_error"
    )
    .unwrap()
});

/// Sync run duration in seconds.
pub static SYNC_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("objdex_sync_duration_seconds", "Duration of sync runs").buckets(
            vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0],
        ),
        &["result"],
    )
    .unwrap()
});

/// Listing entries examined.
pub static OBJECTS_SCANNED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "objdex_objects_scanned_total",
        "Total listing entries examined by sync",
    )
    .unwrap()
});

/// Catalog rows inserted.
pub static OBJECTS_INDEXED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "objdex_objects_indexed_total",
        "Total objects added to the catalog",
    )
    .unwrap()
});

/// Batches committed.
pub static BATCHES_COMMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "objdex_batches_committed_total",
        "Total catalog batches committed",
    )
    .unwrap()
});

// =============================================================================
// Access URL Metrics
// =============================================================================

/// Access URLs issued by result.
pub static ACCESS_URLS_ISSUED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("objdex_access_urls_total", "Total access URL requests"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Sync
        Box::new(SYNC_RUNS.clone()),
        Box::new(SYNC_DURATION.clone()),
        Box::new(OBJECTS_SCANNED.clone()),
        Box::new(OBJECTS_INDEXED.clone()),
        Box::new(BATCHES_COMMITTED.clone()),
        // Access
        Box::new(ACCESS_URLS_ISSUED.clone()),
    ]
}
