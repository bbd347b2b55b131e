//! Sync configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the sync engine and its scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Staged entries per commit.
    /// Bounds memory and transaction size; each commit is durable on its own.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds between scheduled runs (0 = no periodic sync).
    /// Runs can still be triggered manually or with `--sync-once`.
    #[serde(default)]
    pub interval_secs: u64,

    /// Run one sync as soon as the scheduler starts.
    #[serde(default)]
    pub run_on_startup: bool,
}

fn default_batch_size() -> usize {
    500
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            interval_secs: 0,
            run_on_startup: false,
        }
    }
}
