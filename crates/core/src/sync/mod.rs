//! Differential sync of a remote container into the object catalog.
//!
//! - **Engine**: one run, batched commits, watermark plus key de-duplication
//! - **Scheduler**: periodic and manual runs, never two at once

mod config;
mod engine;
mod scheduler;
mod types;

pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use scheduler::{SchedulerStatus, SyncScheduler};
pub use types::{SyncError, SyncProgress, SyncProgressCallback, SyncReport};
