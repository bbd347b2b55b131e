//! Periodic and on-demand sync runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use super::config::SyncConfig;
use super::engine::SyncEngine;
use super::types::{SyncError, SyncReport};

/// Outcome of the most recent finished run.
#[derive(Debug, Clone, Default)]
struct LastRun {
    report: Option<SyncReport>,
    error: Option<String>,
    finished_at: Option<DateTime<Utc>>,
}

/// Current status of the scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Whether the periodic loop is running.
    pub running: bool,
    /// Whether a sync run holds the run lock right now.
    pub sync_in_progress: bool,
    /// Seconds between scheduled runs (0 = manual only).
    pub interval_secs: u64,
    /// Report of the last successful run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_report: Option<SyncReport>,
    /// Error of the last run, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_finished_at: Option<DateTime<Utc>>,
}

/// Runs the sync engine on an interval and on demand, one run at a time.
pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    config: SyncConfig,

    // Runtime state
    run_lock: Arc<Mutex<()>>,
    running: Arc<AtomicBool>,
    last_run: Arc<RwLock<LastRun>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncScheduler {
    /// Create a new scheduler.
    pub fn new(engine: Arc<SyncEngine>, config: SyncConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            engine,
            config,
            run_lock: Arc::new(Mutex::new(())),
            running: Arc::new(AtomicBool::new(false)),
            last_run: Arc::new(RwLock::new(LastRun::default())),
            shutdown_tx,
        }
    }

    /// Start the scheduler (spawns the periodic loop).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync scheduler already running");
            return;
        }

        if self.config.interval_secs == 0 && !self.config.run_on_startup {
            info!("Periodic sync disabled, runs must be triggered manually");
            return;
        }

        let engine = Arc::clone(&self.engine);
        let run_lock = Arc::clone(&self.run_lock);
        let last_run = Arc::clone(&self.last_run);
        let running = Arc::clone(&self.running);
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            if config.run_on_startup {
                info!("Running startup sync of {}", engine.container());
                Self::run_scheduled(&engine, &run_lock, &last_run).await;
            }

            if config.interval_secs == 0 {
                return;
            }

            info!("Sync loop started (every {}s)", config.interval_secs);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Sync loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_secs(config.interval_secs)) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        Self::run_scheduled(&engine, &run_lock, &last_run).await;
                    }
                }
            }
            info!("Sync loop stopped");
        });

        info!("Sync scheduler started");
    }

    /// Stop the scheduler and wait for an in-flight run to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Sync scheduler not running");
            return;
        }

        info!("Stopping sync scheduler");
        let _ = self.shutdown_tx.send(());

        // Acquiring the lock waits out a run that is mid-commit.
        let _guard = self.run_lock.lock().await;

        info!("Sync scheduler stopped");
    }

    /// Run one sync now.
    ///
    /// Returns [`SyncError::AlreadyRunning`] immediately if a run is in progress.
    pub async fn trigger(&self) -> Result<SyncReport, SyncError> {
        Self::run_exclusive(&self.engine, &self.run_lock, &self.last_run).await
    }

    /// Get current scheduler status.
    pub async fn status(&self) -> SchedulerStatus {
        let last = self.last_run.read().await.clone();

        SchedulerStatus {
            running: self.running.load(Ordering::Relaxed),
            sync_in_progress: self.run_lock.try_lock().is_err(),
            interval_secs: self.config.interval_secs,
            last_report: last.report,
            last_error: last.error,
            last_finished_at: last.finished_at,
        }
    }

    async fn run_scheduled(engine: &SyncEngine, run_lock: &Mutex<()>, last_run: &RwLock<LastRun>) {
        match Self::run_exclusive(engine, run_lock, last_run).await {
            Ok(_) => {}
            Err(SyncError::AlreadyRunning) => {
                debug!("Skipping scheduled sync, a run is already in progress");
            }
            Err(e) => warn!("Scheduled sync failed: {}", e),
        }
    }

    async fn run_exclusive(
        engine: &SyncEngine,
        run_lock: &Mutex<()>,
        last_run: &RwLock<LastRun>,
    ) -> Result<SyncReport, SyncError> {
        let _guard = run_lock.try_lock().map_err(|_| SyncError::AlreadyRunning)?;

        let result = engine.synchronize().await;

        let mut last = last_run.write().await;
        last.finished_at = Some(Utc::now());
        match &result {
            Ok(report) => {
                last.report = Some(report.clone());
                last.error = None;
            }
            Err(e) => last.error = Some(e.to_string()),
        }

        result
    }
}
