//! Differential sync engine.
//!
//! Walks the remote listing page by page and appends catalog rows for
//! objects that are newer than the watermark and not yet catalogued.
//! Staged rows are committed in batches; a failure keeps earlier batches
//! and discards the pending one, so the next run resumes from the advanced
//! watermark.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tracing::{debug, error, info, trace, warn};

use crate::catalog::{NewCatalogEntry, ObjectCatalog};
use crate::listing::{ListedObject, ListingSource};
use crate::metrics::{BATCHES_COMMITTED, OBJECTS_INDEXED, OBJECTS_SCANNED, SYNC_DURATION, SYNC_RUNS};

use super::config::SyncConfig;
use super::types::{SyncError, SyncProgress, SyncProgressCallback, SyncReport};

/// What to do with one listing entry.
#[derive(Debug)]
enum Decision {
    Stage(NewCatalogEntry),
    FolderMarker,
    NotNewer,
    Existing,
}

/// Entries staged for the next commit.
struct Batch {
    entries: Vec<NewCatalogEntry>,
    keys: HashSet<String>,
}

impl Batch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            keys: HashSet::with_capacity(capacity),
        }
    }

    fn push(&mut self, entry: NewCatalogEntry) {
        self.keys.insert(entry.object_key.clone());
        self.entries.push(entry);
    }

    fn contains(&self, object_key: &str) -> bool {
        self.keys.contains(object_key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}

/// Indexes new objects from one container into the catalog.
///
/// The engine does not serialize concurrent calls to [`SyncEngine::synchronize`];
/// callers must not overlap runs (see `SyncScheduler`).
pub struct SyncEngine {
    container: String,
    config: SyncConfig,
    catalog: Arc<dyn ObjectCatalog>,
    listing: Arc<dyn ListingSource>,
    progress: Option<SyncProgressCallback>,
}

impl SyncEngine {
    /// Create an engine that syncs `container` into `catalog`.
    pub fn new(
        container: impl Into<String>,
        mut config: SyncConfig,
        catalog: Arc<dyn ObjectCatalog>,
        listing: Arc<dyn ListingSource>,
    ) -> Self {
        config.batch_size = config.batch_size.max(1);
        Self {
            container: container.into(),
            config,
            catalog,
            listing,
            progress: None,
        }
    }

    /// Set a callback invoked after each full batch is committed.
    pub fn with_progress_callback(mut self, callback: SyncProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// The container this engine indexes.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Run one differential sync.
    pub async fn synchronize(&self) -> Result<SyncReport, SyncError> {
        let timer = Instant::now();
        let mut report = SyncReport::new(Utc::now(), None);

        info!(
            "Starting sync of {} via {} listing",
            self.container,
            self.listing.name()
        );

        let result = self.run(&mut report).await;
        report.finished_at = Utc::now();
        let elapsed = timer.elapsed().as_secs_f64();

        match result {
            Ok(()) => {
                SYNC_RUNS.with_label_values(&["success"]).inc();
                SYNC_DURATION.with_label_values(&["success"]).observe(elapsed);
                info!(
                    "Sync of {} finished: {} new objects indexed ({} scanned, {} batches, {:.1}s)",
                    self.container,
                    report.inserted_count,
                    report.scanned_count,
                    report.batches_committed,
                    elapsed
                );
                Ok(report)
            }
            Err(e) => {
                SYNC_RUNS.with_label_values(&[e.kind()]).inc();
                SYNC_DURATION.with_label_values(&[e.kind()]).observe(elapsed);
                error!(
                    "Sync of {} failed after committing {} objects in {} batches: {}",
                    self.container, report.inserted_count, report.batches_committed, e
                );
                Err(e)
            }
        }
    }

    async fn run(&self, report: &mut SyncReport) -> Result<(), SyncError> {
        let watermark = self
            .catalog
            .most_recently_indexed()
            .map_err(SyncError::StorePersistence)?
            .map(|entry| entry.indexed_at);
        report.watermark_before = watermark;

        match watermark {
            Some(ts) => info!("Indexing objects modified after {}", ts.to_rfc3339()),
            None => info!("Catalog is empty, indexing every object"),
        }

        let mut batch = Batch::with_capacity(self.config.batch_size);
        let mut pages = self.listing.list_all(&self.container);

        while let Some(page) = pages.next().await {
            let page = page.map_err(SyncError::ListingUnavailable)?;
            debug!("Processing listing page with {} objects", page.entries.len());

            for object in &page.entries {
                report.scanned_count += 1;
                OBJECTS_SCANNED.inc();

                match self.classify(object, watermark, &batch)? {
                    Decision::Stage(entry) => {
                        batch.push(entry);
                        if batch.len() >= self.config.batch_size {
                            let inserted = self.flush(&mut batch, report)?;
                            self.notify(SyncProgress {
                                batch_number: report.batches_committed,
                                batch_inserted: inserted,
                                total_inserted: report.inserted_count,
                            });
                        }
                    }
                    Decision::FolderMarker => report.skipped_folder_markers += 1,
                    Decision::NotNewer => report.skipped_by_watermark += 1,
                    Decision::Existing => report.skipped_existing += 1,
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, report)?;
        }

        Ok(())
    }

    /// Decide whether a listed object becomes a new catalog row.
    ///
    /// Every entry is compared on its own; listings are not assumed to be
    /// ordered by modification time.
    fn classify(
        &self,
        object: &ListedObject,
        watermark: Option<DateTime<Utc>>,
        batch: &Batch,
    ) -> Result<Decision, SyncError> {
        let Some(entry) = NewCatalogEntry::from_key(&object.key) else {
            trace!("Skipping folder marker {}", object.key);
            return Ok(Decision::FolderMarker);
        };

        if let (Some(watermark), Some(modified)) = (watermark, object.last_modified) {
            if modified <= watermark {
                return Ok(Decision::NotNewer);
            }
        }

        // The watermark alone is not trusted: objects uploaded while a run
        // was committing can carry timestamps past it.
        if batch.contains(&entry.object_key)
            || self
                .catalog
                .exists_by_key(&entry.object_key)
                .map_err(SyncError::StorePersistence)?
        {
            return Ok(Decision::Existing);
        }

        Ok(Decision::Stage(entry))
    }

    /// Commit the staged batch. On error the batch is left for the caller to drop.
    fn flush(&self, batch: &mut Batch, report: &mut SyncReport) -> Result<usize, SyncError> {
        let staged = batch.len();
        let inserted = self
            .catalog
            .insert_batch(&batch.entries)
            .map_err(SyncError::StorePersistence)?;
        batch.clear();

        report.batches_committed += 1;
        report.inserted_count += inserted;
        BATCHES_COMMITTED.inc();
        OBJECTS_INDEXED.inc_by(inserted as u64);

        if inserted < staged {
            let ignored = staged - inserted;
            report.skipped_existing += ignored;
            warn!(
                "{} staged objects were already catalogued at commit time (overlapping run?)",
                ignored
            );
        }

        Ok(inserted)
    }

    fn notify(&self, progress: SyncProgress) {
        info!(
            "Batch {} committed, {} objects indexed so far",
            progress.batch_number, progress.total_inserted
        );
        if let Some(callback) = &self.progress {
            callback(&progress);
        }
    }
}
