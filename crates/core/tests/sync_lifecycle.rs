//! Sync lifecycle integration tests.
//!
//! These tests run the sync engine against a real on-disk SQLite catalog
//! and a scripted listing, across several consecutive runs.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use objdex_core::{
    listing::{ListingError, ListingPage},
    testing::{fixtures, MockListingSource},
    ObjectCatalog, SqliteCatalog, SyncConfig, SyncEngine, SyncError, SyncScheduler,
};

/// Test helper holding a catalog on disk and a scripted listing.
struct TestHarness {
    catalog: Arc<SqliteCatalog>,
    listing: Arc<MockListingSource>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("catalog.db");
        let catalog = Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));

        Self {
            catalog,
            listing: Arc::new(MockListingSource::new()),
            _temp_dir: temp_dir,
        }
    }

    fn engine(&self) -> SyncEngine {
        self.engine_with(SyncConfig::default())
    }

    fn engine_with(&self, config: SyncConfig) -> SyncEngine {
        SyncEngine::new("docs", config, self.catalog.clone(), self.listing.clone())
    }

    fn set_pages(&self, pages: Vec<ListingPage>) {
        self.listing.set_pages(pages);
    }
}

#[tokio::test]
async fn test_first_run_indexes_files_and_skips_folders() {
    let harness = TestHarness::new();
    harness.set_pages(vec![fixtures::page(&["a/doc1.pdf", "doc2.pdf", "a/"])]);

    let report = harness.engine().synchronize().await.unwrap();

    assert_eq!(report.inserted_count, 2);
    assert_eq!(report.skipped_folder_markers, 1);

    let mut names: Vec<String> = harness
        .catalog
        .search_by_name("doc", 20)
        .unwrap()
        .into_iter()
        .map(|s| s.display_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["doc1.pdf", "doc2.pdf"]);
    assert!(harness.catalog.exists_by_key("a/doc1.pdf").unwrap());
    assert!(!harness.catalog.exists_by_key("a/").unwrap());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let harness = TestHarness::new();
    let keys = fixtures::keys(30);
    harness.set_pages(fixtures::paged(&keys, 10, Utc::now()));

    let first = harness.engine().synchronize().await.unwrap();
    let second = harness.engine().synchronize().await.unwrap();

    assert_eq!(first.inserted_count, 30);
    assert_eq!(second.inserted_count, 0);
    assert_eq!(second.batches_committed, 0);
    assert_eq!(harness.catalog.stats().unwrap().total_entries, 30);
}

#[tokio::test]
async fn test_watermark_filters_between_runs() {
    let harness = TestHarness::new();
    harness.set_pages(vec![fixtures::page(&["seed.txt"])]);
    harness.engine().synchronize().await.unwrap();

    let watermark = harness
        .catalog
        .most_recently_indexed()
        .unwrap()
        .expect("seed entry")
        .indexed_at;

    harness.set_pages(vec![ListingPage {
        entries: vec![
            fixtures::listed("older.txt", Some(watermark - Duration::minutes(1))),
            fixtures::listed("newer.txt", Some(watermark + Duration::minutes(1))),
        ],
    }]);
    let report = harness.engine().synchronize().await.unwrap();

    assert_eq!(report.inserted_count, 1);
    assert_eq!(report.skipped_by_watermark, 1);
    assert_eq!(report.watermark_before, Some(watermark));
    assert!(harness.catalog.exists_by_key("newer.txt").unwrap());
    assert!(!harness.catalog.exists_by_key("older.txt").unwrap());
}

#[tokio::test]
async fn test_watermark_advances_to_newest_inserted() {
    let harness = TestHarness::new();
    harness.set_pages(vec![fixtures::page(&["one.txt", "two.txt"])]);
    harness.engine().synchronize().await.unwrap();
    let before = harness.catalog.most_recently_indexed().unwrap().unwrap();

    harness.set_pages(vec![ListingPage {
        entries: vec![fixtures::listed("three.txt", None)],
    }]);
    harness.engine().synchronize().await.unwrap();

    let after = harness.catalog.most_recently_indexed().unwrap().unwrap();
    assert_eq!(after.object_key, "three.txt");
    assert!(after.indexed_at >= before.indexed_at);

    let stats = harness.catalog.stats().unwrap();
    assert_eq!(stats.newest_indexed_at, Some(after.indexed_at));

    // Nothing new: watermark stays put.
    harness.engine().synchronize().await.unwrap();
    let unchanged = harness.catalog.most_recently_indexed().unwrap().unwrap();
    assert_eq!(unchanged.indexed_at, after.indexed_at);
}

#[tokio::test]
async fn test_no_duplicate_keys_across_runs() {
    let harness = TestHarness::new();
    let keys = fixtures::keys(12);

    // Undated objects bypass the watermark, so only the key check applies.
    let undated = |keys: &[String]| ListingPage {
        entries: keys.iter().map(|k| fixtures::listed(k, None)).collect(),
    };
    harness.set_pages(vec![undated(&keys[..8])]);
    harness.engine().synchronize().await.unwrap();

    harness.set_pages(vec![undated(&keys[4..]), undated(&keys[..2])]);
    let report = harness.engine().synchronize().await.unwrap();

    assert_eq!(report.inserted_count, 4);
    assert_eq!(report.skipped_existing, 6);

    let hits = harness.catalog.search_by_name("file-", 100).unwrap();
    assert_eq!(hits.len(), 12);
    let unique: HashSet<String> = hits.into_iter().map(|s| s.display_name).collect();
    assert_eq!(unique.len(), 12);
}

#[tokio::test]
async fn test_large_listing_commits_in_batches() {
    let harness = TestHarness::new();
    let keys = fixtures::keys(1201);
    harness.set_pages(fixtures::paged(&keys, 1000, Utc::now()));

    let report = harness.engine().synchronize().await.unwrap();

    assert_eq!(report.inserted_count, 1201);
    assert_eq!(report.batches_committed, 3);
    assert_eq!(harness.listing.pages_served(), 2);
    assert_eq!(harness.catalog.stats().unwrap().total_entries, 1201);
}

#[tokio::test]
async fn test_listing_failure_keeps_committed_batches() {
    let harness = TestHarness::new();
    let keys = fixtures::keys(700);
    harness.set_pages(fixtures::paged(&keys, 350, Utc::now() + Duration::hours(1)));
    harness
        .listing
        .fail_at_page(2, ListingError::Network("connection reset".into()));

    let err = harness
        .engine_with(SyncConfig {
            batch_size: 300,
            ..SyncConfig::default()
        })
        .synchronize()
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::ListingUnavailable(ListingError::Network(_))));
    // Two full batches of 300 were committed; the 100 staged rows were dropped.
    assert_eq!(harness.catalog.stats().unwrap().total_entries, 600);

    harness.listing.clear_failure();
    let resumed = harness.engine().synchronize().await.unwrap();
    assert_eq!(resumed.inserted_count, 100);
    assert_eq!(harness.catalog.stats().unwrap().total_entries, 700);
}

#[tokio::test]
async fn test_unknown_bucket_fails_without_writes() {
    let harness = TestHarness::new();
    harness
        .listing
        .fail_at_page(0, ListingError::NotFound("docs".into()));

    let err = harness.engine().synchronize().await.unwrap_err();

    assert!(matches!(err, SyncError::ListingUnavailable(ListingError::NotFound(_))));
    assert_eq!(harness.catalog.stats().unwrap().total_entries, 0);
}

#[tokio::test]
async fn test_catalog_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let listing = Arc::new(MockListingSource::with_pages(vec![fixtures::page(&[
        "reports/q1.pdf",
        "reports/q2.pdf",
    ])]));

    {
        let catalog = Arc::new(SqliteCatalog::new(&db_path).unwrap());
        SyncEngine::new("docs", SyncConfig::default(), catalog, listing.clone())
            .synchronize()
            .await
            .unwrap();
    }

    let catalog = Arc::new(SqliteCatalog::new(&db_path).unwrap());
    let report = SyncEngine::new("docs", SyncConfig::default(), catalog.clone(), listing)
        .synchronize()
        .await
        .unwrap();

    assert_eq!(report.inserted_count, 0);
    assert_eq!(catalog.stats().unwrap().total_entries, 2);
}

#[tokio::test]
async fn test_scheduler_trigger_against_sqlite() {
    let harness = TestHarness::new();
    harness.set_pages(vec![fixtures::page(&["inbox/scan.tiff"])]);
    let scheduler = SyncScheduler::new(Arc::new(harness.engine()), SyncConfig::default());

    let report = scheduler.trigger().await.unwrap();
    assert_eq!(report.inserted_count, 1);

    let status = scheduler.status().await;
    assert_eq!(status.last_report.unwrap().inserted_count, 1);
    assert!(!status.sync_in_progress);
}
