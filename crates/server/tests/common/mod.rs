//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! backed by a real SQLite catalog and mock remote collaborators, so the
//! HTTP surface can be exercised without a bucket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use objdex_core::{
    load_config_from_str,
    testing::{MockListingSource, MockUrlIssuer},
    ObjectCatalog, SqliteCatalog, SyncEngine, SyncScheduler,
};
use objdex_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use objdex_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new();
///     fixture.listing.set_pages(vec![fixtures::page(&["a/doc1.pdf"])]);
///     fixture.post("/api/v1/sync").await;
///
///     let response = fixture.get("/api/v1/search?q=doc").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Real catalog on disk
    pub catalog: Arc<SqliteCatalog>,
    /// Mock listing - configure what the bucket contains
    pub listing: Arc<MockListingSource>,
    /// Mock URL issuer - inspect or fail URL requests
    pub url_issuer: Arc<MockUrlIssuer>,
    /// Scheduler shared with the router
    pub scheduler: Arc<SyncScheduler>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub fn new() -> Self {
        Self::with_toml("")
    }

    /// Create a test fixture with extra TOML appended to the base config.
    pub fn with_toml(extra: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let toml = format!(
            r#"
[storage]
bucket = "test-bucket"
region = "us-east-1"
profile = "ops"

[database]
path = "{}"
{}
"#,
            db_path.display(),
            extra
        );
        let config = load_config_from_str(&toml).expect("Failed to parse test config");

        let catalog = Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));
        let listing = Arc::new(MockListingSource::new());
        let url_issuer = Arc::new(MockUrlIssuer::new());

        let engine = SyncEngine::new(
            config.storage.bucket.clone(),
            config.sync.clone(),
            Arc::clone(&catalog) as Arc<dyn ObjectCatalog>,
            Arc::clone(&listing) as Arc<dyn objdex_core::ListingSource>,
        );
        let scheduler = Arc::new(SyncScheduler::new(Arc::new(engine), config.sync.clone()));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&catalog) as Arc<dyn ObjectCatalog>,
            Arc::clone(&url_issuer) as Arc<dyn objdex_core::UrlIssuer>,
            Arc::clone(&scheduler),
        ));

        let router = create_router(state);

        Self {
            router,
            catalog,
            listing,
            url_issuer,
            scheduler,
            temp_dir,
        }
    }

    /// Seed the catalog by running a sync over the given keys.
    pub async fn seed(&self, keys: &[&str]) {
        self.listing.set_pages(vec![fixtures::page(keys)]);
        self.scheduler.trigger().await.expect("Seed sync failed");
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
