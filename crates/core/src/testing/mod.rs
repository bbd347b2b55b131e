//! Testing utilities and mock implementations.
//!
//! Mocks for every external seam of the sync pipeline, so sync runs and the
//! HTTP surface can be exercised without a real bucket or database.
//!
//! # Example
//!
//! ```rust,ignore
//! use objdex_core::testing::{fixtures, MockCatalog, MockListingSource};
//!
//! let catalog = MockCatalog::new();
//! let listing = MockListingSource::with_pages(vec![
//!     fixtures::page(&["a/doc1.pdf", "doc2.pdf", "a/"]),
//! ]);
//!
//! // Wire into a SyncEngine...
//! ```

mod mock_catalog;
mod mock_listing;
mod mock_url_issuer;

pub use mock_catalog::MockCatalog;
pub use mock_listing::MockListingSource;
pub use mock_url_issuer::MockUrlIssuer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Utc};

    use crate::listing::{ListedObject, ListingPage};

    /// A listed object with an optional last-modified time.
    pub fn listed(key: &str, last_modified: Option<DateTime<Utc>>) -> ListedObject {
        ListedObject::new(key, last_modified)
    }

    /// A page of objects modified right now.
    pub fn page(keys: &[&str]) -> ListingPage {
        let now = Utc::now();
        ListingPage {
            entries: keys.iter().map(|k| listed(k, Some(now))).collect(),
        }
    }

    /// `count` distinct keys of the form `docs/file-00000.bin`.
    pub fn keys(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("docs/file-{:05}.bin", i)).collect()
    }

    /// Split keys into pages of at most `page_size`, all modified at `at`.
    pub fn paged(keys: &[String], page_size: usize, at: DateTime<Utc>) -> Vec<ListingPage> {
        keys.chunks(page_size.max(1))
            .map(|chunk| ListingPage {
                entries: chunk.iter().map(|k| listed(k, Some(at))).collect(),
            })
            .collect()
    }
}
