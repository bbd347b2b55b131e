//! Mock listing source for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream::{self, StreamExt};

use crate::listing::{ListingError, ListingPage, ListingSource, ListingStream};

/// Mock implementation of the ListingSource trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable pages in order
/// - Fail at a chosen page to simulate auth or network errors
/// - Track listed containers and served pages for assertions
///
/// # Example
///
/// ```rust,ignore
/// use objdex_core::testing::{fixtures, MockListingSource};
///
/// let listing = MockListingSource::with_pages(vec![
///     fixtures::page(&["a/doc1.pdf", "doc2.pdf"]),
/// ]);
/// listing.fail_at_page(1, ListingError::Network("reset".into()));
/// ```
#[derive(Debug, Default)]
pub struct MockListingSource {
    /// Pages returned by every listing.
    pages: Mutex<Vec<ListingPage>>,
    /// Page index at which the listing fails, and with what.
    failure: Mutex<Option<(usize, ListingError)>>,
    /// Containers passed to `list_all`.
    calls: Mutex<Vec<String>>,
    /// Pages handed out across all listings.
    pages_served: Arc<AtomicUsize>,
}

impl MockListingSource {
    /// Create a mock with an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with predefined pages.
    pub fn with_pages(pages: Vec<ListingPage>) -> Self {
        let listing = Self::new();
        listing.set_pages(pages);
        listing
    }

    /// Replace the pages returned by subsequent listings.
    pub fn set_pages(&self, pages: Vec<ListingPage>) {
        *self.pages.lock().unwrap() = pages;
    }

    /// Make listings fail when page `index` (0-based) is requested.
    pub fn fail_at_page(&self, index: usize, error: ListingError) {
        *self.failure.lock().unwrap() = Some((index, error));
    }

    /// Remove any configured failure.
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Containers listed so far.
    pub fn list_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Total pages handed out so far.
    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }
}

impl ListingSource for MockListingSource {
    fn list_all<'a>(&'a self, container: &'a str) -> ListingStream<'a> {
        self.calls.lock().unwrap().push(container.to_string());

        let pages = self.pages.lock().unwrap().clone();
        let failure = self.failure.lock().unwrap().clone();

        let mut results = Vec::with_capacity(pages.len() + 1);
        for (idx, page) in pages.into_iter().enumerate() {
            if let Some((fail_idx, ref err)) = failure {
                if fail_idx == idx {
                    results.push(Err(err.clone()));
                    break;
                }
            }
            results.push(Ok(page));
        }
        if let Some((fail_idx, err)) = failure {
            if fail_idx >= results.len() && results.iter().all(Result::is_ok) {
                results.push(Err(err));
            }
        }

        let served = Arc::clone(&self.pages_served);
        stream::iter(results)
            .inspect(move |result| {
                if result.is_ok() {
                    served.fetch_add(1, Ordering::SeqCst);
                }
            })
            .boxed()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
