//! Types for remote object listings.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One object as reported by the remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedObject {
    /// Full object key.
    pub key: String,
    /// Last-modified time, when the listing reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ListedObject {
    pub fn new(key: impl Into<String>, last_modified: Option<DateTime<Utc>>) -> Self {
        Self {
            key: key.into(),
            last_modified,
        }
    }
}

/// One page of a listing, in the order the remote returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub entries: Vec<ListedObject>,
}

/// Lazy, finite sequence of listing pages.
pub type ListingStream<'a> = BoxStream<'a, Result<ListingPage, ListingError>>;

/// Errors from the listing source.
#[derive(Debug, Clone, Error)]
pub enum ListingError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    Unauthorized(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("provider error: {0}")]
    Provider(String),
}
