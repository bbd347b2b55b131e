//! Types for the object catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A remote object recorded in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Surrogate id assigned by the store.
    pub id: i64,
    /// Final path segment of the object key.
    pub display_name: String,
    /// Full object key within the bucket (unique).
    pub object_key: String,
    /// When the entry was committed. Also the sync watermark.
    pub indexed_at: DateTime<Utc>,
}

/// An entry staged for insertion; id and timestamp are assigned on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogEntry {
    pub display_name: String,
    pub object_key: String,
}

impl NewCatalogEntry {
    /// Stage an entry for `object_key`.
    ///
    /// Returns `None` for folder markers, i.e. keys whose final segment is empty.
    pub fn from_key(object_key: &str) -> Option<Self> {
        let display_name = display_name_for(object_key);
        if display_name.is_empty() {
            return None;
        }
        Some(Self {
            display_name: display_name.to_string(),
            object_key: object_key.to_string(),
        })
    }
}

/// Everything after the last `/` of a key, or the whole key when it has none.
pub fn display_name_for(object_key: &str) -> &str {
    match object_key.rfind('/') {
        Some(idx) => &object_key[idx + 1..],
        None => object_key,
    }
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntrySummary {
    pub id: i64,
    pub display_name: String,
}

/// Catalog statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Total indexed objects.
    pub total_entries: u64,
    /// Oldest entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_indexed_at: Option<DateTime<Utc>>,
    /// Most recent entry (the current watermark).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_indexed_at: Option<DateTime<Utc>>,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_takes_last_segment() {
        assert_eq!(display_name_for("a/b/report.pdf"), "report.pdf");
        assert_eq!(display_name_for("a/doc1.pdf"), "doc1.pdf");
    }

    #[test]
    fn test_display_name_without_separator() {
        assert_eq!(display_name_for("doc2.pdf"), "doc2.pdf");
    }

    #[test]
    fn test_folder_marker_is_not_staged() {
        assert_eq!(display_name_for("a/"), "");
        assert!(NewCatalogEntry::from_key("a/").is_none());
        assert!(NewCatalogEntry::from_key("").is_none());
    }

    #[test]
    fn test_from_key_keeps_full_key() {
        let entry = NewCatalogEntry::from_key("invoices/2024/march.pdf").unwrap();
        assert_eq!(entry.display_name, "march.pdf");
        assert_eq!(entry.object_key, "invoices/2024/march.pdf");
    }

    #[test]
    fn test_catalog_stats_serialization() {
        let stats = CatalogStats {
            total_entries: 3,
            oldest_indexed_at: None,
            newest_indexed_at: Some(Utc::now()),
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(!json.contains("oldest_indexed_at")); // None should be skipped
        assert!(json.contains("newest_indexed_at"));
    }
}
