//! Object catalog - the local, searchable index of remote objects.
//!
//! The catalog is append-only: rows are created by the sync engine and never
//! updated or removed. The most recent `indexed_at` acts as the watermark for
//! differential sync.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

/// Trait for catalog storage.
pub trait ObjectCatalog: Send + Sync {
    /// The entry with the greatest `indexed_at`, if any.
    fn most_recently_indexed(&self) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Check if an entry with this exact object key exists.
    fn exists_by_key(&self, object_key: &str) -> Result<bool, CatalogError>;

    /// Insert a batch of entries as one atomic commit.
    ///
    /// Keys that are already present are ignored, never updated.
    /// Returns the number of rows actually inserted.
    fn insert_batch(&self, entries: &[NewCatalogEntry]) -> Result<usize, CatalogError>;

    /// Substring search on display names, folding Unicode case on both sides.
    fn search_by_name(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogEntrySummary>, CatalogError>;

    /// Look up an entry by id.
    fn get_by_id(&self, id: i64) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Get catalog statistics.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;
}
