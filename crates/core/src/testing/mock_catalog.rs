//! Mock catalog for testing.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::catalog::{
    display_name_for, CatalogEntry, CatalogEntrySummary, CatalogError, CatalogStats,
    NewCatalogEntry, ObjectCatalog,
};

#[derive(Debug, Default)]
struct State {
    entries: Vec<CatalogEntry>,
    next_id: i64,
    /// Sizes of successful commits, in order.
    commits: Vec<usize>,
    /// Commit attempts so far (successful or not).
    attempts: usize,
    /// 1-based commit attempt that fails (once).
    fail_on_commit: Option<usize>,
    /// If set, reads fail with this message.
    read_error: Option<String>,
}

/// In-memory implementation of the ObjectCatalog trait.
///
/// Behaves like the SQLite catalog (unique keys, append-only, one timestamp
/// per commit) and additionally:
/// - Records the size of every commit
/// - Fails a chosen commit to simulate a write error
/// - Can be seeded with entries carrying explicit timestamps
#[derive(Debug, Default)]
pub struct MockCatalog {
    state: Mutex<State>,
}

impl MockCatalog {
    /// Create an empty mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog seeded with `(object_key, indexed_at)` entries.
    pub fn with_entries(seed: Vec<(&str, DateTime<Utc>)>) -> Self {
        let catalog = Self::new();
        {
            let mut state = catalog.state.lock().unwrap();
            for (key, indexed_at) in seed {
                state.next_id += 1;
                let id = state.next_id;
                state.entries.push(CatalogEntry {
                    id,
                    display_name: display_name_for(key).to_string(),
                    object_key: key.to_string(),
                    indexed_at,
                });
            }
        }
        catalog
    }

    /// Fail the `attempt`-th commit (1-based, counted from now on the total).
    pub fn fail_on_commit(&self, attempt: usize) {
        self.state.lock().unwrap().fail_on_commit = Some(attempt);
    }

    /// Make every read fail until cleared.
    pub fn set_read_error(&self, message: Option<&str>) {
        self.state.lock().unwrap().read_error = message.map(str::to_string);
    }

    /// Sizes of the successful commits, in order.
    pub fn commits(&self) -> Vec<usize> {
        self.state.lock().unwrap().commits.clone()
    }

    /// Snapshot of all entries in insertion order.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    fn check_read(state: &State) -> Result<(), CatalogError> {
        match &state.read_error {
            Some(msg) => Err(CatalogError::Database(msg.clone())),
            None => Ok(()),
        }
    }
}

impl ObjectCatalog for MockCatalog {
    fn most_recently_indexed(&self) -> Result<Option<CatalogEntry>, CatalogError> {
        let state = self.state.lock().unwrap();
        Self::check_read(&state)?;
        Ok(state
            .entries
            .iter()
            .max_by(|a, b| a.indexed_at.cmp(&b.indexed_at).then(a.id.cmp(&b.id)))
            .cloned())
    }

    fn exists_by_key(&self, object_key: &str) -> Result<bool, CatalogError> {
        let state = self.state.lock().unwrap();
        Self::check_read(&state)?;
        Ok(state.entries.iter().any(|e| e.object_key == object_key))
    }

    fn insert_batch(&self, entries: &[NewCatalogEntry]) -> Result<usize, CatalogError> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if state.fail_on_commit == Some(state.attempts) {
            state.fail_on_commit = None;
            return Err(CatalogError::Database("simulated commit failure".to_string()));
        }

        let newest = state.entries.iter().map(|e| e.indexed_at).max();
        let indexed_at = newest.map_or_else(Utc::now, |n| n.max(Utc::now()));

        let mut inserted = 0;
        for entry in entries {
            if state.entries.iter().any(|e| e.object_key == entry.object_key) {
                continue;
            }
            state.next_id += 1;
            let id = state.next_id;
            state.entries.push(CatalogEntry {
                id,
                display_name: entry.display_name.clone(),
                object_key: entry.object_key.clone(),
                indexed_at,
            });
            inserted += 1;
        }
        state.commits.push(inserted);

        Ok(inserted)
    }

    fn search_by_name(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogEntrySummary>, CatalogError> {
        let state = self.state.lock().unwrap();
        Self::check_read(&state)?;
        let needle = query.to_lowercase();
        Ok(state
            .entries
            .iter()
            .filter(|e| e.display_name.to_lowercase().contains(&needle))
            .take(limit as usize)
            .map(|e| CatalogEntrySummary {
                id: e.id,
                display_name: e.display_name.clone(),
            })
            .collect())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<CatalogEntry>, CatalogError> {
        let state = self.state.lock().unwrap();
        Self::check_read(&state)?;
        Ok(state.entries.iter().find(|e| e.id == id).cloned())
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let state = self.state.lock().unwrap();
        Self::check_read(&state)?;
        Ok(CatalogStats {
            total_entries: state.entries.len() as u64,
            oldest_indexed_at: state.entries.iter().map(|e| e.indexed_at).min(),
            newest_indexed_at: state.entries.iter().map(|e| e.indexed_at).max(),
        })
    }
}
