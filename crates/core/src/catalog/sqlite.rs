//! SQLite-backed object catalog implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{CatalogEntry, CatalogEntrySummary, CatalogError, CatalogStats, NewCatalogEntry, ObjectCatalog};

/// SQLite-backed object catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- One row per indexed object (object_key is the natural key)
            CREATE TABLE IF NOT EXISTS catalog_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                display_name TEXT NOT NULL,
                object_key TEXT NOT NULL UNIQUE,
                indexed_at TEXT NOT NULL,
                -- Case-folded display_name; SQLite LIKE only folds ASCII
                search_name TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_entries_display_name ON catalog_entries(display_name);
            CREATE INDEX IF NOT EXISTS idx_catalog_entries_indexed_at ON catalog_entries(indexed_at);
            "#,
        )?;

        Self::migrate_search_name(conn)?;

        Ok(())
    }

    /// Add and backfill `search_name` on catalogs created before it existed.
    fn migrate_search_name(conn: &Connection) -> Result<(), CatalogError> {
        let has_column: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('catalog_entries') WHERE name = 'search_name'",
            [],
            |row| row.get(0),
        )?;
        if has_column {
            return Ok(());
        }

        info!("Adding search_name column to catalog_entries");
        conn.execute_batch(
            "ALTER TABLE catalog_entries ADD COLUMN search_name TEXT NOT NULL DEFAULT ''",
        )?;

        let mut select = conn.prepare("SELECT id, display_name FROM catalog_entries")?;
        let rows = select
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut update = conn.prepare("UPDATE catalog_entries SET search_name = ? WHERE id = ?")?;
        for (id, display_name) in &rows {
            update.execute(params![Self::fold_case(display_name), id])?;
        }

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("catalog connection lock poisoned".to_string()))
    }

    /// Fixed-width text so lexical order in SQLite matches chronological order.
    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
            })
    }

    /// Timestamp for the next commit: the current time, but never earlier
    /// than the newest stored entry.
    fn next_timestamp(conn: &Connection) -> Result<DateTime<Utc>, CatalogError> {
        let now = Utc::now().trunc_subsecs(6);
        let newest: Option<String> = conn.query_row(
            "SELECT MAX(indexed_at) FROM catalog_entries",
            [],
            |row| row.get(0),
        )?;

        match newest {
            Some(raw) => {
                let newest = Self::parse_timestamp(0, &raw)?;
                Ok(now.max(newest))
            }
            None => Ok(now),
        }
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
        let indexed_at: String = row.get(3)?;
        Ok(CatalogEntry {
            id: row.get(0)?,
            display_name: row.get(1)?,
            object_key: row.get(2)?,
            indexed_at: Self::parse_timestamp(3, &indexed_at)?,
        })
    }

    /// Unicode case folding applied to stored names and queries alike.
    fn fold_case(text: &str) -> String {
        text.to_lowercase()
    }

    /// Escape LIKE wildcards so the query matches literally.
    fn like_pattern(query: &str) -> String {
        let mut escaped = String::with_capacity(query.len() + 2);
        escaped.push('%');
        for c in query.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        escaped
    }
}

impl ObjectCatalog for SqliteCatalog {
    fn most_recently_indexed(&self) -> Result<Option<CatalogEntry>, CatalogError> {
        let conn = self.conn()?;

        let entry = conn
            .query_row(
                "SELECT id, display_name, object_key, indexed_at
                 FROM catalog_entries
                 ORDER BY indexed_at DESC, id DESC
                 LIMIT 1",
                [],
                Self::row_to_entry,
            )
            .optional()?;

        Ok(entry)
    }

    fn exists_by_key(&self, object_key: &str) -> Result<bool, CatalogError> {
        let conn = self.conn()?;

        let exists = conn
            .query_row(
                "SELECT 1 FROM catalog_entries WHERE object_key = ?",
                params![object_key],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        Ok(exists)
    }

    fn insert_batch(&self, entries: &[NewCatalogEntry]) -> Result<usize, CatalogError> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let indexed_at = Self::format_timestamp(&Self::next_timestamp(&tx)?);

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO catalog_entries (display_name, object_key, indexed_at, search_name)
                 VALUES (?, ?, ?, ?)",
            )?;
            for entry in entries {
                inserted += stmt.execute(params![
                    &entry.display_name,
                    &entry.object_key,
                    &indexed_at,
                    Self::fold_case(&entry.display_name),
                ])?;
            }
        }

        // Dropping `tx` on an error path above rolls the whole batch back.
        tx.commit()?;

        Ok(inserted)
    }

    fn search_by_name(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogEntrySummary>, CatalogError> {
        let conn = self.conn()?;
        let pattern = Self::like_pattern(&Self::fold_case(query));

        let mut stmt = conn.prepare(
            "SELECT id, display_name FROM catalog_entries
             WHERE search_name LIKE ?1 ESCAPE '\\'
             ORDER BY id
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![&pattern, limit], |row| {
            Ok(CatalogEntrySummary {
                id: row.get(0)?,
                display_name: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<CatalogEntry>, CatalogError> {
        let conn = self.conn()?;

        let entry = conn
            .query_row(
                "SELECT id, display_name, object_key, indexed_at FROM catalog_entries WHERE id = ?",
                params![id],
                Self::row_to_entry,
            )
            .optional()?;

        Ok(entry)
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.conn()?;

        let (total_entries, oldest, newest): (u64, Option<String>, Option<String>) = conn
            .query_row(
                "SELECT COUNT(*), MIN(indexed_at), MAX(indexed_at) FROM catalog_entries",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

        let oldest_indexed_at = oldest
            .map(|raw| Self::parse_timestamp(1, &raw))
            .transpose()?;
        let newest_indexed_at = newest
            .map(|raw| Self::parse_timestamp(2, &raw))
            .transpose()?;

        Ok(CatalogStats {
            total_entries,
            oldest_indexed_at,
            newest_indexed_at,
        })
    }
}
