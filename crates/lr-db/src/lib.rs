//! Storage layer for the learn/rest timer.
//!
//! Persists daily counters using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved into the single-threaded host loop but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! Counters are plain key/value rows. The key carries the namespace, day and
//! category (`lr:2025-01-15:learnSec`); the value is the decimal seconds total stored
//! as TEXT, so rows written by older builds with non-integer text still load (they
//! read as zero).
//!
//! `updated_at` is ISO 8601 UTC text and is informational only.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use lr_core::{CounterStorage, StorageError};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use tracing::debug;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Counters table: one row per namespaced day/category key
            -- value: decimal seconds as text
            -- updated_at: ISO 8601 format (e.g., '2025-01-15T10:30:00Z')
            CREATE TABLE IF NOT EXISTS counters (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads the raw value stored under `key`.
    pub fn get_counter(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM counters WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Writes `value` under `key`, replacing any previous value.
    pub fn set_counter(&self, key: &str, value: &str) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        debug!(key, value, "writing counter");
        self.conn.execute(
            "
            INSERT INTO counters (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, now],
        )?;
        Ok(())
    }
}

impl CounterStorage for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get_counter(key)
            .map_err(|err| StorageError::Backend(Box::new(err)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_counter(key, value)
            .map_err(|err| StorageError::Backend(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lr_core::{Category, DailyTotals};

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        let mut stmt = db
            .conn
            .prepare("PRAGMA table_info(counters)")
            .expect("prepare table_info");
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info")
            .map(|row| row.expect("table_info row"))
            .collect();
        assert_eq!(columns, vec!["key", "value", "updated_at"]);
    }

    #[test]
    fn init_is_idempotent() {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.set_counter("lr:2025-01-15:learnSec", "60").unwrap();
        db.init().unwrap();
        assert_eq!(
            db.get_counter("lr:2025-01-15:learnSec").unwrap().as_deref(),
            Some("60")
        );
    }

    #[test]
    fn set_counter_upserts() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(db.get_counter("k").unwrap(), None);

        db.set_counter("k", "10").unwrap();
        db.set_counter("k", "25").unwrap();
        assert_eq!(db.get_counter("k").unwrap().as_deref(), Some("25"));

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM counters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn set_counter_records_rfc3339_timestamp() {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.set_counter("k", "1").unwrap();
        let updated_at: String = db
            .conn
            .query_row(
                "SELECT updated_at FROM counters WHERE key = ?",
                params!["k"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&updated_at).is_ok());
    }

    #[test]
    fn totals_persist_across_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("lr.db");
        let day = "2025-01-15".parse().unwrap();

        {
            let db = Database::open(&path).unwrap();
            let mut totals = DailyTotals::new(Box::new(db), "lr");
            totals.resolve(day);
            totals.add(Category::Learning, 1500);
            totals.add(Category::Rest, 300);
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_counter("lr:2025-01-15:learnSec").unwrap().as_deref(),
            Some("1500")
        );
        let mut totals = DailyTotals::new(Box::new(db), "lr");
        totals.resolve(day);
        assert_eq!(totals.read(Category::Learning), 1500);
        assert_eq!(totals.read(Category::Rest), 300);
    }

    #[test]
    fn legacy_break_rows_migrate_through_sqlite() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("lr.db");
        {
            let db = Database::open(&path).unwrap();
            db.set_counter("lr:2025-01-15:breakSec", "420").unwrap();
        }

        let db = Database::open(&path).unwrap();
        let mut totals = DailyTotals::new(Box::new(db), "lr");
        totals.resolve("2025-01-15".parse().unwrap());
        assert_eq!(totals.read(Category::Rest), 420);

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_counter("lr:2025-01-15:restSec").unwrap().as_deref(),
            Some("420")
        );
    }
}
