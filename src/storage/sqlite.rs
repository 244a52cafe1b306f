//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the TitleStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, TitleStore};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite title store
pub struct SqliteTitleStore {
    conn: Mutex<Connection>,
}

impl SqliteTitleStore {
    /// Opens (or creates) the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteTitleStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Concurrent jobs write through one connection; WAL keeps readers unblocked
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Registers a URL awaiting a title
    ///
    /// This is the ingestion side of the store. Existing records are left alone.
    pub fn insert_page(&self, url: &str) -> StorageResult<()> {
        self.lock()?.execute(
            "INSERT OR IGNORE INTO categorized_pages (url) VALUES (?1)",
            params![url],
        )?;
        Ok(())
    }

    /// Gets the stored title for a URL
    ///
    /// Returns `None` both for unknown URLs and for records without a title yet.
    pub fn get_title(&self, url: &str) -> StorageResult<Option<String>> {
        let title: Option<Option<String>> = self
            .lock()?
            .query_row(
                "SELECT web_title FROM categorized_pages WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(title.flatten())
    }

    /// Counts records that have a title
    pub fn count_titled(&self) -> StorageResult<u64> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM categorized_pages WHERE web_title IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl TitleStore for SqliteTitleStore {
    fn update_title(&self, url: &str, title: &str) -> StorageResult<usize> {
        let updated = self.lock()?.execute(
            "UPDATE categorized_pages SET web_title = ?1 WHERE url = ?2",
            params![title, url],
        )?;
        Ok(updated)
    }
}
