//! Storage module for persisting extracted titles
//!
//! This module handles all database operations for the scraper:
//! - SQLite database initialization and schema management
//! - The keyed title update performed at the end of every successful job
//! - Small ingestion and inspection helpers

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteTitleStore;
pub use traits::{StorageError, StorageResult, TitleStore};

use std::path::Path;

/// Opens the title store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteTitleStore)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteTitleStore> {
    SqliteTitleStore::new(path)
}
