//! Storage traits and error types
//!
//! This module defines the trait interface for title store backends and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store connection poisoned by a panicked writer")]
    Poisoned,

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for title store implementations
///
/// Records are keyed by URL and are expected to exist already; the scraper only
/// fills in their title. Implementations must be shareable between jobs.
pub trait TitleStore: Send + Sync {
    /// Sets the title of the record keyed by `url`
    ///
    /// # Arguments
    ///
    /// * `url` - The record key
    /// * `title` - The extracted page title
    ///
    /// # Returns
    ///
    /// The number of records updated. Zero means no record has that URL,
    /// which is not an error.
    fn update_title(&self, url: &str, title: &str) -> StorageResult<usize>;
}
