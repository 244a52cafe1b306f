//! Title Scraper: a queue-driven page title harvester
//!
//! This crate drains a queue of URLs, fetches each page, resolves its character
//! encoding, extracts the page title (following HTML meta-refresh redirects when
//! a page has none) and writes the title back to a keyed store. The number of
//! jobs in flight is bounded by a pool of admission slots.

pub mod charset;
pub mod config;
pub mod queue;
pub mod scraper;
pub mod storage;

use thiserror::Error;

/// Main error type for fatal, process-level failures
///
/// Per-job failures never reach this type; they are classified and logged by
/// the job processor (see [`scraper::JobError`]).
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Queue error: {0}")]
    Queue(#[from] queue::QueueError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Title Scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use scraper::{admission_slots, Dispatcher, JobError, JobOutcome, JobProcessor};
