//! Configuration module for Title Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so a missing or broken file never stops the worker.
//!
//! # Example
//!
//! ```no_run
//! use title_scraper::config::load_config_or_default;
//! use std::path::Path;
//!
//! let config = load_config_or_default(Path::new("settings.toml"));
//! println!("Queue idle timeout: {}s", config.queue.idle_timeout);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, QueueConfig, ScraperConfig, StoreConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_or_default};
