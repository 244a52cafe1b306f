//! Scraper module for fetching pages and harvesting titles
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with timeouts and charset-aware decoding
//! - Title and meta-refresh extraction
//! - Per-job orchestration and failure classification
//! - Admission-controlled dispatch of queued jobs

mod dispatcher;
mod fetcher;
mod parser;
mod processor;

pub use dispatcher::{
    admission_slots, default_admission_slots, DispatchSummary, Dispatcher, JobHandler,
    MAX_ADMISSION_SLOTS,
};
pub use fetcher::{build_http_client, FetchError, PageFetcher};
pub use parser::{
    extract, extract_meta_refresh, extract_title, is_well_formed_title, resolve_redirect,
    Extraction, RedirectUrlError,
};
pub use processor::{JobError, JobOutcome, JobProcessor};

use crate::config::Config;
use crate::queue::RedisQueue;
use crate::storage::open_storage;
use std::path::Path;
use std::sync::Arc;

/// Runs a complete worker session
///
/// This is the main entry point for draining the queue. It will:
/// 1. Open the title store
/// 2. Connect to the job queue
/// 3. Build the HTTP client and job processor
/// 4. Dispatch jobs until the queue stays empty for the idle timeout
/// 5. Wait for in-flight jobs to finish
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(DispatchSummary)` - The queue went idle and all jobs finished
/// * `Err(ScraperError)` - A fatal store, queue or client failure
pub async fn run_worker(config: &Config) -> crate::Result<DispatchSummary> {
    let store = open_storage(Path::new(&config.store.database_path))?;
    tracing::info!("Opened title store at {}", config.store.database_path);

    let queue = RedisQueue::connect(&config.queue).await?;

    let fetcher = PageFetcher::from_config(&config.scraper)?;
    let processor = JobProcessor::new(fetcher, Arc::new(store), config.scraper.max_redirects);

    let capacity = config
        .scraper
        .max_concurrent_jobs
        .unwrap_or_else(default_admission_slots);
    tracing::info!("Starting with {} admission slots", capacity);

    let dispatcher = Dispatcher::new(
        queue,
        Arc::new(processor),
        capacity,
        config.queue.idle_timeout(),
    );

    Ok(dispatcher.run().await?)
}
