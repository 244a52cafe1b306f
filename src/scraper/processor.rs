//! Job processor - one URL from fetch to stored title
//!
//! A job moves through `Fetching → {Persisting | RedirectPending | Failed}`,
//! with `RedirectPending` looping back to `Fetching` for the meta-refresh
//! target. Redirect chains are followed inside a single call, so a job holds
//! one admission slot no matter how long its chain is. Chains are bounded by
//! a hop limit and a per-job visited set.

use crate::scraper::fetcher::{FetchError, PageFetcher};
use crate::scraper::parser::{extract, is_well_formed_title, Extraction};
use crate::storage::{StorageError, TitleStore};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// A job that ended with a stored title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// The queued URL, which is also the store key
    pub url: String,

    /// The URL the title was found on
    pub final_url: String,

    /// The stored title
    pub title: String,

    /// Number of meta-refresh hops followed
    pub redirects: u32,

    /// Records updated by the store (0 if the URL was never ingested)
    pub updated: usize,
}

/// Classified per-job failures
///
/// None of these stop the worker; they are logged with their category.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("fetch failed for {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("empty body at {url}")]
    EmptyBody { url: String },

    #[error("title at {url} is not well-formed text")]
    InvalidTitle { url: String, title: String },

    #[error("title not found at {url}")]
    TitleNotFound { url: String },

    #[error("redirect loop at {url} after {hops} hops")]
    RedirectLoop { url: String, hops: u32 },

    #[error("failed to store title for {url}: {source}")]
    Storage { url: String, source: StorageError },
}

impl JobError {
    /// Log category for this failure
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "URL_ERROR",
            Self::Fetch { source, .. } if source.is_encoding() => "ENCODING_ERROR",
            Self::Fetch { .. } => "HTTP_ERROR",
            Self::InvalidTitle { .. } => "ENCODING_ERROR",
            Self::EmptyBody { .. } | Self::TitleNotFound { .. } => "TITLE_ERROR",
            Self::RedirectLoop { .. } => "REDIRECT_ERROR",
            Self::Storage { .. } => "SQL_ERROR",
        }
    }
}

/// Runs jobs end to end
pub struct JobProcessor {
    fetcher: PageFetcher,
    store: Arc<dyn TitleStore>,
    max_redirects: u32,
}

impl JobProcessor {
    /// Creates a processor
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetches and decodes pages
    /// * `store` - Receives extracted titles
    /// * `max_redirects` - Meta-refresh hops allowed per job
    pub fn new(fetcher: PageFetcher, store: Arc<dyn TitleStore>, max_redirects: u32) -> Self {
        Self {
            fetcher,
            store,
            max_redirects,
        }
    }

    /// Processes one job
    ///
    /// The title is stored under `job_url` even when it was found after
    /// following redirects, since that is the key the record was ingested with.
    pub async fn process(&self, job_url: &str) -> Result<JobOutcome, JobError> {
        let mut current = Url::parse(job_url).map_err(|source| JobError::InvalidUrl {
            url: job_url.to_string(),
            source,
        })?;
        let mut visited = HashSet::new();
        let mut hops = 0;

        loop {
            visited.insert(current.to_string());

            let decoded = self
                .fetcher
                .fetch(&current)
                .await
                .map_err(|source| JobError::Fetch {
                    url: current.to_string(),
                    source,
                })?;

            if decoded.text.trim().is_empty() {
                return Err(JobError::EmptyBody {
                    url: current.to_string(),
                });
            }

            match extract(&decoded.text, &current) {
                Ok(Extraction::Title(title)) => {
                    if !is_well_formed_title(&title) {
                        return Err(JobError::InvalidTitle {
                            url: current.to_string(),
                            title,
                        });
                    }

                    let updated = self.persist(job_url, &title).await?;
                    return Ok(JobOutcome {
                        url: job_url.to_string(),
                        final_url: current.to_string(),
                        title,
                        redirects: hops,
                        updated,
                    });
                }
                Ok(Extraction::Redirect(target)) => {
                    if hops >= self.max_redirects || visited.contains(target.as_str()) {
                        return Err(JobError::RedirectLoop {
                            url: target.to_string(),
                            hops,
                        });
                    }

                    tracing::debug!(from = %current, to = %target, "Following meta refresh");
                    hops += 1;
                    current = target;
                }
                Ok(Extraction::Neither) => {
                    return Err(JobError::TitleNotFound {
                        url: current.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(category = "URL_ERROR", url = %current, "{}", e);
                    return Err(JobError::TitleNotFound {
                        url: current.to_string(),
                    });
                }
            }
        }
    }

    /// Processes one job and logs how it ended
    pub async fn run(&self, job_url: &str) {
        match self.process(job_url).await {
            Ok(outcome) => {
                tracing::info!(
                    url = %outcome.url,
                    redirects = outcome.redirects,
                    updated = outcome.updated,
                    "Stored title: {}",
                    outcome.title
                );
            }
            Err(e @ JobError::Storage { .. }) => {
                tracing::error!(category = e.category(), url = %job_url, "{}", e);
            }
            Err(e) => {
                tracing::warn!(category = e.category(), url = %job_url, "{}", e);
            }
        }
    }

    /// Writes a title on the blocking pool
    async fn persist(&self, url: &str, title: &str) -> Result<usize, JobError> {
        let store = Arc::clone(&self.store);
        let (key, value) = (url.to_string(), title.to_string());

        let result = tokio::task::spawn_blocking(move || store.update_title(&key, &value))
            .await
            .map_err(StorageError::from)
            .and_then(|updated| updated);

        match result {
            Ok(0) => {
                tracing::debug!(url = %url, "No stored record for URL; nothing updated");
                Ok(0)
            }
            Ok(updated) => Ok(updated),
            Err(source) => Err(JobError::Storage {
                url: url.to_string(),
                source,
            }),
        }
    }
}
