//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests to fetch page content
//! - Handing the body to the charset resolver
//! - Error classification
//!
//! Every fetch uses a fresh connection and transport-level redirects are never
//! followed; only HTML meta-refresh redirects are, by the job processor.

use crate::charset::{BodyError, CharsetResolver, DecodeError, DecodedBody, EncodingError};
use crate::config::ScraperConfig;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, StatusCode};
use thiserror::Error;
use url::Url;

/// Why a page could not be turned into text
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read body: {0}")]
    Body(#[source] BodyError),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
}

impl FetchError {
    /// Returns true if the failure came from charset resolution
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }
}

impl From<DecodeError> for FetchError {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::Body(e) => Self::Body(e),
            DecodeError::Encoding(e) => Self::Encoding(e),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Transport(error)
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use title_scraper::config::ScraperConfig;
/// use title_scraper::scraper::build_http_client;
///
/// let client = build_http_client(&ScraperConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .connect_timeout(config.connect_timeout())
        .timeout(config.total_deadline())
        .redirect(Policy::none()) // Meta-refresh is the only redirect we follow
        .pool_max_idle_per_host(0) // No keep-alive
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages and decodes them to text
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    resolver: CharsetResolver,
}

impl PageFetcher {
    pub fn new(client: Client, resolver: CharsetResolver) -> Self {
        Self { client, resolver }
    }

    /// Builds a fetcher with a client from `config` and the default detector
    pub fn from_config(config: &ScraperConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            CharsetResolver::default(),
        ))
    }

    /// Fetches `url` and returns its decoded body
    ///
    /// # Request Flow
    ///
    /// 1. Send a single GET request
    /// 2. Anything but HTTP 200 is an error (3xx included)
    /// 3. Decode the body according to its Content-Type charset
    ///
    /// # Returns
    ///
    /// * `Ok(DecodedBody)` - The page text
    /// * `Err(FetchError)` - The classified failure
    pub async fn fetch(&self, url: &Url) -> Result<DecodedBody, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let decoded = self
            .resolver
            .decode(content_type.as_deref(), response)
            .await?;

        tracing::debug!(url = %url, decision = ?decoded.decision, "Fetched page");

        Ok(decoded)
    }
}
