use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Title Scraper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub queue: QueueConfig,
    pub store: StoreConfig,
    pub scraper: ScraperConfig,
}

/// Job queue connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Redis host, optionally with port (e.g., "localhost:6379")
    pub host: String,

    /// Redis password (empty for none)
    pub password: String,

    /// Redis logical database index
    pub db: i64,

    /// Name of the list holding pending URLs
    pub key: String,

    /// Seconds a pop may block with no job before the worker shuts down
    #[serde(rename = "idle-timeout")]
    pub idle_timeout: u64,
}

impl QueueConfig {
    /// Builds a `redis://` connection URL from the host, password and db index
    pub fn connection_url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}/{}", self.host, self.db)
        } else {
            format!("redis://:{}@{}/{}", self.password, self.host, self.db)
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            host: "localhost:6379".to_string(),
            password: String::new(),
            db: 0,
            key: "urljobs".to_string(),
            idle_timeout: 10,
        }
    }
}

/// Title store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "titlescraper.db".to_string(),
        }
    }
}

/// Fetching and job processing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Seconds allowed to establish a connection
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,

    /// Seconds allowed for the whole request once started
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Maximum number of meta-refresh hops followed for one job
    #[serde(rename = "max-redirects")]
    pub max_redirects: u32,

    /// Overrides the number of admission slots derived from the CPU count
    #[serde(rename = "max-concurrent-jobs")]
    pub max_concurrent_jobs: Option<usize>,
}

impl ScraperConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Deadline for a whole request, connect phase included
    ///
    /// Whatever part of the connect budget is used, the exchange after it
    /// still gets the full request timeout.
    pub fn total_deadline(&self) -> Duration {
        self.connect_timeout() + self.request_timeout()
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: "titleScraper/1.0".to_string(),
            connect_timeout: 30,
            request_timeout: 10,
            max_redirects: 5,
            max_concurrent_jobs: None,
        }
    }
}
