//! Shared fixtures for the integration tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use title_scraper::charset::{CharsetDetector, CharsetResolver};
use title_scraper::config::ScraperConfig;
use title_scraper::queue::{JobQueue, QueueError};
use title_scraper::scraper::{build_http_client, JobProcessor, PageFetcher};
use title_scraper::storage::{SqliteTitleStore, StorageError, StorageResult, TitleStore};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Creates a scraper configuration suited to a local mock server
pub fn test_scraper_config() -> ScraperConfig {
    ScraperConfig {
        user_agent: "TestScraper/1.0".to_string(),
        connect_timeout: 2,
        request_timeout: 2,
        max_redirects: 5,
        max_concurrent_jobs: None,
    }
}

/// Creates an in-memory store with the given URLs already ingested
pub fn seeded_store(urls: &[String]) -> Arc<SqliteTitleStore> {
    let store = SqliteTitleStore::open_in_memory().expect("Failed to open store");
    for url in urls {
        store.insert_page(url).expect("Failed to seed store");
    }
    Arc::new(store)
}

/// Creates a processor using the real charset detector
pub fn processor_with_store(store: Arc<dyn TitleStore>) -> JobProcessor {
    processor_with_config(store, &test_scraper_config())
}

/// Creates a processor from an explicit scraper configuration
pub fn processor_with_config(store: Arc<dyn TitleStore>, config: &ScraperConfig) -> JobProcessor {
    let fetcher = PageFetcher::from_config(config).expect("Failed to build fetcher");
    JobProcessor::new(fetcher, store, config.max_redirects)
}

/// Creates a processor with a custom detector and redirect limit
pub fn processor_with(
    store: Arc<dyn TitleStore>,
    detector: Arc<dyn CharsetDetector>,
    max_redirects: u32,
) -> JobProcessor {
    let client = build_http_client(&test_scraper_config()).expect("Failed to build client");
    let fetcher = PageFetcher::new(client, CharsetResolver::new(detector));
    JobProcessor::new(fetcher, store, max_redirects)
}

/// Detector that never produces a guess
pub struct NoGuessDetector;

impl CharsetDetector for NoGuessDetector {
    fn detect(&self, _body: &[u8]) -> Option<String> {
        None
    }
}

/// Detector that counts calls and guesses a fixed label
pub struct CountingDetector {
    pub guess: &'static str,
    pub calls: AtomicUsize,
}

impl CountingDetector {
    pub fn new(guess: &'static str) -> Arc<Self> {
        Arc::new(Self {
            guess,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CharsetDetector for CountingDetector {
    fn detect(&self, _body: &[u8]) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(self.guess.to_string())
    }
}

/// Store whose writes always fail
pub struct BrokenStore;

impl TitleStore for BrokenStore {
    fn update_title(&self, _url: &str, _title: &str) -> StorageResult<usize> {
        Err(StorageError::Poisoned)
    }
}

/// Store that records every update it receives
#[derive(Default)]
pub struct RecordingStore {
    pub updates: Mutex<Vec<(String, String)>>,
}

impl TitleStore for RecordingStore {
    fn update_title(&self, url: &str, title: &str) -> StorageResult<usize> {
        self.updates
            .lock()
            .unwrap()
            .push((url.to_string(), title.to_string()));
        Ok(1)
    }
}

/// Queue that replays a fixed script of pop results, then reports idle
pub struct ScriptedQueue {
    script: VecDeque<Result<Option<String>, QueueError>>,
    pub pops: Arc<AtomicUsize>,
}

impl ScriptedQueue {
    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(urls.into_iter().map(|url| Ok(Some(url.into()))))
    }

    pub fn with_script<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<Option<String>, QueueError>>,
    {
        Self {
            script: script.into_iter().collect(),
            pops: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl JobQueue for ScriptedQueue {
    async fn pop(&mut self, _timeout: Duration) -> Result<Option<String>, QueueError> {
        self.pops.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

/// Builds a queue error as the Redis client would report it
pub fn connection_reset() -> QueueError {
    QueueError::Redis(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "connection reset",
    )))
}

/// One captured log event
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Layer that keeps every event it sees
#[derive(Clone, Default)]
pub struct CapturedEvents {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedEvents {
    pub fn all(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events carrying a `category` field, in emission order
    pub fn categorized(&self) -> Vec<CapturedEvent> {
        self.all()
            .into_iter()
            .filter(|event| event.fields.contains_key("category"))
            .collect()
    }
}

#[derive(Default)]
struct FieldRecorder(HashMap<String, String>);

impl Visit for FieldRecorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: recorder.0,
        });
    }
}
