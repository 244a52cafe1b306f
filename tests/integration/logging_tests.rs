//! Log lines emitted by finished jobs

use crate::common::*;
use std::sync::Arc;
use title_scraper::JobProcessor;
use tracing::instrument::WithSubscriber;
use tracing::Level;
use tracing_subscriber::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runs one job and returns everything it logged
async fn run_captured(processor: &JobProcessor, url: &str) -> CapturedEvents {
    let captured = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());

    processor.run(url).with_subscriber(subscriber).await;

    captured
}

async fn serve(mock_server: &MockServer, route: &str, body: Vec<u8>, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, content_type))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_undetectable_charset_logs_one_encoding_error() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/", mock_server.uri());
    serve(
        &mock_server,
        "/",
        vec![0x3c, 0x74, 0xfe, 0xff, 0x00],
        "text/html; charset=x-mystery",
    )
    .await;

    let store = seeded_store(&[url.clone()]);
    let processor = processor_with(store.clone(), Arc::new(NoGuessDetector), 5);

    let events = run_captured(&processor, &url).await.categorized();

    assert_eq!(events.len(), 1, "{:?}", events);
    assert_eq!(events[0].level, Level::WARN);
    assert_eq!(events[0].field("category"), Some("ENCODING_ERROR"));
    assert_eq!(events[0].field("url"), Some(url.as_str()));
    assert_eq!(store.get_title(&url).unwrap(), None);
}

#[tokio::test]
async fn test_malformed_redirect_logs_url_then_title_error() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/", mock_server.uri());
    serve(
        &mock_server,
        "/",
        br#"<meta http-equiv="refresh" content="0; url=http://[::1">"#.to_vec(),
        "text/html; charset=utf-8",
    )
    .await;

    let processor = processor_with_store(Arc::new(RecordingStore::default()));

    let events = run_captured(&processor, &url).await.categorized();

    let categories: Vec<_> = events.iter().filter_map(|e| e.field("category")).collect();
    assert_eq!(categories, vec!["URL_ERROR", "TITLE_ERROR"]);
    assert!(events.iter().all(|e| e.field("url") == Some(url.as_str())));
}

#[tokio::test]
async fn test_store_failure_logs_sql_error_at_error_level() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/", mock_server.uri());
    serve(
        &mock_server,
        "/",
        b"<title>Unsaved</title>".to_vec(),
        "text/html; charset=utf-8",
    )
    .await;

    let processor = processor_with_store(Arc::new(BrokenStore));

    let events = run_captured(&processor, &url).await.categorized();

    assert_eq!(events.len(), 1, "{:?}", events);
    assert_eq!(events[0].level, Level::ERROR);
    assert_eq!(events[0].field("category"), Some("SQL_ERROR"));
}

#[tokio::test]
async fn test_success_logs_no_failure() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/", mock_server.uri());
    serve(
        &mock_server,
        "/",
        b"<title>Fine</title>".to_vec(),
        "text/html; charset=utf-8",
    )
    .await;

    let store = seeded_store(&[url.clone()]);
    let processor = processor_with_store(store.clone());

    let captured = run_captured(&processor, &url).await;

    assert!(captured.categorized().is_empty());
    let stored: Vec<_> = captured
        .all()
        .into_iter()
        .filter(|e| e.level == Level::INFO)
        .collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].field("url"), Some(url.as_str()));
    assert_eq!(store.get_title(&url).unwrap(), Some("Fine".to_string()));
}
