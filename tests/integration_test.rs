//! End-to-end scenarios (§8) driven through the public crate API against an
//! in-process `MockHttpClient` — no network I/O.

use std::sync::Arc;
use std::time::Duration;

use sitecrawl::core::crawler::{Crawler, CrawlerConfig};
use sitecrawl::core::http::{MockHttpClient, MockOutcome};
use sitecrawl::Page;
use url::Url;

async fn drain(crawler: &Crawler, seed: &str) -> Vec<Page> {
    let mut handle = crawler
        .crawl(Url::parse(seed).unwrap())
        .await
        .expect("crawl should start");
    let mut pages = Vec::new();
    while let Some(event) = handle.next_page().await {
        pages.push(event.expect("no fatal errors expected in this scenario"));
    }
    pages
}

fn config(overrides: impl FnOnce(CrawlerConfig) -> CrawlerConfig) -> CrawlerConfig {
    overrides(CrawlerConfig {
        robots: false,
        num_workers: 4,
        ..Default::default()
    })
}

#[tokio::test]
async fn single_page_no_links() {
    let mock = Arc::new(MockHttpClient::new());
    mock.queue(
        "http://t/",
        MockOutcome::Response(MockHttpClient::html(
            "http://t/",
            "<html><title>Hi</title></html>",
        )),
    );

    let crawler = Crawler::with_http_client(config(|c| c), mock).unwrap();
    let pages = drain(&crawler, "http://t/").await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title.as_deref(), Some("Hi"));
    assert!(pages[0].links.is_empty());
}

#[tokio::test]
async fn depth_cap_stops_before_the_third_hop() {
    let mock = Arc::new(MockHttpClient::new());
    mock.queue(
        "http://t/a",
        MockOutcome::Response(MockHttpClient::html("http://t/a", r#"<a href="/b">b</a>"#)),
    );
    mock.queue(
        "http://t/b",
        MockOutcome::Response(MockHttpClient::html("http://t/b", r#"<a href="/c">c</a>"#)),
    );

    let crawler = Crawler::with_http_client(config(|c| CrawlerConfig { max_depth: 1, ..c }), mock)
        .unwrap();
    let pages = drain(&crawler, "http://t/a").await;

    let urls: Vec<_> = pages.iter().map(|p| p.url.clone()).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&"http://t/a".to_string()));
    assert!(urls.contains(&"http://t/b".to_string()));
    assert!(!urls.contains(&"http://t/c".to_string()));
}

#[tokio::test]
async fn external_links_are_filtered_by_default() {
    let mock = Arc::new(MockHttpClient::new());
    mock.queue(
        "http://t/",
        MockOutcome::Response(MockHttpClient::html(
            "http://t/",
            r#"<a href="http://other/x">x</a>"#,
        )),
    );

    let crawler = Crawler::with_http_client(config(|c| c), mock).unwrap();
    let pages = drain(&crawler, "http://t/").await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, "http://t/");
}

#[tokio::test]
async fn disallowed_paths_are_skipped() {
    let mock = Arc::new(MockHttpClient::new());
    mock.queue(
        "http://t/robots.txt",
        MockOutcome::Response(MockHttpClient::html(
            "http://t/robots.txt",
            "Disallow: /private",
        )),
    );
    mock.queue(
        "http://t/",
        MockOutcome::Response(MockHttpClient::html(
            "http://t/",
            r#"<a href="/private/x">p</a><a href="/public/y">y</a>"#,
        )),
    );
    mock.queue(
        "http://t/public/y",
        MockOutcome::Response(MockHttpClient::html("http://t/public/y", "")),
    );

    let crawler =
        Crawler::with_http_client(config(|c| CrawlerConfig { robots: true, ..c }), mock).unwrap();
    let pages = drain(&crawler, "http://t/").await;

    let urls: Vec<_> = pages.iter().map(|p| p.url.clone()).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&"http://t/".to_string()));
    assert!(urls.contains(&"http://t/public/y".to_string()));
    assert!(!urls.contains(&"http://t/private/x".to_string()));
}

#[tokio::test]
async fn rate_limit_enforces_minimum_gap_between_fetches() {
    let mock = Arc::new(MockHttpClient::new());
    mock.queue(
        "http://t/",
        MockOutcome::Response(MockHttpClient::html("http://t/", r#"<a href="/b">b</a>"#)),
    );
    mock.queue(
        "http://t/b",
        MockOutcome::Response(MockHttpClient::html("http://t/b", "")),
    );

    let mock_ref = mock.clone();
    let crawler = Crawler::with_http_client(
        config(|c| CrawlerConfig {
            delay_override: Some(0.5),
            ..c
        }),
        mock,
    )
    .unwrap();
    let pages = drain(&crawler, "http://t/").await;
    assert_eq!(pages.len(), 2);

    let timestamps = mock_ref.requested_at.lock().unwrap();
    assert_eq!(timestamps.len(), 2);
    let gap = timestamps[1].1.duration_since(timestamps[0].1);
    assert!(
        gap >= Duration::from_millis(490),
        "expected >=0.5s gap between fetches, got {gap:?}"
    );
}

#[tokio::test]
async fn connection_error_is_retried_then_succeeds() {
    let mock = Arc::new(MockHttpClient::new());
    mock.queue("http://t/", MockOutcome::ConnectionError);
    mock.queue(
        "http://t/",
        MockOutcome::Response(MockHttpClient::html(
            "http://t/",
            "<html><title>Hi</title></html>",
        )),
    );

    let crawler = Crawler::with_http_client(config(|c| c), mock).unwrap();
    let pages = drain(&crawler, "http://t/").await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title.as_deref(), Some("Hi"));
}

#[tokio::test]
async fn invalid_worker_count_fails_fast_before_spawning_anything() {
    let mock = Arc::new(MockHttpClient::new());
    let crawler =
        Crawler::with_http_client(config(|c| CrawlerConfig { num_workers: 0, ..c }), mock)
            .unwrap();
    let result = crawler.crawl(Url::parse("http://t/").unwrap()).await;
    assert!(result.is_err());
}
