//! Public façade wiring the queue, traverser, worker pool, and sentinel together
//! (§4.10).
//!
//! Follows the `Crawler`/`CrawlerBuilder` builder pattern, generalized from a single
//! recursive `crawl()` method to the queue/worker/sentinel architecture of §2.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use url::Url;

use crate::core::disallow::DisallowMatcher;
use crate::core::http::{HttpClient, ReqwestHttpClient};
use crate::core::model::Page;
use crate::core::queue::PendingQueue;
use crate::core::robots::RobotsPolicy;
use crate::core::sentinel;
use crate::core::traverser::Traverser;
use crate::core::worker::{self, CrawlEvent};
use crate::error::CrawlError;

const USER_AGENT: &str = "sitecrawl/1.0 (+https://github.com/example/sitecrawl)";
const DEFAULT_MAX_DEPTH: usize = 100;
const DEFAULT_NUM_WORKERS: usize = 4;

/// Bounds and behaviors for a crawl.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub user_agent: String,
    pub max_depth: usize,
    pub num_workers: usize,
    pub delay_override: Option<f64>,
    pub robots: bool,
    pub disallow: Vec<String>,
    pub allow_external: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            num_workers: DEFAULT_NUM_WORKERS,
            delay_override: None,
            robots: true,
            disallow: Vec::new(),
            allow_external: false,
        }
    }
}

/// Builder pattern for `Crawler`.
#[derive(Debug, Clone, Default)]
pub struct CrawlerBuilder {
    config: CrawlerConfig,
}

impl CrawlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.config.num_workers = n;
        self
    }

    pub fn with_delay_seconds(mut self, seconds: f64) -> Self {
        self.config.delay_override = Some(seconds);
        self
    }

    pub fn with_robots(mut self, robots: bool) -> Self {
        self.config.robots = robots;
        self
    }

    pub fn with_disallow(mut self, paths: Vec<String>) -> Self {
        self.config.disallow = paths;
        self
    }

    pub fn with_user_agent<S: AsRef<str>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.as_ref().to_string();
        self
    }

    pub fn with_allow_external(mut self, allow_external: bool) -> Self {
        self.config.allow_external = allow_external;
        self
    }

    pub fn build(self) -> Result<Crawler, CrawlError> {
        Crawler::from_config(self.config)
    }
}

/// The public crawl engine: validates configuration, fetches and interprets
/// `robots.txt`, and wires the queue/traverser/worker-pool/sentinel pipeline of §2.
pub struct Crawler {
    config: CrawlerConfig,
    http: Arc<dyn HttpClient>,
}

impl Crawler {
    fn from_config(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let http = ReqwestHttpClient::new(&config.user_agent).map_err(|e| {
            CrawlError::InvalidConfig(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            config,
            http: Arc::new(http),
        })
    }

    pub fn new() -> Result<Self, CrawlError> {
        CrawlerBuilder::new().build()
    }

    /// Build a crawler around a caller-supplied `HttpClient` (used by tests to drive
    /// the whole pipeline against a `MockHttpClient` with no network I/O).
    pub fn with_http_client(config: CrawlerConfig, http: Arc<dyn HttpClient>) -> Result<Self, CrawlError> {
        Ok(Self { config, http })
    }

    /// Start a crawl from `seed`. Fail-fast validates the configuration, fetches and
    /// interprets `robots.txt` unless `config.robots == false`, then spawns the worker
    /// pool and sentinel and returns a handle streaming Pages (and any fatal errors) as
    /// they complete.
    pub async fn crawl(&self, seed: Url) -> Result<CrawlHandle, CrawlError> {
        if self.config.num_workers < 1 {
            return Err(CrawlError::InvalidConfig(
                "num_workers must be >= 1".to_string(),
            ));
        }

        let (robots_disallow, robots_delay) = if self.config.robots {
            self.fetch_robots(&seed).await
        } else {
            (Vec::new(), 0.0)
        };

        let mut disallow = robots_disallow;
        disallow.extend(self.config.disallow.iter().cloned());
        let delay = self.config.delay_override.unwrap_or(robots_delay);

        tracing::info!(%seed, delay, num_workers = self.config.num_workers, "starting crawl");

        let pending = Arc::new(PendingQueue::new(delay));
        let traverser = Arc::new(Traverser::new(
            self.config.max_depth,
            DisallowMatcher::new(disallow),
            self.config.allow_external,
        ));
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();

        traverser
            .enqueue(&pending, seed, 0, None)
            .await;

        for id in 0..self.config.num_workers {
            let http = self.http.clone();
            let pending = pending.clone();
            let traverser = traverser.clone();
            let completed_tx = completed_tx.clone();
            tokio::spawn(async move {
                worker::run(id, http, pending, traverser, completed_tx).await
            });
        }

        let sentinel_pending = pending.clone();
        let sentinel_tx = completed_tx.clone();
        let num_workers = self.config.num_workers;
        tokio::spawn(async move {
            sentinel::run(sentinel_pending, num_workers, sentinel_tx).await
        });

        Ok(CrawlHandle {
            receiver: completed_rx,
            done: false,
        })
    }

    async fn fetch_robots(&self, seed: &Url) -> (Vec<String>, f64) {
        let robots_url = robots_url_for(seed);

        match self.http.get(&robots_url, Default::default()).await {
            Ok(response) if response.status_code < 400 => {
                let policy = RobotsPolicy::parse(&response.body, &self.config.user_agent);
                (policy.disallow, policy.crawl_delay)
            }
            Ok(response) => {
                tracing::debug!(status = response.status_code, "robots.txt fetch non-success");
                (Vec::new(), 0.0)
            }
            Err(err) => {
                tracing::debug!(error = %err, "unable to collect robots.txt");
                (Vec::new(), 0.0)
            }
        }
    }
}

fn robots_url_for(seed: &Url) -> Url {
    let mut url = seed.clone();
    url.set_path("/robots.txt");
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// A lazy stream of completed pages (and any fatal in-band errors), terminated when the
/// Sentinel's completion marker is observed (§4.8, §6).
pub struct CrawlHandle {
    receiver: mpsc::UnboundedReceiver<CrawlEvent>,
    done: bool,
}

impl CrawlHandle {
    /// Pull the next item, or `None` once the completion marker has been observed.
    pub async fn next_page(&mut self) -> Option<Result<Page, CrawlError>> {
        if self.done {
            return None;
        }
        match self.receiver.recv().await {
            Some(CrawlEvent::Page(page)) => Some(Ok(page)),
            Some(CrawlEvent::Error(err)) => Some(Err(err)),
            Some(CrawlEvent::Done) | None => {
                self.done = true;
                None
            }
        }
    }

    /// Drain and discard all pending work and close the stream, without waiting for
    /// in-flight HTTP requests to finish (§5 "Cancellation").
    pub fn cancel(&mut self) {
        self.receiver.close();
        self.done = true;
    }
}

impl Stream for CrawlHandle {
    type Item = Result<Page, CrawlError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(CrawlEvent::Page(page))) => Poll::Ready(Some(Ok(page))),
            Poll::Ready(Some(CrawlEvent::Error(err))) => Poll::Ready(Some(Err(err))),
            Poll::Ready(Some(CrawlEvent::Done)) | Poll::Ready(None) => {
                self.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{MockHttpClient, MockOutcome};
    use futures::StreamExt;

    // The full queue/worker/sentinel pipeline is exercised end-to-end by
    // tests/integration_test.rs; these cover the façade's own wiring decisions.

    #[tokio::test]
    async fn zero_workers_is_rejected_fail_fast_at_crawl_time() {
        let config = CrawlerConfig {
            num_workers: 0,
            ..Default::default()
        };
        let mock = Arc::new(MockHttpClient::new());
        let crawler = Crawler::with_http_client(config, mock).unwrap();
        let result = crawler.crawl(Url::parse("http://t/").unwrap()).await;
        assert!(matches!(result, Err(CrawlError::InvalidConfig(_))));
    }

    #[test]
    fn robots_url_is_derived_from_the_seed_origin() {
        let seed = Url::parse("http://t/a/b?x=1#y").unwrap();
        assert_eq!(robots_url_for(&seed).as_str(), "http://t/robots.txt");
    }

    #[tokio::test]
    async fn stream_impl_terminates_after_the_seed_page() {
        let mock = Arc::new(MockHttpClient::new());
        mock.queue(
            "http://t/",
            MockOutcome::Response(MockHttpClient::html(
                "http://t/",
                "<html><title>Hi</title></html>",
            )),
        );
        let config = CrawlerConfig {
            robots: false,
            num_workers: 1,
            ..Default::default()
        };
        let crawler = Crawler::with_http_client(config, mock).unwrap();
        let handle = crawler.crawl(Url::parse("http://t/").unwrap()).await.unwrap();
        let pages: Vec<_> = handle.filter_map(|r| async { r.ok() }).collect().await;
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn cancel_closes_the_stream_immediately() {
        let mock = Arc::new(MockHttpClient::new());
        mock.queue(
            "http://t/",
            MockOutcome::Response(MockHttpClient::html(
                "http://t/",
                r#"<a href="/a">a</a><a href="/b">b</a>"#,
            )),
        );
        let config = CrawlerConfig {
            robots: false,
            num_workers: 1,
            ..Default::default()
        };
        let crawler = Crawler::with_http_client(config, mock).unwrap();
        let mut handle = crawler.crawl(Url::parse("http://t/").unwrap()).await.unwrap();
        handle.cancel();
        assert!(handle.next_page().await.is_none());
    }
}
