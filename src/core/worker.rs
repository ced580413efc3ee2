//! One fetch worker's loop: dequeue, fetch-with-one-retry, parse, follow, emit (§4.7).
//!
//! Grounded on `crul/scrape.py::worker`/`worker_request`.

use std::sync::Arc;

use url::Url;

use crate::core::http::{header_map, HttpClient};
use crate::core::model::Page;
use crate::core::parser;
use crate::core::queue::{PendingQueue, WorkItem};
use crate::core::traverser::Traverser;
use crate::error::{CrawlError, TransportError};

/// An item handed to the caller on the completed channel: a successfully parsed page,
/// or a fatal error that ended the worker which produced it.
pub enum CrawlEvent {
    Page(Page),
    Error(CrawlError),
    Done,
}

/// Run one worker to completion. Returns when it dequeues the shutdown sentinel, or
/// when a fatal (non-retryable, or retry-exhausted) error occurs.
pub async fn run(
    worker_id: usize,
    http: Arc<dyn HttpClient>,
    pending: Arc<PendingQueue>,
    traverser: Arc<Traverser>,
    completed: tokio::sync::mpsc::UnboundedSender<CrawlEvent>,
) {
    tracing::debug!(worker_id, "worker started");
    loop {
        let item = pending.get().await;
        let task = match item {
            WorkItem::Shutdown => {
                pending.task_done().await;
                break;
            }
            WorkItem::Task(task) => task,
        };

        let url = task.url.clone();
        match fetch_with_retry(&*http, &url, task.referrer.as_deref()).await {
            Ok(response) => {
                let page = parser::parse(&response, task.depth);
                traverser.follow(&pending, &page).await;
                if completed.send(CrawlEvent::Page(page)).is_err() {
                    pending.task_done().await;
                    break;
                }
            }
            Err(err) => {
                tracing::error!(worker_id, %url, error = %err, "worker errored whilst processing task");
                let _ = completed.send(CrawlEvent::Error(err));
                pending.task_done().await;
                break;
            }
        }
        pending.task_done().await;
    }
    tracing::debug!(worker_id, "worker stopped");
}

/// Issue the GET, retrying once on a connection error (total two attempts). Any other
/// error, or a retry-exhausted connection error, is returned as a fatal `CrawlError`.
async fn fetch_with_retry(
    http: &dyn HttpClient,
    url: &Url,
    referrer: Option<&str>,
) -> Result<crate::core::http::FetchedResponse, CrawlError> {
    let headers = header_map(referrer);
    match http.get(url, headers.clone()).await {
        Ok(response) => Ok(response),
        Err(TransportError::Connection(msg)) => {
            tracing::debug!(%url, error = %msg, "connection error encountered, retrying once");
            http.get(url, headers)
                .await
                .map_err(|second_err| second_err.into_crawl_error(url.as_str()))
        }
        Err(other) => Err(other.into_crawl_error(url.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::disallow::DisallowMatcher;
    use crate::core::http::{MockHttpClient, MockOutcome};
    use crate::core::queue::PendingQueue;
    use crate::core::traverser::Traverser;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn connection_error_is_retried_once_then_succeeds() {
        let mock = Arc::new(MockHttpClient::new());
        mock.queue("http://t/", MockOutcome::ConnectionError);
        mock.queue("http://t/", MockOutcome::Response(MockHttpClient::html(
            "http://t/",
            "<html><title>Hi</title></html>",
        )));

        let pending = Arc::new(PendingQueue::new(0.0));
        let traverser = Arc::new(Traverser::new(10, DisallowMatcher::default(), false));
        pending
            .put(crate::core::model::Task::seed(
                url::Url::parse("http://t/").unwrap(),
            ))
            .await;
        pending.put_shutdown().await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        run(0, mock.clone(), pending, traverser, tx).await;

        let mut pages = 0;
        let mut errors = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                CrawlEvent::Page(_) => pages += 1,
                CrawlEvent::Error(_) => errors += 1,
                CrawlEvent::Done => {}
            }
        }
        assert_eq!(pages, 1);
        assert_eq!(errors, 0);
        assert_eq!(mock.requested_at.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn two_connection_errors_surface_as_fatal_error() {
        let mock = Arc::new(MockHttpClient::new());
        mock.queue("http://t/", MockOutcome::ConnectionError);
        mock.queue("http://t/", MockOutcome::ConnectionError);

        let pending = Arc::new(PendingQueue::new(0.0));
        let traverser = Arc::new(Traverser::new(10, DisallowMatcher::default(), false));
        pending
            .put(crate::core::model::Task::seed(
                url::Url::parse("http://t/").unwrap(),
            ))
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        run(0, mock, pending, traverser, tx).await;

        let event = rx.try_recv().expect("expected an event");
        assert!(matches!(event, CrawlEvent::Error(_)));
    }
}
