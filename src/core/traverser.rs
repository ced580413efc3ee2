//! Decides which discovered links become new tasks, and maintains the SeenSet (§4.5).
//!
//! Grounded on `crul/traverse.py::PageTraverser` (`queue_url`/`follow`, ignore-suffix
//! list, disallow check order). The SeenSet's `tokio::sync::Mutex` resolves the
//! open `TODO` about thread safety the original left unaddressed (§9).

use std::collections::HashSet;

use tokio::sync::Mutex;
use url::Url;

use crate::core::disallow::DisallowMatcher;
use crate::core::model::{Page, Task};
use crate::core::queue::PendingQueue;
use crate::core::url_canon::sanitize;

const IGNORE_SUFFIXES: &[&str] = &[
    ".png", ".svg", ".pdf", ".jpg", ".gif", ".jpeg", ".mp4", ".wav",
];

/// Process-wide set of canonicalized URLs that have ever been enqueued or observed as
/// a completed page's canonical URL (§3).
#[derive(Default)]
pub struct SeenSet {
    inner: Mutex<HashSet<String>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically test-and-insert `sanitize(url)`. Returns `true` if this is the first
    /// time the sanitized form has been seen (i.e. the caller should act on it).
    async fn insert_if_new(&self, url: &str) -> bool {
        let key = sanitize(url);
        let mut set = self.inner.lock().await;
        set.insert(key)
    }
}

/// Traversal policy: depth cap, disallow list, external-link policy, and the ignored
/// asset-like suffixes (§4.5).
pub struct Traverser {
    max_depth: usize,
    disallowed: DisallowMatcher,
    allow_external: bool,
    seen: SeenSet,
}

impl Traverser {
    pub fn new(max_depth: usize, disallowed: DisallowMatcher, allow_external: bool) -> Self {
        Self {
            max_depth,
            disallowed,
            allow_external,
            seen: SeenSet::new(),
        }
    }

    /// Enqueue `url` as a Task unless its sanitized form has already been seen.
    pub async fn enqueue(
        &self,
        pending: &PendingQueue,
        url: Url,
        depth: usize,
        referrer: Option<String>,
    ) {
        if !self.seen.insert_if_new(url.as_str()).await {
            tracing::debug!(%url, ?referrer, "skipping: link already queued");
            return;
        }
        tracing::debug!(%url, ?referrer, "queueing");
        pending
            .put(Task {
                url,
                depth,
                referrer,
            })
            .await;
    }

    /// Given a completed Page, enqueue every link that survives the filters of §4.5.
    /// Assets are never followed.
    pub async fn follow(&self, pending: &PendingQueue, page: &Page) {
        if !page.canonical_url.is_empty() {
            self.seen.insert_if_new(&page.canonical_url).await;
        }

        for link in &page.links {
            let Ok(url) = Url::parse(&link.href) else {
                tracing::debug!(href = %link.href, "skipping: unparseable URL");
                continue;
            };

            if url.scheme() != "http" && url.scheme() != "https" {
                tracing::debug!(href = %link.href, referrer = %link.referrer, "skipping: only following http[s] links");
                continue;
            }
            if link.no_follow {
                tracing::debug!(href = %link.href, referrer = %link.referrer, "skipping: link marked nofollow");
                continue;
            }
            if link.external && !self.allow_external {
                tracing::debug!(href = %link.href, referrer = %link.referrer, "skipping: not following external link");
                continue;
            }
            if link.depth > self.max_depth {
                tracing::debug!(href = %link.href, referrer = %link.referrer, "skipping: beyond maximum depth");
                continue;
            }
            let path_lower = url.path().to_ascii_lowercase();
            if IGNORE_SUFFIXES.iter().any(|s| path_lower.ends_with(s)) {
                tracing::debug!(href = %link.href, referrer = %link.referrer, "skipping: ignored suffix");
                continue;
            }
            if self.disallowed.is_disallowed(url.path()) {
                tracing::debug!(href = %link.href, referrer = %link.referrer, "skipping: disallowed");
                continue;
            }

            self.enqueue(pending, url, link.depth, Some(link.referrer.clone()))
                .await;
        }
    }
}
