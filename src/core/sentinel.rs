//! Detects frontier exhaustion and shuts the pipeline down cleanly (§4.8).
//!
//! Grounded on `crul/scrape.py::worker_sentinel`: wait on `join`, then push N shutdown
//! sentinels, then push a single completion marker onto the completed channel.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::core::queue::PendingQueue;
use crate::core::worker::CrawlEvent;

/// Run the terminator to completion. Blocks (async) until the pending queue has fully
/// drained, then injects one shutdown sentinel per worker and a single `Done` marker.
pub async fn run(pending: Arc<PendingQueue>, num_workers: usize, completed: UnboundedSender<CrawlEvent>) {
    tracing::debug!("awaiting all work to complete");
    pending.join().await;

    tracing::debug!(num_workers, "sending shutdown sentinels");
    for _ in 0..num_workers {
        pending.put_shutdown().await;
    }

    let _ = completed.send(CrawlEvent::Done);
    tracing::debug!("completion marker sent");
}
