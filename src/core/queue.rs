//! Unbounded FIFO task queue gated by a single shared token bucket, plus the
//! outstanding-task bookkeeping the Sentinel waits on (§4.6).
//!
//! Grounded on `crul/scrape.py::SlowQueue`/`sloq.SlowQueue`: a token bucket with
//! `max_slam = 1` that lets a designated sentinel value bypass the gate entirely, and
//! `Queue`'s `put`/`task_done`/`join` counter semantics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex, Notify};
use tokio::time::sleep;

use crate::core::model::Task;

/// An item taken off the pending queue: either real work, or the shutdown signal a
/// worker uses to know it should exit (§4.7 step 2, §4.8 step 2).
pub enum WorkItem {
    Task(Task),
    Shutdown,
}

/// Rate-limiting gate: releases at most one token per `release_tick`, with a maximum
/// outstanding of one (`max_slam = 1`) — modeled directly as "the next acquire may not
/// start before `next_slot`", which is equivalent to a bucket that holds a single token
/// and refills after `release_tick`.
struct RateGate {
    release_tick: Duration,
    next_slot: Mutex<Instant>,
}

impl RateGate {
    fn new(release_tick: Duration) -> Self {
        Self {
            release_tick,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    async fn acquire(&self) {
        let wait = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let start = if *next > now { *next } else { now };
            *next = start + self.release_tick;
            start.saturating_duration_since(now)
        };
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }
}

/// The rate-limited pending-task queue of §4.6. When `delay == 0` it degenerates to a
/// plain FIFO (no gate is ever consulted).
pub struct PendingQueue {
    sender: mpsc::UnboundedSender<WorkItem>,
    receiver: Mutex<mpsc::UnboundedReceiver<WorkItem>>,
    gate: Option<RateGate>,
    outstanding: AtomicUsize,
    notify: Notify,
}

impl PendingQueue {
    pub fn new(delay_seconds: f64) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let gate = if delay_seconds > 0.0 {
            Some(RateGate::new(Duration::from_secs_f64(delay_seconds)))
        } else {
            None
        };
        Self {
            sender,
            receiver: Mutex::new(receiver),
            gate,
            outstanding: AtomicUsize::new(0),
            notify: Notify::new(),
        }
    }

    /// Enqueue a Task. Increments the outstanding-tasks counter.
    pub async fn put(&self, task: Task) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        // An unbounded channel's send only fails if every receiver has been dropped,
        // which cannot happen while `self` (and its receiver) are alive.
        let _ = self.sender.send(WorkItem::Task(task));
    }

    /// Enqueue a single shutdown sentinel.
    pub async fn put_shutdown(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let _ = self.sender.send(WorkItem::Shutdown);
    }

    /// Dequeue the next item. If it is a Task, the rate gate is consulted first (unless
    /// `delay == 0`); if it is the shutdown sentinel, the gate is bypassed entirely so
    /// shutdown is never throttled by politeness delay.
    pub async fn get(&self) -> WorkItem {
        let item = {
            let mut rx = self.receiver.lock().await;
            rx.recv()
                .await
                .expect("pending queue outlives its own sender")
        };
        if let WorkItem::Task(_) = &item {
            if let Some(gate) = &self.gate {
                gate.acquire().await;
            }
        }
        item
    }

    /// Mark one previously-`put` item as finished, decrementing the outstanding count.
    pub async fn task_done(&self) {
        let prev = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(prev >= 1, "task_done called more times than put");
        if prev == 1 {
            self.notify.notify_one();
        }
    }

    /// Block until the outstanding-tasks counter reaches zero.
    pub async fn join(&self) {
        loop {
            let notified = self.notify.notified();
            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Synchronous snapshot of the outstanding count, handy for tests.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}
