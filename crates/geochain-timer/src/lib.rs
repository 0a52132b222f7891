//! Delay queue for Geochain room actors.
//!
//! A room schedules its own future work (a bot taking its turn a second
//! or two from now) by pushing an item into a [`DelayQueue`] it owns.
//! The actor then waits on [`DelayQueue::next_due`] alongside its
//! command channel, so delayed work is ordered with player commands
//! instead of racing them from a detached task.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         cmd = cmd_rx.recv() => { /* handle commands */ }
//!         item = timers.next_due() => { /* handle the fired item */ }
//!     }
//! }
//! ```
//!
//! [`next_due`](DelayQueue::next_due) pends forever on an empty queue,
//! which leaves `select!` free to serve the other branch. It is cancel
//! safe: an item is only removed once its deadline has passed and the
//! future is polled to completion.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning for a [`DelayQueue`].
#[derive(Debug, Clone, Default)]
pub struct DelayConfig {
    /// Upper bound of random extra delay added to every scheduled item.
    /// Zero (the default) keeps delays exact, which tests rely on.
    pub jitter: Duration,
}

impl DelayConfig {
    pub fn with_jitter(jitter: Duration) -> Self {
        Self { jitter }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Lifetime counters for a queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelayMetrics {
    /// Items ever pushed.
    pub total_scheduled: u64,
    /// Items handed back by `next_due`.
    pub total_fired: u64,
    /// Items dropped by `clear`.
    pub total_cleared: u64,
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// A single-owner queue of items that become ready at a deadline.
///
/// Items sharing a deadline come out in the order they were scheduled.
pub struct DelayQueue<T> {
    config: DelayConfig,
    /// Keyed by deadline, then insertion sequence to keep equal deadlines FIFO.
    entries: BTreeMap<(Instant, u64), T>,
    next_seq: u64,
    metrics: DelayMetrics,
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self::new(DelayConfig::default())
    }
}

impl<T> DelayQueue<T> {
    pub fn new(config: DelayConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
            next_seq: 0,
            metrics: DelayMetrics::default(),
        }
    }

    /// Schedules `item` to fire `delay` from now, plus any configured jitter.
    pub fn schedule(&mut self, delay: Duration, item: T) -> Instant {
        let deadline = Instant::now() + delay + self.jitter();
        self.schedule_at(deadline, item);
        deadline
    }

    /// Schedules `item` to fire at an absolute deadline. Jitter is not applied.
    pub fn schedule_at(&mut self, deadline: Instant, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((deadline, seq), item);
        self.metrics.total_scheduled += 1;
        trace!(seq, pending = self.entries.len(), "delay scheduled");
    }

    /// Waits for the earliest item to come due and removes it.
    ///
    /// Items already past their deadline are returned immediately.
    pub async fn next_due(&mut self) -> T {
        let Some(&(deadline, _)) = self.entries.keys().next() else {
            return std::future::pending::<T>().await;
        };

        time::sleep_until(deadline).await;

        match self.entries.pop_first() {
            Some((_, item)) => {
                self.metrics.total_fired += 1;
                item
            }
            // `&mut self` is held across the sleep, so nothing can have
            // drained the queue in between.
            None => std::future::pending::<T>().await,
        }
    }

    /// Drops every pending item. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.metrics.total_cleared += dropped as u64;
        if dropped > 0 {
            debug!(dropped, "delay queue cleared");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deadline of the earliest pending item.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.keys().next().map(|&(deadline, _)| deadline)
    }

    pub fn metrics(&self) -> &DelayMetrics {
        &self.metrics
    }

    fn jitter(&self) -> Duration {
        let max = self.config.jitter.as_micros() as u64;
        if max == 0 {
            Duration::ZERO
        } else {
            Duration::from_micros(rand::rng().random_range(0..=max))
        }
    }
}
