//! Progress reporting and cancellation
//!
//! These allow the engine to be driven from a terminal UI without
//! depending on one.

use crate::types::{Action, Outcome};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress callback for a reconciliation run
///
/// Called from worker threads, hence `Sync` and `&self`.
pub trait ProgressCallback: Sync {
    /// Called when a batch of topics starts
    fn on_batch_start(&self, count: usize, label: &str);

    /// Called when work on a topic starts
    fn on_topic_start(&self, topic: &str, action: Action);

    /// Called when a topic's outcome is recorded
    fn on_topic_complete(&self, outcome: &Outcome);

    /// Called when a batch completes
    fn on_batch_complete(&self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&self, _count: usize, _label: &str) {}
    fn on_topic_start(&self, _topic: &str, _action: Action) {}
    fn on_topic_complete(&self, _outcome: &Outcome) {}
    fn on_batch_complete(&self) {}
}

/// Cooperative cancellation flag.
///
/// Checked before each topic starts; topics already in flight finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
