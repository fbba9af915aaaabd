//! Progress reporting for the status display
//!
//! Two ways to observe a queue:
//! - [`ProgressHandle`]: a clonable, lock-free ratio in `[0.0, 1.0]` that any
//!   thread may read at any time
//! - [`ProgressSink`]: injected into the queue and called with a
//!   [`ProgressSnapshot`] after every state change

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Point-in-time view of a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Jobs finished in this batch (loaded or failed)
    pub completed: u64,
    /// Jobs submitted in this batch
    pub total: u64,
    /// `completed / total`, 0.0 for an empty batch
    pub progress: f64,
    /// Mean load time of the finished jobs
    pub average: Duration,
}

impl ProgressSnapshot {
    /// True once every submitted job has completed
    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }

    /// Status bar text, e.g. `Loading images.. (3/12), average 41ms`
    ///
    /// The average is only shown in debug mode.
    pub fn status_message(&self, debug: bool) -> String {
        let mut message = format!("Loading images.. ({}/{})", self.completed, self.total);
        if debug {
            message.push_str(&format!(", average {}ms", self.average.as_millis()));
        }
        message
    }
}

/// Receives a snapshot after every queue state change
///
/// Called on the thread driving the queue. Closures taking
/// `&ProgressSnapshot` implement this directly.
pub trait ProgressSink {
    fn publish(&self, snapshot: &ProgressSnapshot);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressSnapshot),
{
    fn publish(&self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}

/// Shared progress ratio, stored as `f64` bits in an atomic
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle(Arc<AtomicU64>);

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current progress in `[0.0, 1.0]`
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, progress: f64) {
        let clamped = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.0.store(clamped.to_bits(), Ordering::Release);
    }
}
