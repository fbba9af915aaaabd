//! Messages between the queue and loader unit threads
//!
//! LoadRequest (queue → unit thread) → UnitCompletion (unit thread → queue)

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use super::error::LoadResult;
use crate::types::Thumbnail;

/// A job handed to a unit's worker thread
#[derive(Debug)]
pub(crate) struct LoadRequest {
    /// Image to load
    pub source: PathBuf,
    /// Queue generation the job belongs to
    pub epoch: u64,
    /// Set when the job is cancelled; checked before each attempt
    pub cancel: Arc<AtomicBool>,
}

/// A finished load, sent back to the thread driving the queue
#[derive(Debug)]
pub(crate) struct UnitCompletion {
    /// Index of the unit that ran the job
    pub unit: usize,
    /// Generation copied from the request
    pub epoch: u64,
    /// Thumbnail, or why there isn't one
    pub outcome: LoadResult<Thumbnail>,
    /// When the worker finished the last attempt
    pub finished_at: Instant,
}

/// What applying a completion did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// The target received its thumbnail
    Loaded,
    /// The load failed; the job still counts as completed
    Failed,
    /// Stale completion from a cancelled batch, dropped without side effects
    Discarded,
}
