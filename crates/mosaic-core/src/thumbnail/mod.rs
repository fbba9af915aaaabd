//! Background thumbnail loading
//!
//! A fixed pool of loader units decodes images off the UI thread while the
//! UI thread keeps sole ownership of all queue state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   enqueue/start/cancel   ┌────────────────┐
//! │  UI Thread  │ ───────────────────────► │ ThumbnailQueue │
//! │             │ ◄─────────────────────── │ (pending, stats│
//! └─────────────┘  on_loaded / progress    │  progress)     │
//!                                          └────────────────┘
//!                                            │ LoadRequest ▲ UnitCompletion
//!                                            ▼             │ (crossbeam)
//!                              ┌──────────────┐ ┌──────────────┐
//!                              │ thumb-loader │ │ thumb-loader │ ... pool_size
//!                              │      0       │ │      1       │
//!                              └──────────────┘ └──────────────┘
//! ```
//!
//! Worker threads never touch queue state. They run the opaque
//! [`ThumbnailLoader`] and send a completion back; the UI thread applies
//! completions with [`ThumbnailQueue::process_completions`] (or
//! [`ThumbnailQueue::wait_for_completion`]), which is where targets are
//! called, counters move and freed units pick up the next pending job.
//!
//! # Cancellation
//!
//! [`ThumbnailQueue::cancel`] returns the queue to a clean idle state
//! immediately. Loads already running are left to finish on their old worker
//! thread, which exits afterwards; each busy unit gets a fresh worker so the
//! next batch never waits behind an abandoned decode. Stale completions are
//! recognised by their epoch and dropped without side effects.

mod error;
mod loader;
mod message;
mod progress;
mod queue;
mod target;
mod unit;

pub use error::{LoadError, LoadResult, QueueError, QueueResult};
pub use loader::{ImageThumbnailer, ThumbnailLoader};
pub use message::CompletionKind;
pub use progress::{ProgressHandle, ProgressSink, ProgressSnapshot};
pub use queue::ThumbnailQueue;
pub use target::ThumbnailTarget;
pub use unit::{LoaderUnit, UnitState};
