//! Loader units: one concurrency slot each
//!
//! A unit is created once per pool slot and reused for the life of its
//! queue. It owns a named worker thread that runs one load at a time; the
//! unit itself only keeps bookkeeping (current target, timing, state) and is
//! touched exclusively by the thread driving the queue.
//!
//! Cancelling a busy unit detaches its worker: the old thread finishes the
//! abandoned load on its own and exits, while a fresh worker takes the
//! unit's next job straight away.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};

use super::error::{LoadError, LoadResult, QueueResult};
use super::loader::ThumbnailLoader;
use super::message::{LoadRequest, UnitCompletion};
use super::target::ThumbnailTarget;
use crate::types::Thumbnail;

/// Lifecycle of a loader unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Free to take a job
    Idle,
    /// A load is in flight on the worker thread
    Running,
    /// Load finished, waiting for the queue to hand out the next job
    Finished,
}

/// One slot of the loader pool
pub struct LoaderUnit {
    id: usize,
    state: UnitState,
    target: Option<Arc<dyn ThumbnailTarget>>,
    started_at: Option<Instant>,
    last_duration: Option<Duration>,
    /// Cancel flag of the current job
    cancel: Arc<AtomicBool>,
    loader: Arc<dyn ThumbnailLoader>,
    max_retries: u32,
    completion_tx: Sender<UnitCompletion>,
    request_tx: Sender<LoadRequest>,
    /// Current worker; it exits once `request_tx` is dropped
    _worker: JoinHandle<()>,
}

impl LoaderUnit {
    /// Create the unit and spawn its worker thread
    ///
    /// Completions from this unit are sent to `completion_tx`.
    pub(crate) fn spawn(
        id: usize,
        loader: Arc<dyn ThumbnailLoader>,
        max_retries: u32,
        completion_tx: Sender<UnitCompletion>,
    ) -> QueueResult<Self> {
        let (request_tx, worker) =
            spawn_worker(id, loader.clone(), max_retries, completion_tx.clone())?;

        Ok(Self {
            id,
            state: UnitState::Idle,
            target: None,
            started_at: None,
            last_duration: None,
            cancel: Arc::new(AtomicBool::new(false)),
            loader,
            max_retries,
            completion_tx,
            request_tx,
            _worker: worker,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == UnitState::Idle
    }

    /// When the current (or last) job was assigned
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Time from assignment to the end of the last completed job
    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    /// Start loading `target` on the worker thread
    ///
    /// # Panics
    ///
    /// If the unit is not idle. Double-assigning a unit is a bug in the
    /// coordinating code, not a load failure.
    pub(crate) fn assign(&mut self, target: Arc<dyn ThumbnailTarget>, epoch: u64) {
        assert!(
            self.state == UnitState::Idle,
            "loader unit {} assigned a job while {:?}",
            self.id,
            self.state
        );

        // Fresh flag per job: cancelling a stale job must not cancel the next
        self.cancel = Arc::new(AtomicBool::new(false));
        let request = LoadRequest {
            source: target.source().to_path_buf(),
            epoch,
            cancel: self.cancel.clone(),
        };

        log::debug!("Loader unit {}: assigned {:?}", self.id, request.source);

        self.target = Some(target);
        self.started_at = Some(Instant::now());
        self.state = UnitState::Running;

        if self.request_tx.send(request).is_err() {
            log::error!("Loader unit {}: worker thread is gone", self.id);
        }
    }

    /// Record a completed load and hand back its target and duration
    ///
    /// Returns `None` unless a job is running.
    pub(crate) fn finish(
        &mut self,
        finished_at: Instant,
    ) -> Option<(Arc<dyn ThumbnailTarget>, Duration)> {
        if self.state != UnitState::Running {
            return None;
        }
        let target = self.target.take()?;
        let duration = self
            .started_at
            .map(|started| finished_at.saturating_duration_since(started))
            .unwrap_or_default();

        self.last_duration = Some(duration);
        self.state = UnitState::Finished;
        Some((target, duration))
    }

    /// Finished → Idle, once the queue has nothing more for this unit
    pub(crate) fn release(&mut self) {
        self.state = UnitState::Idle;
    }

    /// Abandon the in-flight load and mark the unit idle
    ///
    /// Loads can't be interrupted mid-decode. A running load keeps its old
    /// worker thread until it completes, and the queue drops the result as
    /// stale; the unit gets a new worker so its next job doesn't wait.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if self.state == UnitState::Running {
            log::debug!("Loader unit {}: detaching worker from cancelled load", self.id);
            self.replace_worker();
        }
        self.target = None;
        self.state = UnitState::Idle;
    }

    /// Clear all bookkeeping regardless of state
    pub fn reset(&mut self) {
        self.target = None;
        self.started_at = None;
        self.last_duration = None;
        self.state = UnitState::Idle;
    }

    fn replace_worker(&mut self) {
        match spawn_worker(
            self.id,
            self.loader.clone(),
            self.max_retries,
            self.completion_tx.clone(),
        ) {
            Ok((request_tx, worker)) => {
                self.request_tx = request_tx;
                self._worker = worker;
            }
            Err(e) => log::error!(
                "Loader unit {}: failed to spawn replacement worker, keeping the busy one: {}",
                self.id,
                e
            ),
        }
    }
}

fn spawn_worker(
    id: usize,
    loader: Arc<dyn ThumbnailLoader>,
    max_retries: u32,
    completion_tx: Sender<UnitCompletion>,
) -> io::Result<(Sender<LoadRequest>, JoinHandle<()>)> {
    let (request_tx, request_rx) = channel::unbounded::<LoadRequest>();

    let handle = thread::Builder::new()
        .name(format!("thumb-loader-{}", id))
        .spawn(move || {
            unit_thread(id, request_rx, completion_tx, loader, max_retries);
        })?;

    Ok((request_tx, handle))
}

/// Worker thread: run requests until the unit drops its sender
fn unit_thread(
    id: usize,
    requests: Receiver<LoadRequest>,
    completions: Sender<UnitCompletion>,
    loader: Arc<dyn ThumbnailLoader>,
    max_retries: u32,
) {
    log::debug!("Loader unit {} thread started", id);

    while let Ok(request) = requests.recv() {
        let start = Instant::now();
        let outcome = run_load(loader.as_ref(), &request, max_retries);
        let finished_at = Instant::now();
        let elapsed = finished_at - start;

        match &outcome {
            Ok(thumbnail) => log::debug!(
                "[THUMB] Unit {}: loaded {:?} ({}x{}) in {:?}",
                id,
                request.source,
                thumbnail.width(),
                thumbnail.height(),
                elapsed
            ),
            Err(LoadError::Cancelled) => {
                log::debug!("[THUMB] Unit {}: skipped cancelled {:?}", id, request.source)
            }
            Err(e) => log::warn!("Failed to load thumbnail for {:?}: {}", request.source, e),
        }

        let completion = UnitCompletion {
            unit: id,
            epoch: request.epoch,
            outcome,
            finished_at,
        };
        if completions.send(completion).is_err() {
            break;
        }
    }

    log::debug!("Loader unit {} thread shutting down", id);
}

/// Run the loader, retrying failures up to `max_retries` times
///
/// A panicking loader is treated as a failed attempt.
fn run_load(
    loader: &dyn ThumbnailLoader,
    request: &LoadRequest,
    max_retries: u32,
) -> LoadResult<Thumbnail> {
    let mut attempt = 0;
    loop {
        if request.cancel.load(Ordering::Acquire) {
            return Err(LoadError::Cancelled);
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| loader.load(&request.source)))
            .unwrap_or_else(|payload| Err(LoadError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(thumbnail) => return Ok(thumbnail),
            Err(e) if attempt >= max_retries => return Err(e),
            Err(e) => {
                attempt += 1;
                log::debug!(
                    "Retrying {:?} ({}/{}) after: {}",
                    request.source,
                    attempt,
                    max_retries,
                    e
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
