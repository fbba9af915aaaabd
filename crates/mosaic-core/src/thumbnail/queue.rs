//! The thumbnail job queue
//!
//! Owns the loader pool, the pending jobs and the batch statistics. All of
//! it lives on the thread that drives the queue (normally the UI thread);
//! loader threads only ever talk to it through the completion channel.
//!
//! A batch runs like this:
//!
//! 1. `enqueue()` each target, then `start()`: up to `pool_size` jobs are
//!    assigned right away (oldest first), the rest wait.
//! 2. The driving thread calls `process_completions()` regularly. Each
//!    completion is delivered to its target, counted, and the freed unit
//!    takes the next pending job.
//! 3. `is_done()` turns true when every submitted job has completed.
//!
//! `cancel()` may be called at any point and leaves the queue idle, empty and
//! ready for the next batch.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, TryRecvError};

use super::error::{QueueError, QueueResult};
use super::loader::ThumbnailLoader;
use super::message::{CompletionKind, UnitCompletion};
use super::progress::{ProgressHandle, ProgressSink, ProgressSnapshot};
use super::target::ThumbnailTarget;
use super::unit::LoaderUnit;
use crate::config::ThumbnailConfig;

/// A target waiting for a free loader unit
struct PendingJob {
    target: Arc<dyn ThumbnailTarget>,
}

/// Fixed-size pool of loader units plus the jobs waiting for them
pub struct ThumbnailQueue {
    units: Vec<LoaderUnit>,
    /// Idle unit indices, in the order they became free
    available: VecDeque<usize>,
    pending: VecDeque<PendingJob>,
    /// Jobs submitted in the current batch
    total: u64,
    /// Jobs completed (loaded or failed) in the current batch
    completed: u64,
    /// Load time of every completed job in the current batch
    load_times: Vec<Duration>,
    progress: ProgressHandle,
    sink: Option<Box<dyn ProgressSink>>,
    /// While set, completions are discarded and new jobs are not dispatched
    stopped: bool,
    /// Bumped on every cancel; completions from older epochs are stale
    epoch: u64,
    completion_rx: Receiver<UnitCompletion>,
}

impl ThumbnailQueue {
    /// Create a queue with `pool_size` loader units and no retries
    pub fn new(pool_size: usize, loader: Arc<dyn ThumbnailLoader>) -> QueueResult<Self> {
        Self::with_retries(pool_size, loader, 0)
    }

    /// Create a queue from the thumbnail config section
    pub fn from_config(
        config: &ThumbnailConfig,
        loader: Arc<dyn ThumbnailLoader>,
    ) -> QueueResult<Self> {
        Self::with_retries(config.pool_size, loader, config.max_retries)
    }

    /// Create a queue whose units retry a failed load `max_retries` times
    pub fn with_retries(
        pool_size: usize,
        loader: Arc<dyn ThumbnailLoader>,
        max_retries: u32,
    ) -> QueueResult<Self> {
        if pool_size == 0 {
            return Err(QueueError::InvalidPoolSize(pool_size));
        }

        let (completion_tx, completion_rx) = channel::unbounded::<UnitCompletion>();
        let units = (0..pool_size)
            .map(|id| LoaderUnit::spawn(id, loader.clone(), max_retries, completion_tx.clone()))
            .collect::<QueueResult<Vec<_>>>()?;

        log::info!(
            "ThumbnailQueue spawned {} loader units (max retries: {})",
            pool_size,
            max_retries
        );

        Ok(Self {
            units,
            available: (0..pool_size).collect(),
            pending: VecDeque::new(),
            total: 0,
            completed: 0,
            load_times: Vec::new(),
            progress: ProgressHandle::new(),
            sink: None,
            stopped: true,
            epoch: 0,
            completion_rx,
        })
    }

    /// Attach the observer that receives a snapshot after every state change
    pub fn set_progress_sink(&mut self, sink: impl ProgressSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn with_progress_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.set_progress_sink(sink);
        self
    }

    /// Queue a target for loading
    ///
    /// Before `start()` the job just waits. While a batch is running it joins
    /// that batch and runs as soon as a unit is free. Enqueueing onto a
    /// finished batch opens a new one with fresh counters, which waits for
    /// `start()`; progress stays at 1.0 until then.
    pub fn enqueue(&mut self, target: Arc<dyn ThumbnailTarget>) {
        if self.total > 0 && self.is_done() {
            log::debug!("Previous batch finished, next one starts on start()");
            self.begin_batch();
            self.stopped = true;
        }

        self.pending.push_back(PendingJob { target });
        self.total += 1;

        if !self.stopped {
            self.dispatch();
        }
    }

    /// Start the batch: hand pending jobs to idle units
    ///
    /// Assigns `min(idle units, pending jobs)` jobs, oldest first, and
    /// returns immediately. Calling it with nothing pending is harmless.
    pub fn start(&mut self) {
        self.stopped = false;
        self.progress.set(self.ratio());

        if self.pending.is_empty() {
            log::debug!("ThumbnailQueue started with nothing pending");
        } else {
            log::info!(
                "ThumbnailQueue starting: {} pending, {} idle units",
                self.pending.len(),
                self.available.len()
            );
            self.dispatch();
        }

        self.publish();
    }

    /// Abandon the current batch and return to a clean idle state
    ///
    /// Pending jobs are dropped, counters cleared and every unit marked idle.
    /// Loads already running finish in the background and their results are
    /// discarded. Safe to call at any time, any number of times.
    pub fn cancel(&mut self) {
        if self.stopped {
            log::warn!("ThumbnailQueue was not running when cancel was requested");
        } else {
            log::info!(
                "ThumbnailQueue cancelled at {}/{} ({} pending, {} running)",
                self.completed,
                self.total,
                self.pending.len(),
                self.running()
            );
            self.stopped = true;
        }

        self.epoch += 1;
        for unit in &mut self.units {
            unit.cancel();
        }
        for unit in &mut self.units {
            unit.reset();
        }
        self.available = (0..self.units.len()).collect();
        self.pending.clear();

        // Anything already delivered belongs to the abandoned batch
        while self.completion_rx.try_recv().is_ok() {}

        self.begin_batch();
        self.progress.set(0.0);
        self.publish();
    }

    /// True when every submitted job has completed
    ///
    /// Also true for a queue that never started or was just cancelled.
    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }

    /// True when no jobs are waiting for a unit
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Current progress in `[0.0, 1.0]`
    pub fn progress(&self) -> f64 {
        self.progress.get()
    }

    /// Clonable, thread-safe view of the progress value
    pub fn progress_handle(&self) -> ProgressHandle {
        self.progress.clone()
    }

    pub fn pool_size(&self) -> usize {
        self.units.len()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Jobs waiting for a unit
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Units currently assigned a job
    pub fn running(&self) -> usize {
        self.units.len() - self.available.len()
    }

    pub fn units(&self) -> &[LoaderUnit] {
        &self.units
    }

    /// Load times of the jobs completed in this batch, in completion order
    pub fn load_times(&self) -> &[Duration] {
        &self.load_times
    }

    /// Mean load time for this batch, zero before the first completion
    pub fn average_load_time(&self) -> Duration {
        if self.load_times.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.load_times.iter().sum();
        sum / self.load_times.len() as u32
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
            progress: self.progress.get(),
            average: self.average_load_time(),
        }
    }

    /// Apply every completion that has arrived, without blocking
    ///
    /// Returns how many completions were applied (discarded ones excluded).
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.completion_rx.try_recv() {
                Ok(completion) => {
                    if self.on_unit_finished(completion) != CompletionKind::Discarded {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::error!("All loader threads disconnected unexpectedly");
                    break;
                }
            }
        }
        applied
    }

    /// Block up to `timeout` for the next completion and apply it
    ///
    /// Returns `None` if nothing arrived in time.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> Option<CompletionKind> {
        match self.completion_rx.recv_timeout(timeout) {
            Ok(completion) => Some(self.on_unit_finished(completion)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::error!("All loader threads disconnected unexpectedly");
                None
            }
        }
    }

    /// A unit's load finished: deliver, count, and refill the unit
    fn on_unit_finished(&mut self, completion: UnitCompletion) -> CompletionKind {
        let UnitCompletion {
            unit: id,
            epoch,
            outcome,
            finished_at,
        } = completion;

        if self.stopped || epoch != self.epoch {
            log::debug!(
                "Discarding stale completion from unit {} (epoch {}, current {})",
                id,
                epoch,
                self.epoch
            );
            return CompletionKind::Discarded;
        }

        let Some(unit) = self.units.get_mut(id) else {
            log::error!("Completion from unknown loader unit {}", id);
            return CompletionKind::Discarded;
        };
        let Some((target, duration)) = unit.finish(finished_at) else {
            log::warn!(
                "Completion from loader unit {} while {:?}, ignoring",
                id,
                unit.state()
            );
            return CompletionKind::Discarded;
        };

        let kind = match outcome {
            Ok(thumbnail) => {
                target.on_loaded(thumbnail);
                CompletionKind::Loaded
            }
            Err(e) => {
                target.on_failed(&e);
                CompletionKind::Failed
            }
        };

        self.completed += 1;
        self.load_times.push(duration);
        self.progress.set(self.ratio());

        log::debug!(
            "[THUMB] {}/{} done, last {:?}, average {:?}",
            self.completed,
            self.total,
            duration,
            self.average_load_time()
        );

        match self.pending.pop_front() {
            Some(job) => {
                let unit = &mut self.units[id];
                unit.release();
                unit.assign(job.target, self.epoch);
            }
            None => {
                self.units[id].release();
                self.available.push_back(id);
            }
        }

        if self.is_done() {
            log::info!(
                "Loaded {} thumbnails, average {:?}",
                self.total,
                self.average_load_time()
            );
        }

        self.publish();
        kind
    }

    /// Assign pending jobs to idle units until one side runs out
    fn dispatch(&mut self) {
        while !self.pending.is_empty() {
            let Some(id) = self.available.pop_front() else {
                break;
            };
            if let Some(job) = self.pending.pop_front() {
                self.units[id].assign(job.target, self.epoch);
            }
        }
    }

    /// Reset the per-batch counters
    fn begin_batch(&mut self) {
        self.total = 0;
        self.completed = 0;
        self.load_times.clear();
    }

    fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    fn publish(&self) {
        if let Some(sink) = &self.sink {
            sink.publish(&self.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use std::sync::Mutex;

    use crossbeam::channel::Sender;
    use image::RgbaImage;

    use crate::thumbnail::{LoadError, LoadResult};
    use crate::types::Thumbnail;

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Target that counts its callbacks
    struct Recorder {
        source: PathBuf,
        loaded: Cell<u32>,
        failed: Cell<u32>,
    }

    impl Recorder {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                source: PathBuf::from(name),
                loaded: Cell::new(0),
                failed: Cell::new(0),
            })
        }
    }

    impl ThumbnailTarget for Recorder {
        fn source(&self) -> &Path {
            &self.source
        }

        fn on_loaded(&self, thumbnail: Thumbnail) {
            assert_eq!(thumbnail.source, self.source);
            self.loaded.set(self.loaded.get() + 1);
        }

        fn on_failed(&self, _error: &LoadError) {
            self.failed.set(self.failed.get() + 1);
        }
    }

    fn thumb(path: &Path) -> Thumbnail {
        Thumbnail {
            source: path.to_path_buf(),
            original_width: 1,
            original_height: 1,
            image: RgbaImage::new(1, 1),
        }
    }

    /// Loader whose loads announce themselves and then wait for a token
    struct Gate {
        release: Sender<()>,
        entered: Receiver<PathBuf>,
    }

    impl Gate {
        fn open(&self, count: usize) {
            for _ in 0..count {
                self.release.send(()).unwrap();
            }
        }

        fn wait_entered(&self) -> PathBuf {
            self.entered.recv_timeout(TIMEOUT).expect("load never started")
        }
    }

    fn gated_loader() -> (Arc<dyn ThumbnailLoader>, Gate) {
        let (release_tx, release_rx) = channel::unbounded::<()>();
        let (entered_tx, entered_rx) = channel::unbounded::<PathBuf>();
        let loader: Arc<dyn ThumbnailLoader> = Arc::new(move |path: &Path| -> LoadResult<Thumbnail> {
            let _ = entered_tx.send(path.to_path_buf());
            let _ = release_rx.recv();
            if path.to_string_lossy().contains("broken") {
                Err(LoadError::Unsupported(path.to_path_buf()))
            } else {
                Ok(thumb(path))
            }
        });
        (
            loader,
            Gate {
                release: release_tx,
                entered: entered_rx,
            },
        )
    }

    fn instant_loader() -> Arc<dyn ThumbnailLoader> {
        Arc::new(|path: &Path| -> LoadResult<Thumbnail> { Ok(thumb(path)) })
    }

    /// Pump completions until the batch is done
    fn run_to_done(queue: &mut ThumbnailQueue) {
        while !queue.is_done() {
            queue
                .wait_for_completion(TIMEOUT)
                .expect("timed out waiting for a completion");
        }
    }

    #[test]
    fn test_zero_pool_size_is_rejected() {
        let result = ThumbnailQueue::new(0, instant_loader());
        assert!(matches!(result, Err(QueueError::InvalidPoolSize(0))));
    }

    #[test]
    fn test_fresh_queue_is_done_and_idle() {
        let queue = ThumbnailQueue::new(5, instant_loader()).unwrap();
        assert!(queue.is_done());
        assert!(queue.is_empty());
        assert!(queue.is_stopped());
        assert_eq!(queue.pool_size(), 5);
        assert_eq!(queue.running(), 0);
        assert_eq!(queue.progress(), 0.0);
        assert_eq!(queue.average_load_time(), Duration::ZERO);
    }

    #[test]
    fn test_pool_of_two_with_five_jobs() {
        let (loader, gate) = gated_loader();
        let mut queue = ThumbnailQueue::new(2, loader).unwrap();
        let targets: Vec<_> = (0..5).map(|i| Recorder::new(&format!("{}.png", i))).collect();
        for target in &targets {
            queue.enqueue(target.clone());
        }
        assert_eq!(queue.running(), 0);
        assert!(!queue.is_done());

        queue.start();
        assert_eq!(queue.running(), 2);
        assert_eq!(queue.pending(), 3);

        gate.open(1);
        assert_eq!(queue.wait_for_completion(TIMEOUT), Some(CompletionKind::Loaded));
        assert_eq!(queue.completed(), 1);
        assert_eq!(queue.running(), 2);
        assert_eq!(queue.pending(), 2);
        assert!((queue.progress() - 0.2).abs() < 1e-9);

        gate.open(4);
        run_to_done(&mut queue);

        assert!(queue.is_done());
        assert_eq!(queue.progress(), 1.0);
        assert_eq!(queue.completed(), 5);
        assert_eq!(queue.running(), 0);
        assert_eq!(queue.load_times().len(), 5);
        for target in &targets {
            assert_eq!(target.loaded.get(), 1);
            assert_eq!(target.failed.get(), 0);
        }
    }

    #[test]
    fn test_start_assigns_min_of_pool_and_pending() {
        let (loader, gate) = gated_loader();
        let mut queue = ThumbnailQueue::new(3, loader).unwrap();

        queue.start();
        assert_eq!(queue.running(), 0);
        assert!(queue.is_done());

        queue.enqueue(Recorder::new("a.png"));
        queue.enqueue(Recorder::new("b.png"));
        assert_eq!(queue.running(), 2);
        assert_eq!(queue.pending(), 0);

        gate.open(2);
        run_to_done(&mut queue);
    }

    #[test]
    fn test_jobs_are_assigned_oldest_first() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let order_in_loader = order.clone();
        let loader: Arc<dyn ThumbnailLoader> = Arc::new(move |path: &Path| -> LoadResult<Thumbnail> {
            order_in_loader.lock().unwrap().push(path.to_path_buf());
            Ok(thumb(path))
        });
        let mut queue = ThumbnailQueue::new(1, loader).unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            queue.enqueue(Recorder::new(name));
        }

        queue.start();
        run_to_done(&mut queue);

        let order = order.lock().unwrap();
        let expected: Vec<PathBuf> = ["a.png", "b.png", "c.png"].iter().map(PathBuf::from).collect();
        assert_eq!(*order, expected);
    }

    #[test]
    fn test_enqueue_during_batch_joins_it() {
        let (loader, gate) = gated_loader();
        let mut queue = ThumbnailQueue::new(2, loader).unwrap();
        queue.enqueue(Recorder::new("first.png"));
        queue.start();
        assert_eq!(queue.running(), 1);

        queue.enqueue(Recorder::new("second.png"));
        assert_eq!(queue.running(), 2);
        assert_eq!(queue.total(), 2);

        gate.open(2);
        run_to_done(&mut queue);
        assert_eq!(queue.completed(), 2);
    }

    #[test]
    fn test_failed_load_still_completes_batch() {
        let (loader, gate) = gated_loader();
        let mut queue = ThumbnailQueue::new(2, loader).unwrap();
        let good = Recorder::new("good.png");
        let broken = Recorder::new("broken.png");
        queue.enqueue(good.clone());
        queue.enqueue(broken.clone());
        queue.start();

        gate.open(2);
        let mut kinds = vec![
            queue.wait_for_completion(TIMEOUT).unwrap(),
            queue.wait_for_completion(TIMEOUT).unwrap(),
        ];
        kinds.sort_by_key(|kind| *kind == CompletionKind::Failed);

        assert_eq!(kinds, vec![CompletionKind::Loaded, CompletionKind::Failed]);
        assert!(queue.is_done());
        assert_eq!(queue.progress(), 1.0);
        assert_eq!(good.loaded.get(), 1);
        assert_eq!(broken.loaded.get(), 0);
        assert_eq!(broken.failed.get(), 1);
    }

    #[test]
    fn test_late_completion_after_cancel_is_discarded() {
        let (loader, gate) = gated_loader();
        let mut queue = ThumbnailQueue::new(3, loader).unwrap();
        let target = Recorder::new("slow.png");
        queue.enqueue(target.clone());
        queue.start();
        assert_eq!(queue.running(), 1);
        assert_eq!(queue.pending(), 0);
        gate.wait_entered();

        queue.cancel();
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.total(), 0);
        assert_eq!(queue.running(), 0);
        assert!(queue.is_done());

        gate.open(1);
        assert_eq!(queue.wait_for_completion(TIMEOUT), Some(CompletionKind::Discarded));
        assert_eq!(target.loaded.get(), 0);
        assert_eq!(target.failed.get(), 0);
        assert_eq!(queue.completed(), 0);
        assert_eq!(queue.running(), 0);
        assert!(queue.units().iter().all(|unit| unit.is_idle()));
    }

    #[test]
    fn test_cancel_twice_matches_cancel_once() {
        let (loader, gate) = gated_loader();
        let mut queue = ThumbnailQueue::new(2, loader).unwrap();
        for i in 0..4 {
            queue.enqueue(Recorder::new(&format!("{}.png", i)));
        }
        queue.start();

        queue.cancel();
        let once = (queue.pending(), queue.total(), queue.completed(), queue.running());
        queue.cancel();
        let twice = (queue.pending(), queue.total(), queue.completed(), queue.running());

        assert_eq!(once, (0, 0, 0, 0));
        assert_eq!(once, twice);
        assert!(queue.is_done());
        assert!(queue.is_stopped());
        assert_eq!(queue.progress(), 0.0);
        drop(gate);
    }

    #[test]
    fn test_stale_completion_after_restart_is_discarded() {
        let (loader, gate) = gated_loader();
        let mut queue = ThumbnailQueue::new(1, loader).unwrap();
        let old = Recorder::new("old.png");
        queue.enqueue(old.clone());
        queue.start();
        gate.wait_entered();
        queue.cancel();

        let new = Recorder::new("new.png");
        queue.enqueue(new.clone());
        queue.start();
        assert_eq!(queue.running(), 1);

        gate.open(2);
        // The old load finishes on a detached worker, so either may land first
        let mut kinds = vec![
            queue.wait_for_completion(TIMEOUT).unwrap(),
            queue.wait_for_completion(TIMEOUT).unwrap(),
        ];
        kinds.sort_by_key(|kind| *kind != CompletionKind::Discarded);
        assert_eq!(kinds, vec![CompletionKind::Discarded, CompletionKind::Loaded]);

        assert_eq!(old.loaded.get(), 0);
        assert_eq!(new.loaded.get(), 1);
        assert_eq!(queue.total(), 1);
        assert_eq!(queue.completed(), 1);
        assert_eq!(queue.load_times().len(), 1);
        assert!(queue.is_done());
    }

    #[test]
    fn test_batch_after_cancel_runs_while_stale_load_blocks() {
        let (release_tx, release_rx) = channel::unbounded::<()>();
        let (entered_tx, entered_rx) = channel::unbounded::<()>();
        let loader: Arc<dyn ThumbnailLoader> = Arc::new(move |path: &Path| -> LoadResult<Thumbnail> {
            if path.starts_with("slow") {
                let _ = entered_tx.send(());
                let _ = release_rx.recv();
            }
            Ok(thumb(path))
        });
        let mut queue = ThumbnailQueue::new(1, loader).unwrap();
        let slow = Recorder::new("slow/a.png");
        queue.enqueue(slow.clone());
        queue.start();
        entered_rx.recv_timeout(TIMEOUT).unwrap();
        queue.cancel();

        let fast = Recorder::new("fast/b.png");
        queue.enqueue(fast.clone());
        queue.start();

        assert_eq!(queue.wait_for_completion(TIMEOUT), Some(CompletionKind::Loaded));
        assert_eq!(fast.loaded.get(), 1);
        assert!(queue.is_done());

        release_tx.send(()).unwrap();
        assert_eq!(queue.wait_for_completion(TIMEOUT), Some(CompletionKind::Discarded));
        assert_eq!(slow.loaded.get(), 0);
        assert_eq!(queue.completed(), 1);
    }

    #[test]
    fn test_finished_queue_starts_fresh_batch() {
        let mut queue = ThumbnailQueue::new(2, instant_loader()).unwrap();
        queue.enqueue(Recorder::new("a.png"));
        queue.enqueue(Recorder::new("b.png"));
        queue.start();
        run_to_done(&mut queue);
        assert_eq!(queue.load_times().len(), 2);

        for name in ["c.png", "d.png", "e.png"] {
            queue.enqueue(Recorder::new(name));
        }
        assert_eq!(queue.total(), 3);
        assert!(queue.load_times().is_empty());
        assert!(!queue.is_done());

        // Nothing runs before the new batch is started
        assert_eq!(queue.running(), 0);
        assert_eq!(queue.pending(), 3);
        assert_eq!(queue.progress(), 1.0);
        assert_eq!(queue.wait_for_completion(Duration::from_millis(50)), None);

        queue.start();
        assert_eq!(queue.running(), 2);
        run_to_done(&mut queue);
        assert_eq!(queue.completed(), 3);
        assert_eq!(queue.load_times().len(), 3);
        assert_eq!(queue.progress(), 1.0);
    }

    #[test]
    fn test_average_load_time_is_mean_of_batch() {
        let mut queue = ThumbnailQueue::new(2, instant_loader()).unwrap();
        for i in 0..4 {
            queue.enqueue(Recorder::new(&format!("{}.png", i)));
        }
        queue.start();
        run_to_done(&mut queue);

        let times = queue.load_times();
        let expected = times.iter().sum::<Duration>() / times.len() as u32;
        assert_eq!(queue.average_load_time(), expected);
    }

    #[test]
    fn test_progress_sink_sees_monotonic_progress() {
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let recorded = snapshots.clone();
        let mut queue = ThumbnailQueue::new(2, instant_loader())
            .unwrap()
            .with_progress_sink(move |snapshot: &ProgressSnapshot| {
                recorded.borrow_mut().push(*snapshot)
            });
        for i in 0..6 {
            queue.enqueue(Recorder::new(&format!("{}.png", i)));
        }
        queue.start();
        run_to_done(&mut queue);

        let snapshots = snapshots.borrow();
        assert!(snapshots.len() >= 7);
        for pair in snapshots.windows(2) {
            assert!(pair[1].completed >= pair[0].completed);
            assert!(pair[1].completed <= pair[1].total);
        }
        let last = snapshots.last().unwrap();
        assert_eq!(last.completed, 6);
        assert_eq!(last.progress, 1.0);
        assert!(last.is_done());
    }

    #[test]
    fn test_progress_handle_is_readable_from_other_threads() {
        let mut queue = ThumbnailQueue::new(1, instant_loader()).unwrap();
        let handle = queue.progress_handle();
        queue.enqueue(Recorder::new("a.png"));
        queue.start();
        run_to_done(&mut queue);

        let observed = std::thread::spawn(move || handle.get()).join().unwrap();
        assert_eq!(observed, 1.0);
    }
}
