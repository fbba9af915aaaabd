//! Gallery view: a grid of thumbnail cells fed by one thumbnail queue
//!
//! Switching focus to another gallery cancels whatever the queue is still
//! loading for the previous one, replaces the grid, and starts a new batch.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::thumbnail::{LoadError, ThumbnailQueue, ThumbnailTarget};
use crate::types::Thumbnail;

/// What a grid cell currently shows
#[derive(Debug, Clone)]
pub enum CellState {
    /// Waiting for its thumbnail (spinner)
    Pending,
    Loaded(Thumbnail),
    /// Load failed; the placeholder stays
    Failed(String),
}

/// One image slot in the grid
#[derive(Debug)]
pub struct ThumbnailCell {
    index: usize,
    source: PathBuf,
    state: Mutex<CellState>,
}

impl ThumbnailCell {
    pub fn new(index: usize, source: PathBuf) -> Self {
        Self {
            index,
            source,
            state: Mutex::new(CellState::Pending),
        }
    }

    /// Position in the gallery, row-major
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Caption under the thumbnail; only shown in debug mode
    pub fn label(&self, debug: bool) -> String {
        if debug {
            format!("{}; {}", self.index, self.file_name())
        } else {
            String::new()
        }
    }

    pub fn state(&self) -> CellState {
        self.lock_state().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.lock_state(), CellState::Pending)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.lock_state(), CellState::Loaded(_))
    }

    pub fn thumbnail(&self) -> Option<Thumbnail> {
        match &*self.lock_state() {
            CellState::Loaded(thumbnail) => Some(thumbnail.clone()),
            _ => None,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CellState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ThumbnailTarget for ThumbnailCell {
    fn source(&self) -> &Path {
        &self.source
    }

    fn on_loaded(&self, thumbnail: Thumbnail) {
        *self.lock_state() = CellState::Loaded(thumbnail);
    }

    fn on_failed(&self, error: &LoadError) {
        *self.lock_state() = CellState::Failed(error.to_string());
    }
}

/// Result of [`GalleryView::set_focus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// Already showing this gallery
    Unchanged,
    /// The gallery has no images; show the blank display
    Empty,
    /// A new batch was started for this many images
    Loading { images: usize },
}

/// The thumbnail grid for whichever gallery has focus
pub struct GalleryView {
    queue: ThumbnailQueue,
    focus: Option<String>,
    cells: Vec<Arc<ThumbnailCell>>,
    columns: usize,
}

impl GalleryView {
    pub fn new(queue: ThumbnailQueue, columns: usize) -> Self {
        Self {
            queue,
            focus: None,
            cells: Vec::new(),
            columns: columns.max(1),
        }
    }

    /// Name of the gallery currently shown
    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Show a gallery, loading thumbnails for `images` in order
    ///
    /// Galleries are identified by name; re-focusing the current one does
    /// nothing. An unfinished batch for the previous gallery is cancelled.
    pub fn set_focus(&mut self, name: &str, images: Vec<PathBuf>) -> FocusChange {
        if self.focus.as_deref() == Some(name) {
            log::debug!("Gallery \"{}\" already has focus", name);
            return FocusChange::Unchanged;
        }

        if !self.queue.is_done() {
            log::info!(
                "Abandoning thumbnails for {:?} ({}/{} loaded)",
                self.focus,
                self.queue.completed(),
                self.queue.total()
            );
            self.queue.cancel();
        }

        self.focus = Some(name.to_string());
        self.cells.clear();

        if images.is_empty() {
            log::info!("Gallery \"{}\" has no images", name);
            return FocusChange::Empty;
        }

        log::info!("Loading {} images for gallery \"{}\"", images.len(), name);

        self.cells = images
            .into_iter()
            .enumerate()
            .map(|(index, path)| Arc::new(ThumbnailCell::new(index, path)))
            .collect();
        for cell in &self.cells {
            self.queue.enqueue(cell.clone());
        }
        self.queue.start();

        FocusChange::Loading {
            images: self.cells.len(),
        }
    }

    /// Apply finished loads to their cells; call regularly from the UI loop
    pub fn pump(&mut self) -> usize {
        self.queue.process_completions()
    }

    pub fn is_loading(&self) -> bool {
        !self.queue.is_done()
    }

    pub fn cells(&self) -> &[Arc<ThumbnailCell>] {
        &self.cells
    }

    /// Cells split into grid rows of `columns`
    pub fn rows(&self) -> std::slice::Chunks<'_, Arc<ThumbnailCell>> {
        self.cells.chunks(self.columns)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn queue(&self) -> &ThumbnailQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut ThumbnailQueue {
        &mut self.queue
    }
}
