//! Status line shown while a batch loads

use std::cell::Cell;
use std::io::Write;

use mosaic_core::thumbnail::{ProgressSink, ProgressSnapshot};

/// Prints the loading message to stderr and hides it once the batch is done
pub struct StatusLine {
    debug: bool,
    visible: Cell<bool>,
}

impl StatusLine {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            visible: Cell::new(false),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Update visibility for `snapshot` and return the line to draw, if any
    pub fn render(&self, snapshot: &ProgressSnapshot) -> Option<String> {
        if snapshot.total == 0 || snapshot.progress >= 1.0 {
            self.visible.set(false);
            return None;
        }
        self.visible.set(true);
        Some(snapshot.status_message(self.debug))
    }
}

impl ProgressSink for StatusLine {
    fn publish(&self, snapshot: &ProgressSnapshot) {
        let was_visible = self.is_visible();
        let mut stderr = std::io::stderr().lock();
        let _ = match self.render(snapshot) {
            Some(line) => write!(stderr, "\r\x1b[2K{}", line),
            None if was_visible => writeln!(stderr, "\r\x1b[2K"),
            None => Ok(()),
        };
        let _ = stderr.flush();
    }
}
