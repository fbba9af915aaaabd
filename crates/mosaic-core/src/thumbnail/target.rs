//! The consumer side of a thumbnail job

use std::path::Path;

use super::error::LoadError;
use crate::types::Thumbnail;

/// Anything that wants an image loaded into it, e.g. a grid cell
///
/// Targets stay owned by the caller. The queue holds an `Arc` only while the
/// job is pending or running and drops it on completion or cancel. Both
/// callbacks run on the thread that drives the queue, never on a loader
/// thread, so implementations don't need to be `Send`.
pub trait ThumbnailTarget {
    /// Image to load
    fn source(&self) -> &Path;

    /// Called once with the thumbnail when the load succeeds
    fn on_loaded(&self, thumbnail: Thumbnail);

    /// Called once instead of `on_loaded` when the load fails
    ///
    /// The job still counts as completed. Default: keep the placeholder.
    fn on_failed(&self, _error: &LoadError) {}
}
