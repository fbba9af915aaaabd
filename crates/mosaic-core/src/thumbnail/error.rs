//! Thumbnail loading error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the load operation itself
///
/// These never escape a loader unit as errors: a failed load is delivered as
/// a completed job whose target gets [`ThumbnailTarget::on_failed`].
///
/// [`ThumbnailTarget::on_failed`]: super::ThumbnailTarget::on_failed
#[derive(Error, Debug)]
pub enum LoadError {
    /// The image file could not be opened or read
    #[error("Failed to read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image data could not be decoded
    #[error("Failed to decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Not one of the supported image types
    #[error("Unsupported image type: {0:?}")]
    Unsupported(PathBuf),

    /// The loader panicked
    #[error("Thumbnail loader panicked: {0}")]
    Panicked(String),

    /// The job was cancelled before the load began
    #[error("Load cancelled")]
    Cancelled,
}

/// Result type for load operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors constructing a thumbnail queue
#[derive(Error, Debug)]
pub enum QueueError {
    /// A pool without units can never run a job
    #[error("Loader pool size must be at least 1 (got {0})")]
    InvalidPoolSize(usize),

    /// A loader unit's worker thread could not be started
    #[error("Failed to spawn loader thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result type for queue construction
pub type QueueResult<T> = Result<T, QueueError>;
