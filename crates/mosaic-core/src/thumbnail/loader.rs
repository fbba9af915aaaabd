//! The load operation run by loader units
//!
//! The queue treats loading as an opaque, possibly slow, synchronous call
//! behind [`ThumbnailLoader`]. [`ImageThumbnailer`] is the real one: decode
//! with the `image` crate, then scale into the thumbnail box.

use std::path::Path;

use image::imageops::FilterType;
use image::ImageReader;

use super::error::{LoadError, LoadResult};
use crate::config::ThumbnailConfig;
use crate::types::{is_supported_image, Thumbnail, ThumbnailSize};

/// Turns an image location into a thumbnail
///
/// Called on loader unit threads, so implementations must be `Send + Sync`.
/// Closures `Fn(&Path) -> LoadResult<Thumbnail>` implement this directly.
pub trait ThumbnailLoader: Send + Sync {
    fn load(&self, source: &Path) -> LoadResult<Thumbnail>;
}

impl<F> ThumbnailLoader for F
where
    F: Fn(&Path) -> LoadResult<Thumbnail> + Send + Sync,
{
    fn load(&self, source: &Path) -> LoadResult<Thumbnail> {
        self(source)
    }
}

/// Decodes images from disk and fits them into a thumbnail box
#[derive(Debug, Clone)]
pub struct ImageThumbnailer {
    size: ThumbnailSize,
    preserve_ratio: bool,
    smooth: bool,
}

impl ImageThumbnailer {
    pub fn new(size: ThumbnailSize) -> Self {
        Self {
            size,
            preserve_ratio: true,
            smooth: true,
        }
    }

    pub fn from_config(config: &ThumbnailConfig) -> Self {
        Self {
            size: config.size(),
            preserve_ratio: config.preserve_ratio,
            smooth: config.smooth,
        }
    }

    pub fn with_preserve_ratio(mut self, preserve_ratio: bool) -> Self {
        self.preserve_ratio = preserve_ratio;
        self
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn size(&self) -> ThumbnailSize {
        self.size
    }

    fn filter(&self) -> FilterType {
        if self.smooth {
            FilterType::Triangle
        } else {
            FilterType::Nearest
        }
    }
}

impl Default for ImageThumbnailer {
    fn default() -> Self {
        Self::new(ThumbnailSize::default())
    }
}

impl ThumbnailLoader for ImageThumbnailer {
    fn load(&self, source: &Path) -> LoadResult<Thumbnail> {
        if !is_supported_image(source) {
            return Err(LoadError::Unsupported(source.to_path_buf()));
        }

        let io_error = |source_err: std::io::Error| LoadError::Io {
            path: source.to_path_buf(),
            source: source_err,
        };
        let decoded = ImageReader::open(source)
            .map_err(io_error)?
            .with_guessed_format()
            .map_err(io_error)?
            .decode()
            .map_err(|e| LoadError::Decode {
                path: source.to_path_buf(),
                source: e,
            })?;

        let (width, height) = (decoded.width(), decoded.height());
        let (fitted_width, fitted_height) = self.size.fit(width, height, self.preserve_ratio);
        let scaled = if (fitted_width, fitted_height) == (width, height) {
            decoded
        } else {
            decoded.resize_exact(fitted_width, fitted_height, self.filter())
        };

        Ok(Thumbnail {
            source: source.to_path_buf(),
            original_width: width,
            original_height: height,
            image: scaled.to_rgba8(),
        })
    }
}
