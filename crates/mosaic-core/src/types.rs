//! Shared types for mosaic
//!
//! Thumbnail dimensions, the loaded thumbnail itself, and the image types the
//! thumbnailer understands.

use std::path::{Path, PathBuf};

use image::RgbaImage;

/// File extensions accepted as gallery images (compared case-insensitively)
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Default edge length of the thumbnail box, in pixels
pub const DEFAULT_THUMBNAIL_EDGE: u32 = 100;

/// Default number of concurrent loader units
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Check whether a path has one of the [`SUPPORTED_IMAGE_TYPES`] extensions
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_IMAGE_TYPES
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Bounding box a thumbnail is fitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn square(edge: u32) -> Self {
        Self::new(edge, edge)
    }

    /// Dimensions an image of `width`x`height` gets inside this box
    ///
    /// Images that already fit are left alone. With `preserve_ratio` the
    /// image is scaled down until both edges fit; without it the image is
    /// stretched to exactly the box.
    pub fn fit(&self, width: u32, height: u32, preserve_ratio: bool) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }
        if width <= self.width && height <= self.height {
            return (width, height);
        }
        if !preserve_ratio {
            return (self.width.max(1), self.height.max(1));
        }

        let scale = f64::min(
            self.width as f64 / width as f64,
            self.height as f64 / height as f64,
        );
        let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, self.width.max(1));
        let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, self.height.max(1));
        (fitted_width, fitted_height)
    }
}

impl Default for ThumbnailSize {
    fn default() -> Self {
        Self::square(DEFAULT_THUMBNAIL_EDGE)
    }
}

/// A decoded, scaled-down image ready for display
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Image the thumbnail was made from
    pub source: PathBuf,
    /// Width of the source image before scaling
    pub original_width: u32,
    /// Height of the source image before scaling
    pub original_height: u32,
    /// Scaled pixels
    pub image: RgbaImage,
}

impl Thumbnail {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// File name of the source image, for labels and log lines
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
