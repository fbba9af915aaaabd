//! Application configuration sections
//!
//! Every section is `#[serde(default)]`, so a config file only needs the keys
//! it wants to change.

use serde::{Deserialize, Serialize};

use crate::types::{ThumbnailSize, DEFAULT_POOL_SIZE, DEFAULT_THUMBNAIL_EDGE};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Thumbnail loading (pool size, box size, scaling)
    pub thumbnails: ThumbnailConfig,
    /// Grid layout of the gallery view
    pub grid: GridConfig,
    /// Show per-image labels and average load times in the status line
    pub debug: bool,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            thumbnails: ThumbnailConfig::default(),
            grid: GridConfig::default(),
            debug: false,
        }
    }
}

/// Thumbnail loading section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Number of loader units running concurrently (must be at least 1)
    pub pool_size: usize,
    /// Maximum thumbnail width in pixels
    pub width: u32,
    /// Maximum thumbnail height in pixels
    pub height: u32,
    /// Keep the aspect ratio when scaling down
    pub preserve_ratio: bool,
    /// Use a smoothing filter instead of nearest-neighbour sampling
    pub smooth: bool,
    /// Extra attempts after a failed load (0 = no retry)
    pub max_retries: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            width: DEFAULT_THUMBNAIL_EDGE,
            height: DEFAULT_THUMBNAIL_EDGE,
            preserve_ratio: true,
            smooth: true,
            max_retries: 0,
        }
    }
}

impl ThumbnailConfig {
    /// Bounding box thumbnails are fitted into
    pub fn size(&self) -> ThumbnailSize {
        ThumbnailSize::new(self.width, self.height)
    }
}

/// Gallery grid section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Thumbnails per grid row
    pub columns: usize,
    /// Include images in subdirectories of a gallery folder
    pub include_subdirectories: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 5,
            include_subdirectories: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MosaicConfig::default();
        assert_eq!(config.thumbnails.pool_size, 5);
        assert_eq!(config.thumbnails.size(), ThumbnailSize::square(100));
        assert!(config.thumbnails.preserve_ratio);
        assert!(config.thumbnails.smooth);
        assert_eq!(config.thumbnails.max_retries, 0);
        assert_eq!(config.grid.columns, 5);
        assert!(config.grid.include_subdirectories);
        assert!(!config.debug);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "thumbnails:\n  pool_size: 2\ndebug: true\n";
        let config: MosaicConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.thumbnails.pool_size, 2);
        assert_eq!(config.thumbnails.width, 100);
        assert_eq!(config.grid.columns, 5);
        assert!(config.debug);
    }
}
