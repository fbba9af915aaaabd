//! Configuration for mosaic applications
//!
//! - Generic YAML config loading/saving
//! - The application config (`MosaicConfig`) with thumbnail and grid sections
//! - Standard config and picture paths
//!
//! # Usage
//!
//! ```ignore
//! use mosaic_core::config::{load_config, default_config_path, MosaicConfig};
//!
//! let config: MosaicConfig = load_config(&default_config_path());
//! let queue = ThumbnailQueue::from_config(&config.thumbnails, loader)?;
//! ```

mod io;
mod paths;
mod settings;

pub use io::{load_config, read_config, save_config};
pub use paths::{default_config_path, default_pictures_path};
pub use settings::{GridConfig, MosaicConfig, ThumbnailConfig};
