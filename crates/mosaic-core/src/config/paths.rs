//! Standard paths for mosaic configuration and galleries

use std::path::PathBuf;

/// Get the default config file path
///
/// Returns: `~/.config/mosaic/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("mosaic")
        .join("config.yaml")
}

/// Get the directory browsed when no galleries are given
///
/// Returns the platform picture directory, or `~/Pictures` when the platform
/// doesn't define one.
pub fn default_pictures_path() -> PathBuf {
    dirs::picture_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Pictures")
    })
}
