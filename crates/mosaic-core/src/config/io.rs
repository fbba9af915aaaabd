//! YAML config file I/O

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read and parse a YAML config file
pub fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let yaml = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_yaml::from_str(&yaml).with_context(|| format!("Invalid config in {:?}", path))
}

/// Load a config, falling back to defaults
///
/// A missing file is normal on first run. An unreadable or malformed one is
/// logged and ignored.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        return T::default();
    }

    read_config(path).unwrap_or_else(|e| {
        log::warn!("Ignoring config: {:#}", e);
        T::default()
    })
}

/// Write a config as YAML, creating parent directories
///
/// The file is written next to its destination and renamed into place, so a
/// failed write leaves the previous config intact.
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    let staging = path.with_extension("yaml.tmp");
    fs::write(&staging, yaml).with_context(|| format!("Failed to write {:?}", staging))?;
    fs::rename(&staging, path).with_context(|| format!("Failed to replace {:?}", path))?;

    log::info!("Saved config to {:?}", path);
    Ok(())
}
