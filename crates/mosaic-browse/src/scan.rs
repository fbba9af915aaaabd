//! Gallery directory listing

use std::path::{Path, PathBuf};

use mosaic_core::is_supported_image;
use walkdir::WalkDir;

/// A gallery found on disk: its display name and image files
#[derive(Debug, Clone)]
pub struct GalleryDir {
    pub name: String,
    pub images: Vec<PathBuf>,
}

/// List the supported images in `dir`, sorted by path
///
/// Unreadable entries are skipped.
pub fn list_images(dir: &Path, include_subdirectories: bool) -> Vec<PathBuf> {
    let walker = if include_subdirectories {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut images: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
        .map(|e| e.path().to_owned())
        .collect();
    images.sort();
    images
}

pub fn scan_gallery(dir: &Path, include_subdirectories: bool) -> GalleryDir {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    let images = list_images(dir, include_subdirectories);
    log::info!("Found {} images in {:?}", images.len(), dir);
    GalleryDir { name, images }
}
