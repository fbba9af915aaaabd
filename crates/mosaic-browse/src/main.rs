//! mosaic-browse: headless gallery browser
//!
//! Walks one or more gallery directories, showing each in a thumbnail grid
//! fed by the background loader queue. With `--switch-after` the browser
//! moves on before a gallery finishes, which cancels the unfinished batch.

mod cli;
mod scan;
mod status;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use mosaic_core::config::{self, MosaicConfig};
use mosaic_core::gallery::{FocusChange, GalleryView};
use mosaic_core::thumbnail::{CompletionKind, ImageThumbnailer, ThumbnailQueue};

use cli::Cli;
use scan::GalleryDir;
use status::StatusLine;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("mosaic-browse starting up");

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut config: MosaicConfig = config::load_config(&config_path);
    apply_overrides(&mut config, &cli);
    log::info!(
        "Thumbnails {}x{}, {} loader units, {} columns",
        config.thumbnails.width,
        config.thumbnails.height,
        config.thumbnails.pool_size,
        config.grid.columns
    );

    let dirs = if cli.galleries.is_empty() {
        vec![config::default_pictures_path()]
    } else {
        cli.galleries.clone()
    };
    let galleries: Vec<GalleryDir> = dirs
        .iter()
        .map(|dir| scan::scan_gallery(dir, config.grid.include_subdirectories))
        .collect();

    let loader = Arc::new(ImageThumbnailer::from_config(&config.thumbnails));
    let queue = ThumbnailQueue::from_config(&config.thumbnails, loader)
        .context("Failed to start thumbnail loaders")?
        .with_progress_sink(StatusLine::new(config.debug));
    let mut view = GalleryView::new(queue, config.grid.columns);

    for (index, gallery) in galleries.iter().enumerate() {
        let is_last = index + 1 == galleries.len();
        let switch_after = if is_last { None } else { cli.switch_after };
        browse(&mut view, gallery, switch_after, cli.out.as_deref(), config.debug)?;
    }

    log::info!("mosaic-browse done");
    Ok(())
}

fn apply_overrides(config: &mut MosaicConfig, cli: &Cli) {
    if let Some(pool_size) = cli.pool_size {
        config.thumbnails.pool_size = pool_size;
    }
    if let Some(size) = cli.size {
        config.thumbnails.width = size.width;
        config.thumbnails.height = size.height;
    }
    if let Some(columns) = cli.columns {
        config.grid.columns = columns;
    }
    if cli.debug {
        config.debug = true;
    }
}

/// Show one gallery until it finishes loading or `switch_after` thumbnails arrived
fn browse(
    view: &mut GalleryView,
    gallery: &GalleryDir,
    switch_after: Option<u64>,
    out: Option<&Path>,
    debug: bool,
) -> Result<()> {
    match view.set_focus(&gallery.name, gallery.images.clone()) {
        FocusChange::Unchanged => return Ok(()),
        FocusChange::Empty => {
            println!("{}: no images", gallery.name);
            return Ok(());
        }
        FocusChange::Loading { .. } => {}
    }

    let started = Instant::now();
    let mut arrived = 0u64;
    while view.is_loading() {
        if let Some(limit) = switch_after {
            if arrived >= limit {
                log::info!(
                    "Switching away from \"{}\" after {} thumbnails",
                    gallery.name,
                    arrived
                );
                break;
            }
        }
        match view.queue_mut().wait_for_completion(POLL_INTERVAL) {
            Some(CompletionKind::Loaded) | Some(CompletionKind::Failed) => arrived += 1,
            Some(CompletionKind::Discarded) | None => {}
        }
    }

    let loaded = view.cells().iter().filter(|cell| cell.is_loaded()).count();
    log::info!(
        "[PERF] Gallery \"{}\": {}/{} thumbnails in {:?} (average {:?})",
        gallery.name,
        loaded,
        view.cells().len(),
        started.elapsed(),
        view.queue().average_load_time()
    );

    print_grid(view, &gallery.name, debug);
    if let Some(out) = out {
        write_thumbnails(view, &out.join(&gallery.name))?;
    }
    Ok(())
}

fn print_grid(view: &GalleryView, name: &str, debug: bool) {
    println!("{} ({} images)", name, view.cells().len());
    for row in view.rows() {
        let line: Vec<String> = row
            .iter()
            .map(|cell| {
                let mark = match cell.thumbnail() {
                    Some(thumbnail) => format!("[{}x{}]", thumbnail.width(), thumbnail.height()),
                    None if cell.is_pending() => "[...]".to_string(),
                    None => "[ x ]".to_string(),
                };
                let label = cell.label(debug);
                if label.is_empty() {
                    mark
                } else {
                    format!("{} {}", mark, label)
                }
            })
            .collect();
        println!("  {}", line.join("  "));
    }
}

fn write_thumbnails(view: &GalleryView, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let mut written = 0;
    for cell in view.cells() {
        let Some(thumbnail) = cell.thumbnail() else {
            continue;
        };
        let stem = thumbnail
            .source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| cell.index().to_string());
        let path = dir.join(format!("{:04}_{}.png", cell.index(), stem));
        thumbnail
            .image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write thumbnail {:?}", path))?;
        written += 1;
    }

    log::info!("Wrote {} thumbnails to {:?}", written, dir);
    Ok(())
}
