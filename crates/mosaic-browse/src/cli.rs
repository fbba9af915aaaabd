use std::path::PathBuf;

use clap::Parser;
use mosaic_core::ThumbnailSize;

#[derive(Parser, Debug)]
#[command(
    name = "mosaic-browse",
    version,
    about = "Browse image galleries, loading thumbnails in the background"
)]
pub struct Cli {
    /// Gallery directories, shown one after another (default: ~/Pictures)
    pub galleries: Vec<PathBuf>,

    /// Config file (default: ~/.config/mosaic/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of loader units
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Thumbnail box, `WIDTHxHEIGHT` or a single edge length
    #[arg(long, value_parser = parse_size)]
    pub size: Option<ThumbnailSize>,

    /// Grid columns
    #[arg(long)]
    pub columns: Option<usize>,

    /// Switch to the next gallery after this many thumbnails, even mid-batch
    #[arg(long, value_name = "N")]
    pub switch_after: Option<u64>,

    /// Write loaded thumbnails as PNG under this directory
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Show average load times and cell labels
    #[arg(long)]
    pub debug: bool,
}

pub fn parse_size(value: &str) -> Result<ThumbnailSize, String> {
    let parse_edge = |edge: &str| -> Result<u32, String> {
        match edge.trim().parse::<u32>() {
            Ok(0) => Err("thumbnail edge must be at least 1".to_string()),
            Ok(n) => Ok(n),
            Err(e) => Err(format!("invalid thumbnail edge {:?}: {}", edge, e)),
        }
    };

    match value.split_once(['x', 'X']) {
        Some((width, height)) => Ok(ThumbnailSize::new(parse_edge(width)?, parse_edge(height)?)),
        None => Ok(ThumbnailSize::square(parse_edge(value)?)),
    }
}
