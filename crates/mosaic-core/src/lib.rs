//! Mosaic Core - background thumbnail loading for the mosaic gallery browser

pub mod config;
pub mod gallery;
pub mod thumbnail;
pub mod types;

pub use types::*;
