//! Raster rendering module
//!
//! This module contains:
//! - The compositor that flattens the photo layers into one image
//! - Overlay drawing for guides, grid and annotations

pub mod compositor;
pub mod overlay;

pub use compositor::{compose, BlendMode, ComposeOptions};
