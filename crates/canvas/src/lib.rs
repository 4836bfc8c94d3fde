//! Scrawl canvas - stroke capture and rasterization
//!
//! This crate provides the drawing half of the pipeline:
//! - [`types`] - Point and Stroke data structures
//! - [`model`] - The draw model owning completed and in-progress strokes
//! - [`input`] - Pointer event state machine feeding the draw model
//! - [`raster`] - Working-resolution rasterizer and 28x28 downsampling
//! - [`export`] - Grayscale PNG export for debugging
//!
//! The canvas is driven from a single owner thread; nothing in this
//! crate is safe for concurrent mutation.

pub mod export;
pub mod input;
pub mod model;
pub mod raster;
pub mod types;

pub use input::*;
pub use model::*;
pub use raster::*;
pub use types::*;
