//! Shared configuration for Scrawl
//!
//! This crate provides the single source of truth for the drawing surface
//! dimensions, the classification grid size, and the stroke rendering
//! parameters shared between the canvas and recognition crates.

use serde::{Deserialize, Serialize};

/// Side length of the classification grid (output cells per axis)
pub const GRID_SIDE: usize = 28;

/// Total number of cells in the classification grid
pub const GRID_AREA: usize = GRID_SIDE * GRID_SIDE;

/// Default working-resolution surface side length in pixels
pub const DEFAULT_SURFACE_SIZE: u32 = 280;

/// Default stroke width in working-resolution pixels
pub const DEFAULT_STROKE_WIDTH: f32 = 16.0;

/// Canvas configuration for stroke capture and rasterization
///
/// The surface is always square and its side length is always a whole
/// multiple of [`GRID_SIDE`], so every output cell maps to an integral
/// block of working-resolution pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Working-resolution side length in pixels (multiple of [`GRID_SIDE`])
    pub surface_size: u32,
    /// Stroke width in working-resolution pixels
    pub stroke_width: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            surface_size: DEFAULT_SURFACE_SIZE,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl CanvasConfig {
    /// Create a new canvas config with the given surface size
    ///
    /// The surface size is rounded up to the next multiple of
    /// [`GRID_SIDE`] so block downsampling stays exact.
    pub fn new(surface_size: u32, stroke_width: f32) -> Self {
        let side = GRID_SIDE as u32;
        let rounded = surface_size.div_ceil(side).max(1) * side;
        Self {
            surface_size: rounded,
            stroke_width: stroke_width.max(1.0),
        }
    }

    /// Side length of one downsampling block in working-resolution pixels
    pub fn block_size(&self) -> u32 {
        self.surface_size / GRID_SIDE as u32
    }

    /// Surface size as f32 for coordinate calculations
    pub fn surface_size_f32(&self) -> f32 {
        self.surface_size as f32
    }
}
