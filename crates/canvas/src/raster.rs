//! Rasterization of strokes into a working-resolution intensity buffer
//! and block downsampling into the fixed 28x28 classification grid.
//!
//! The raster buffer is a pure cache of the draw model: it is recomputed
//! lazily whenever the model revision changes and never mutated on its
//! own. Rasterization is fully deterministic - identical drawing state
//! always yields a bit-identical intensity vector.

use glam::Vec2;
use thiserror::Error;
use tracing::debug;

use scrawl_config::{CanvasConfig, GRID_AREA, GRID_SIDE};

use crate::model::DrawModel;
use crate::types::Point;

/// Errors raised by the rasterization pipeline
///
/// A malformed intensity vector is a programming error in the caller,
/// not a runtime condition classifiers are expected to handle.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Intensity vector has {got} values, expected {GRID_AREA}")]
    BadLength { got: usize },

    #[error("Intensity value {value} at index {index} outside [0, 1]")]
    OutOfRange { index: usize, value: f32 },
}

/// Working-resolution grayscale intensity buffer
///
/// Intensities are stored row-major as f32 in [0.0, 1.0], 0.0 being
/// background and 1.0 full ink.
pub struct RasterBuffer {
    size: u32,
    pixels: Vec<f32>,
}

impl RasterBuffer {
    /// Create a buffer of the given square side length, all background
    pub fn new(size: u32) -> Self {
        Self {
            size,
            pixels: vec![0.0; (size as usize) * (size as usize)],
        }
    }

    /// Side length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Intensity at the given coordinates, or None if out of bounds
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.size as usize) + (x as usize)])
    }

    /// Raise the intensity at the given coordinates to at least `value`
    ///
    /// Overlapping stamps combine by max, which keeps repeated passes
    /// over the same pixel order-independent.
    #[inline]
    pub fn blend_max(&mut self, x: u32, y: u32, value: f32) {
        if x >= self.size || y >= self.size {
            return;
        }
        let index = (y as usize) * (self.size as usize) + (x as usize);
        if value > self.pixels[index] {
            self.pixels[index] = value;
        }
    }

    /// Raw intensity data in row-major order
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }
}

/// Fixed-length normalized intensity grid, the sole artifact crossing
/// into classification
///
/// Always exactly [`GRID_AREA`] values in [0.0, 1.0], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityVector {
    values: Vec<f32>,
}

impl IntensityVector {
    /// Validate and wrap a raw value buffer
    pub fn new(values: Vec<f32>) -> Result<Self, RasterError> {
        if values.len() != GRID_AREA {
            return Err(RasterError::BadLength { got: values.len() });
        }
        for (index, &value) in values.iter().enumerate() {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(RasterError::OutOfRange { index, value });
            }
        }
        Ok(Self { values })
    }

    /// All intensities in row-major order
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Intensity of the cell at grid coordinates (col, row)
    pub fn cell(&self, col: usize, row: usize) -> f32 {
        self.values[row * GRID_SIDE + col]
    }

    /// Whether every cell is background
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

/// Rasterizer caching the last raster buffer, keyed on the model
/// identity and revision
pub struct Rasterizer {
    config: CanvasConfig,
    cached: Option<((u64, u64), RasterBuffer)>,
}

impl Rasterizer {
    /// Create a rasterizer for the given canvas configuration
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            cached: None,
        }
    }

    /// Canvas configuration in use
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Rasterize the draw model, reusing the cached buffer when the
    /// same model is passed at an unchanged revision
    pub fn rasterize(&mut self, model: &DrawModel) -> &RasterBuffer {
        let key = (model.id(), model.revision());
        let stale = !matches!(&self.cached, Some((cached, _)) if *cached == key);

        if stale {
            debug!("rasterize: recomputing buffer at revision {}", key.1);
            let mut buffer = RasterBuffer::new(self.config.surface_size);
            let half_width = self.config.stroke_width / 2.0;
            for stroke in model.iter_all() {
                let points = stroke.points();
                if points.len() == 1 {
                    stamp_segment(&mut buffer, points[0], points[0], half_width);
                }
                for (a, b) in stroke.segments() {
                    stamp_segment(&mut buffer, a, b, half_width);
                }
            }
            self.cached = Some((key, buffer));
        }

        match &self.cached {
            Some((_, buffer)) => buffer,
            None => unreachable!("cache is populated above"),
        }
    }

    /// Downsample the current raster into the 28x28 intensity vector
    ///
    /// Each output cell is the mean intensity of its block of
    /// working-resolution pixels, so values stay in [0.0, 1.0].
    pub fn downsample(&mut self, model: &DrawModel) -> Result<IntensityVector, RasterError> {
        let block = self.config.block_size();
        let buffer = self.rasterize(model);

        let mut values = Vec::with_capacity(GRID_AREA);
        let samples_per_cell = (block * block) as f32;
        for row in 0..GRID_SIDE as u32 {
            for col in 0..GRID_SIDE as u32 {
                let mut sum = 0.0f32;
                for py in (row * block)..((row + 1) * block) {
                    for px in (col * block)..((col + 1) * block) {
                        sum += buffer.get(px, py).unwrap_or(0.0);
                    }
                }
                values.push(sum / samples_per_cell);
            }
        }

        IntensityVector::new(values)
    }
}

/// Stamp one anti-aliased line segment into the buffer
///
/// Coverage per pixel comes from the distance of the pixel center to the
/// segment: full ink inside the stroke, a one-pixel linear ramp at the
/// edge. A degenerate segment (a == b) stamps a dot.
fn stamp_segment(buffer: &mut RasterBuffer, a: Point, b: Point, half_width: f32) {
    let a: Vec2 = a.into();
    let b: Vec2 = b.into();
    let reach = half_width + 0.5;

    let min = a.min(b) - Vec2::splat(reach);
    let max = a.max(b) + Vec2::splat(reach);

    let x_min = min.x.floor().max(0.0) as u32;
    let y_min = min.y.floor().max(0.0) as u32;
    let x_max = (max.x.ceil().max(0.0) as u32).min(buffer.size());
    let y_max = (max.y.ceil().max(0.0) as u32).min(buffer.size());

    let ab = b - a;
    let ab_len_sq = ab.length_squared();

    for py in y_min..y_max {
        for px in x_min..x_max {
            let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            let distance = if ab_len_sq <= f32::EPSILON {
                (p - a).length()
            } else {
                let t = ((p - a).dot(ab) / ab_len_sq).clamp(0.0, 1.0);
                (p - (a + ab * t)).length()
            };
            let coverage = (half_width + 0.5 - distance).clamp(0.0, 1.0);
            if coverage > 0.0 {
                buffer.blend_max(px, py, coverage);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_line(model: &mut DrawModel, from: (f32, f32), to: (f32, f32)) {
        model.begin_stroke(Point::new(from.0, from.1));
        model.extend_stroke(Point::new(to.0, to.1));
        model.end_stroke();
    }

    #[test]
    fn test_determinism() {
        let mut model = DrawModel::new();
        draw_line(&mut model, (30.0, 40.0), (200.0, 180.0));
        draw_line(&mut model, (100.0, 20.0), (100.0, 250.0));

        let mut first = Rasterizer::new(CanvasConfig::default());
        let mut second = Rasterizer::new(CanvasConfig::default());
        let a = first.downsample(&model).unwrap();
        let b = second.downsample(&model).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());

        // Repeated calls against unchanged state are also bit-identical
        let c = first.downsample(&model).unwrap();
        assert_eq!(a.as_slice(), c.as_slice());
    }

    #[test]
    fn test_blank_model_yields_blank_vector() {
        let model = DrawModel::new();
        let mut rasterizer = Rasterizer::new(CanvasConfig::default());
        let vector = rasterizer.downsample(&model).unwrap();
        assert!(vector.is_blank());
        assert_eq!(vector.as_slice().len(), GRID_AREA);
    }

    #[test]
    fn test_downsample_boundary_single_block() {
        // Default config: 280px surface, 10px blocks. A dot in the
        // middle of block (3, 5) with a narrow stroke must light up
        // exactly that cell.
        let config = CanvasConfig::new(280, 4.0);
        let mut model = DrawModel::new();
        model.begin_stroke(Point::new(35.0, 55.0));
        model.end_stroke();

        let mut rasterizer = Rasterizer::new(config);
        let vector = rasterizer.downsample(&model).unwrap();

        let mut lit = Vec::new();
        for row in 0..GRID_SIDE {
            for col in 0..GRID_SIDE {
                if vector.cell(col, row) > 0.0 {
                    lit.push((col, row));
                }
            }
        }
        assert_eq!(lit, vec![(3, 5)]);
    }

    #[test]
    fn test_cache_invalidated_by_model_mutation() {
        let mut model = DrawModel::new();
        let mut rasterizer = Rasterizer::new(CanvasConfig::default());

        let blank = rasterizer.downsample(&model).unwrap();
        assert!(blank.is_blank());

        draw_line(&mut model, (50.0, 50.0), (220.0, 220.0));
        let drawn = rasterizer.downsample(&model).unwrap();
        assert!(!drawn.is_blank());
    }

    #[test]
    fn test_cache_distinguishes_models_with_equal_revisions() {
        // Two models mutated the same number of times share a revision;
        // the cache must still tell them apart.
        let mut horizontal = DrawModel::new();
        draw_line(&mut horizontal, (20.0, 140.0), (260.0, 140.0));
        let mut vertical = DrawModel::new();
        draw_line(&mut vertical, (140.0, 20.0), (140.0, 260.0));
        assert_eq!(horizontal.revision(), vertical.revision());

        let mut rasterizer = Rasterizer::new(CanvasConfig::default());
        let first = rasterizer.downsample(&horizontal).unwrap();
        let second = rasterizer.downsample(&vertical).unwrap();
        assert_ne!(first.as_slice(), second.as_slice());
    }

    #[test]
    fn test_raster_pixels_stay_in_range() {
        let mut model = DrawModel::new();
        draw_line(&mut model, (30.0, 30.0), (250.0, 250.0));

        let mut rasterizer = Rasterizer::new(CanvasConfig::default());
        let buffer = rasterizer.rasterize(&model);
        assert_eq!(buffer.pixels().len(), 280 * 280);
        assert!(buffer.pixels().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(buffer.pixels().iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_in_progress_stroke_is_rasterized() {
        let mut model = DrawModel::new();
        model.begin_stroke(Point::new(140.0, 20.0));
        model.extend_stroke(Point::new(140.0, 260.0));

        let mut rasterizer = Rasterizer::new(CanvasConfig::default());
        let vector = rasterizer.downsample(&model).unwrap();
        assert!(!vector.is_blank());
    }

    #[test]
    fn test_off_surface_points_are_clipped() {
        let mut model = DrawModel::new();
        draw_line(&mut model, (-100.0, -100.0), (-50.0, -50.0));

        let mut rasterizer = Rasterizer::new(CanvasConfig::default());
        let vector = rasterizer.downsample(&model).unwrap();
        assert!(vector.is_blank());
    }

    #[test]
    fn test_malformed_vector_rejected() {
        assert!(matches!(
            IntensityVector::new(vec![0.0; 10]),
            Err(RasterError::BadLength { got: 10 })
        ));

        let mut values = vec![0.0; GRID_AREA];
        values[7] = 1.5;
        assert!(matches!(
            IntensityVector::new(values),
            Err(RasterError::OutOfRange { index: 7, .. })
        ));

        let mut values = vec![0.0; GRID_AREA];
        values[3] = f32::NAN;
        assert!(IntensityVector::new(values).is_err());
    }

    #[test]
    fn test_intensity_stays_normalized() {
        // Heavy overdraw must not push any cell above 1.0
        let mut model = DrawModel::new();
        for _ in 0..5 {
            draw_line(&mut model, (140.0, 140.0), (141.0, 141.0));
        }
        let mut rasterizer = Rasterizer::new(CanvasConfig::new(280, 40.0));
        let vector = rasterizer.downsample(&model).unwrap();
        assert!(vector.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
