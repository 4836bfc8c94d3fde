//! Grayscale PNG export of raster data, for debugging the pipeline

use image::GrayImage;

use scrawl_config::GRID_SIDE;

use crate::raster::{IntensityVector, RasterBuffer};

/// Render the working-resolution buffer as an 8-bit grayscale image
pub fn raster_to_image(buffer: &RasterBuffer) -> GrayImage {
    let size = buffer.size();
    GrayImage::from_fn(size, size, |x, y| {
        let intensity = buffer.get(x, y).unwrap_or(0.0);
        image::Luma([(intensity * 255.0).round() as u8])
    })
}

/// Render the 28x28 intensity vector as an 8-bit grayscale image
pub fn vector_to_image(vector: &IntensityVector) -> GrayImage {
    let side = GRID_SIDE as u32;
    GrayImage::from_fn(side, side, |x, y| {
        let intensity = vector.cell(x as usize, y as usize);
        image::Luma([(intensity * 255.0).round() as u8])
    })
}
