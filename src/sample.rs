//! Canonical sample raster format.
//!
//! Every stored drawing is a 50×50 single-channel grayscale image. Finished
//! canvas rasters arrive as RGB at canvas resolution and are downscaled and
//! desaturated here; the flattened form feeds the classifier with pixels
//! centered to `[-0.5, 0.5]` so an all-black drawing is not a zero vector.

use image::{DynamicImage, GrayImage, RgbImage, imageops::FilterType};

/// Side length of the canonical square sample.
pub const SAMPLE_SIDE: u32 = 50;

/// Flattened length of one canonical sample.
pub const SAMPLE_LEN: usize = (SAMPLE_SIDE * SAMPLE_SIDE) as usize;

/// Downscale and desaturate a finished canvas raster to the sample format.
pub fn canonicalize(image: &RgbImage) -> GrayImage {
    DynamicImage::ImageRgb8(image.clone())
        .resize_exact(SAMPLE_SIDE, SAMPLE_SIDE, FilterType::Triangle)
        .to_luma8()
}

/// Flatten a canonical grayscale sample into classifier input.
///
/// Pixels map to `[-0.5, 0.5]` with mid-gray at zero. Black pixels must
/// carry weight-reachable signal, otherwise a black-on-white drawing only
/// trains the bias and the learned boundary collapses toward black.
pub fn flatten(image: &GrayImage) -> Vec<f32> {
    image
        .as_raw()
        .iter()
        .map(|&px| f32::from(px) / 255.0 - 0.5)
        .collect()
}

/// Whether a grayscale image already has the canonical dimensions.
pub fn is_canonical(image: &GrayImage) -> bool {
    image.width() == SAMPLE_SIDE && image.height() == SAMPLE_SIDE
}
