//! Heuristic background cutout
//!
//! Estimates the background colour from four square corner patches and makes
//! every pixel whose RGB colour lies within a Euclidean distance threshold of
//! that colour fully transparent. Colour channels are never touched; only
//! alpha is set to zero for qualifying pixels.
//!
//! Corner patches are taken positionally. When a side is shorter than twice
//! the patch size the patches overlap and the shared pixels are sampled more
//! than once, which weights the estimate toward the overlap region.

use crate::{
    config::{CutoutConfig, DEFAULT_PATCH_SIZE},
    error::{Result, SegmentError},
};
use image::{DynamicImage, RgbaImage};
use log::debug;
use ndarray::{s, Array2, ArrayView3, Axis};

/// Output of the heuristic cutout
#[derive(Debug, Clone)]
pub struct CutoutOutput {
    /// RGBA image with background pixels made transparent
    pub image: RgbaImage,
    /// Mean RGB colour of the sampled corner patches
    pub background_color: [f32; 3],
}

/// Cut out the background of `image` using the default patch size
///
/// The input is normalised to RGBA first; images without alpha become fully
/// opaque before thresholding.
///
/// # Errors
/// - `DimensionTooSmall` when either side is shorter than the patch size
/// - `InvalidConfig` when `threshold` is negative or not finite
pub fn cutout(image: &DynamicImage, threshold: f32) -> Result<RgbaImage> {
    let config = CutoutConfig {
        threshold,
        patch_size: DEFAULT_PATCH_SIZE,
    };
    cutout_with_config(image, &config)
}

/// Cut out the background of `image` with explicit parameters
///
/// # Errors
/// - `DimensionTooSmall` when either side is shorter than `config.patch_size`
/// - `InvalidConfig` for invalid cutout parameters
pub fn cutout_with_config(image: &DynamicImage, config: &CutoutConfig) -> Result<RgbaImage> {
    cutout_rgba(&image.to_rgba8(), config).map(|output| output.image)
}

/// Cut out the background of an already normalised RGBA image
///
/// # Errors
/// - `DimensionTooSmall` when either side is shorter than the patch size
/// - `InvalidConfig` for invalid cutout parameters
pub fn cutout_rgba(image: &RgbaImage, config: &CutoutConfig) -> Result<CutoutOutput> {
    config.validate()?;

    let background_color = background_reference_color(image, config.patch_size)?;
    let [bg_r, bg_g, bg_b] = background_color;
    debug!(
        "Background reference colour ({:.2}, {:.2}, {:.2}), threshold {}",
        bg_r, bg_g, bg_b, config.threshold
    );

    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let dr = f32::from(r) - bg_r;
        let dg = f32::from(g) - bg_g;
        let db = f32::from(b) - bg_b;
        let distance = (dr * dr + dg * dg + db * db).sqrt();
        if distance < config.threshold {
            pixel.0[3] = 0;
        }
    }

    Ok(CutoutOutput {
        image: output,
        background_color,
    })
}

/// Mean RGB colour over the four `patch` x `patch` corner regions
///
/// # Errors
/// - `DimensionTooSmall` when either side is shorter than `patch`
/// - `InvalidConfig` when `patch` is zero
pub fn background_reference_color(image: &RgbaImage, patch: u32) -> Result<[f32; 3]> {
    if patch == 0 {
        return Err(SegmentError::config_value_error("patch size", patch, ">= 1"));
    }

    let (width, height) = image.dimensions();
    if width < patch || height < patch {
        return Err(SegmentError::dimension_too_small(width, height, patch));
    }

    let pixels = ArrayView3::from_shape(
        (height as usize, width as usize, 4),
        image.as_raw().as_slice(),
    )
    .map_err(|e| SegmentError::internal(format!("RGBA buffer has unexpected shape: {}", e)))?;

    let (w, h, p) = (width as usize, height as usize, patch as usize);
    let corners = [
        pixels.slice(s![0..p, 0..p, 0..3]),
        pixels.slice(s![0..p, w - p..w, 0..3]),
        pixels.slice(s![h - p..h, 0..p, 0..3]),
        pixels.slice(s![h - p..h, w - p..w, 0..3]),
    ];

    let samples = corners
        .iter()
        .map(|corner| corner.mapv(f64::from).into_shape_with_order((p * p, 3)))
        .collect::<std::result::Result<Vec<Array2<f64>>, _>>()
        .map_err(|e| SegmentError::internal(format!("Failed to flatten corner patch: {}", e)))?;
    let views: Vec<_> = samples.iter().map(Array2::view).collect();
    let pool = ndarray::concatenate(Axis(0), &views)
        .map_err(|e| SegmentError::internal(format!("Failed to pool corner samples: {}", e)))?;

    let mean = pool
        .mean_axis(Axis(0))
        .ok_or_else(|| SegmentError::internal("Corner sample pool is empty"))?;

    match mean.as_slice() {
        Some(&[r, g, b]) => Ok([r as f32, g as f32, b as f32]),
        _ => Err(SegmentError::internal(
            "Corner sample mean does not have three channels",
        )),
    }
}

/// Number of fully transparent pixels in an RGBA image
#[must_use]
pub fn count_transparent(image: &RgbaImage) -> usize {
    image.pixels().filter(|pixel| pixel.0[3] == 0).count()
}
