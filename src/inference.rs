//! Segmentation backend abstraction
//!
//! Every variant runs behind [`SegmentationBackend`]. A real segmentation
//! model plugs in through [`MaskModel`], owned by the backend that uses it
//! rather than held in process-wide state.

use crate::{config::SegmenterVariant, error::Result, types::SegmentationMask};
use image::RgbaImage;

/// Output of a single backend invocation
#[derive(Debug, Clone)]
pub struct BackendOutput {
    /// Output bitmap, same dimensions as the input
    pub image: RgbaImage,
    /// Background reference colour, when the backend estimates one
    pub background_color: Option<[f32; 3]>,
    /// Threshold applied, when the backend thresholds
    pub threshold: Option<f32>,
}

impl BackendOutput {
    /// Output that carries only an image
    #[must_use]
    pub fn image_only(image: RgbaImage) -> Self {
        Self {
            image,
            background_color: None,
            threshold: None,
        }
    }
}

/// Trait for segmentation backends
///
/// Implementations must be stateless per call: the same input always yields
/// the same output and nothing is shared between invocations.
pub trait SegmentationBackend: Send + Sync {
    /// Variant implemented by this backend
    fn variant(&self) -> SegmenterVariant;

    /// Segment an RGBA image
    ///
    /// # Errors
    /// - `DimensionTooSmall` when the image cannot be sampled
    /// - `Model` when an injected model fails
    fn segment(&self, image: &RgbaImage) -> Result<BackendOutput>;
}

/// Trait for models that predict a foreground alpha mask
pub trait MaskModel: Send + Sync {
    /// Human-readable model name for logs
    fn name(&self) -> &str;

    /// Predict an alpha mask with the same dimensions as `image`
    ///
    /// # Errors
    /// - Model inference failures
    fn predict_mask(&self, image: &RgbaImage) -> Result<SegmentationMask>;
}
