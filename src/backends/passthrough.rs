//! Placeholder pass-through backend
//!
//! Normalises the input to RGBA and returns it unchanged. When a
//! [`MaskModel`] is injected, its predicted mask replaces the alpha channel;
//! this is where a real segmentation model slots in.

use crate::{
    config::SegmenterVariant,
    error::Result,
    inference::{BackendOutput, MaskModel, SegmentationBackend},
};
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;
use tracing::debug;

/// Convert any image to RGBA without altering its pixels
///
/// Images without an alpha channel gain a uniformly opaque one.
#[must_use]
pub fn passthrough(image: &DynamicImage) -> RgbaImage {
    image.to_rgba8()
}

/// Identity backend with an optional mask model
#[derive(Clone, Default)]
pub struct PassthroughBackend {
    model: Option<Arc<dyn MaskModel>>,
}

impl PassthroughBackend {
    /// Pure identity backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that applies the masks predicted by `model`
    #[must_use]
    pub fn with_model(model: Arc<dyn MaskModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Name of the injected model, if any
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|model| model.name())
    }
}

impl std::fmt::Debug for PassthroughBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassthroughBackend")
            .field("model", &self.model_name())
            .finish()
    }
}

impl SegmentationBackend for PassthroughBackend {
    fn variant(&self) -> SegmenterVariant {
        SegmenterVariant::Passthrough
    }

    fn segment(&self, image: &RgbaImage) -> Result<BackendOutput> {
        let mut output = image.clone();
        if let Some(model) = &self.model {
            let mask = model.predict_mask(image)?;
            let stats = mask.statistics();
            debug!(
                model = model.name(),
                foreground_pixels = stats.foreground_pixels,
                foreground_ratio = stats.foreground_ratio,
                "Applying predicted mask"
            );
            mask.apply_to_image(&mut output)?;
        }
        Ok(BackendOutput::image_only(output))
    }
}
