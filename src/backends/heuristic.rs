//! Heuristic backend wrapping the corner-colour cutout

use crate::{
    config::{CutoutConfig, SegmenterVariant},
    cutout::cutout_rgba,
    error::Result,
    inference::{BackendOutput, SegmentationBackend},
};
use image::RgbaImage;
use tracing::trace;

/// Backend running [`cutout_rgba`] with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct HeuristicBackend {
    config: CutoutConfig,
}

impl HeuristicBackend {
    /// Create a backend with a validated cutout configuration
    ///
    /// # Errors
    /// - Invalid threshold or patch size
    pub fn new(config: CutoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration used by this backend
    #[must_use]
    pub fn config(&self) -> &CutoutConfig {
        &self.config
    }
}

impl SegmentationBackend for HeuristicBackend {
    fn variant(&self) -> SegmenterVariant {
        SegmenterVariant::Heuristic
    }

    fn segment(&self, image: &RgbaImage) -> Result<BackendOutput> {
        trace!(
            width = image.width(),
            height = image.height(),
            threshold = self.config.threshold,
            "Running heuristic cutout"
        );
        let output = cutout_rgba(image, &self.config)?;
        Ok(BackendOutput {
            image: output.image,
            background_color: Some(output.background_color),
            threshold: Some(self.config.threshold),
        })
    }
}
