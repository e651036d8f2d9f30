//! Configuration types for segmentation operations

use crate::error::{Result, SegmentError};
use serde::{Deserialize, Serialize};

/// Default colour distance below which a pixel counts as background
pub const DEFAULT_THRESHOLD: f32 = 30.0;

/// Default side length of the square corner patches
pub const DEFAULT_PATCH_SIZE: u32 = 10;

/// Segmentation variant selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SegmenterVariant {
    /// Corner-colour sampling with distance thresholding
    Heuristic,
    /// RGBA normalisation only, reserved for a real mask model
    #[serde(alias = "placeholder")]
    Passthrough,
}

impl Default for SegmenterVariant {
    fn default() -> Self {
        Self::Heuristic
    }
}

impl SegmenterVariant {
    /// Lowercase name used in logs, headers and query strings
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::Passthrough => "passthrough",
        }
    }
}

impl std::fmt::Display for SegmenterVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SegmenterVariant {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "passthrough" | "placeholder" => Ok(Self::Passthrough),
            other => Err(SegmentError::invalid_config(format!(
                "Unknown segmenter variant '{}' (expected 'heuristic' or 'passthrough')",
                other
            ))),
        }
    }
}

/// Parameters of the heuristic background cutout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoutConfig {
    /// Euclidean RGB distance below which a pixel becomes transparent
    pub threshold: f32,
    /// Side length of each corner patch
    pub patch_size: u32,
}

impl Default for CutoutConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            patch_size: DEFAULT_PATCH_SIZE,
        }
    }
}

impl CutoutConfig {
    /// Create a configuration with the given threshold and the default patch size
    #[must_use]
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Validate the cutout parameters
    ///
    /// # Errors
    /// - Threshold is NaN, infinite or negative
    /// - Patch size is zero
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(SegmentError::config_value_error(
                "threshold",
                self.threshold,
                "finite, >= 0",
            ));
        }
        if self.patch_size == 0 {
            return Err(SegmentError::config_value_error(
                "patch size",
                self.patch_size,
                ">= 1",
            ));
        }
        Ok(())
    }
}

/// Complete segmenter configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Which backend to run
    pub variant: SegmenterVariant,
    /// Heuristic parameters (ignored by the pass-through variant)
    pub cutout: CutoutConfig,
}

impl SegmenterConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> SegmenterConfigBuilder {
        SegmenterConfigBuilder::new()
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    /// - Invalid cutout parameters
    pub fn validate(&self) -> Result<()> {
        self.cutout.validate()
    }
}

/// Builder for `SegmenterConfig`
#[derive(Debug, Default)]
pub struct SegmenterConfigBuilder {
    config: SegmenterConfig,
}

impl SegmenterConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn variant(mut self, variant: SegmenterVariant) -> Self {
        self.config.variant = variant;
        self
    }

    #[must_use]
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.config.cutout.threshold = threshold;
        self
    }

    #[must_use]
    pub fn patch_size(mut self, patch_size: u32) -> Self {
        self.config.cutout.patch_size = patch_size;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Configuration validation failures
    pub fn build(self) -> Result<SegmenterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
