//! Unified segmentation processor
//!
//! This module provides the `SegmentationProcessor` that owns the decode →
//! RGBA normalisation → backend → metadata flow. The HTTP server and the CLI
//! both go through it.

use crate::{
    backends::{HeuristicBackend, PassthroughBackend},
    config::{CutoutConfig, SegmenterConfig, SegmenterVariant},
    cutout::count_transparent,
    error::{Result, SegmentError},
    inference::{BackendOutput, SegmentationBackend},
    services::ImageIOService,
    types::{ProcessingMetadata, ProcessingTimings, SegmentationResult},
};
use image::{DynamicImage, GenericImageView, RgbaImage};
use instant::Instant;
use log::debug;
use std::path::Path;
use tracing::{info, instrument};

/// Factory trait for creating segmentation backends
pub trait BackendFactory: Send + Sync {
    /// Create a backend for the variant selected in `config`
    ///
    /// # Errors
    /// - Unsupported variants
    /// - Invalid backend configuration
    fn create_backend(&self, config: &SegmenterConfig) -> Result<Box<dyn SegmentationBackend>>;

    /// List variants this factory can build
    fn available_variants(&self) -> Vec<SegmenterVariant>;
}

/// Default backend factory implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBackendFactory;

impl BackendFactory for DefaultBackendFactory {
    fn create_backend(&self, config: &SegmenterConfig) -> Result<Box<dyn SegmentationBackend>> {
        match config.variant {
            SegmenterVariant::Heuristic => Ok(Box::new(HeuristicBackend::new(config.cutout)?)),
            SegmenterVariant::Passthrough => Ok(Box::new(PassthroughBackend::new())),
        }
    }

    fn available_variants(&self) -> Vec<SegmenterVariant> {
        vec![SegmenterVariant::Heuristic, SegmenterVariant::Passthrough]
    }
}

/// Processor that runs one configured backend over decoded images
pub struct SegmentationProcessor {
    config: SegmenterConfig,
    backend: Box<dyn SegmentationBackend>,
}

impl std::fmt::Debug for SegmentationProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationProcessor")
            .field("config", &self.config)
            .field("backend", &self.backend.variant())
            .finish()
    }
}

impl SegmentationProcessor {
    /// Create a processor with the default backend factory
    ///
    /// # Errors
    /// - Invalid configuration
    pub fn new(config: SegmenterConfig) -> Result<Self> {
        Self::with_factory(config, &DefaultBackendFactory)
    }

    /// Create a processor whose backend is built by `factory`
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Backend creation failures
    pub fn with_factory(config: SegmenterConfig, factory: &dyn BackendFactory) -> Result<Self> {
        config.validate()?;
        let backend = factory.create_backend(&config)?;
        Ok(Self { config, backend })
    }

    /// Create a processor around an already constructed backend
    ///
    /// The configuration's variant is replaced by the backend's own.
    ///
    /// # Errors
    /// - Invalid configuration
    pub fn with_backend(
        mut config: SegmenterConfig,
        backend: Box<dyn SegmentationBackend>,
    ) -> Result<Self> {
        config.validate()?;
        config.variant = backend.variant();
        Ok(Self { config, backend })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Variant of the owned backend
    #[must_use]
    pub fn variant(&self) -> SegmenterVariant {
        self.backend.variant()
    }

    /// Decode `bytes` and segment the resulting image
    ///
    /// # Errors
    /// - `Decode` when the bytes are not an image
    /// - Any backend error
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<SegmentationResult> {
        self.process_bytes_with(bytes, None, None)
    }

    /// Decode `bytes` and segment them with per-request overrides
    ///
    /// See [`Self::process_image_with`] for the override semantics.
    ///
    /// # Errors
    /// - `Decode` when the bytes are not an image
    /// - Invalid override configuration
    /// - Any backend error
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn process_bytes_with(
        &self,
        bytes: &[u8],
        variant: Option<SegmenterVariant>,
        cutout: Option<CutoutConfig>,
    ) -> Result<SegmentationResult> {
        let decode_start = Instant::now();
        let image = ImageIOService::load_from_bytes(bytes)?;
        let decode_ms = elapsed_ms(decode_start);

        self.process_image_with(&image, variant, cutout)
            .map(|result| with_decode_time(result, decode_ms))
    }

    /// Load and segment an image file
    ///
    /// # Errors
    /// - `Io` when the file cannot be read
    /// - `Decode` when the file is not an image
    /// - Any backend error
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<SegmentationResult> {
        let path_ref = path.as_ref();
        debug!("Processing file {}", path_ref.display());

        let decode_start = Instant::now();
        let image = ImageIOService::load_image(path_ref)?;
        let decode_ms = elapsed_ms(decode_start);

        self.process_image(&image)
            .map(|result| with_decode_time(result, decode_ms))
    }

    /// Segment a decoded image with the owned backend
    ///
    /// # Errors
    /// - Any backend error
    pub fn process_image(&self, image: &DynamicImage) -> Result<SegmentationResult> {
        Self::run(image, self.variant(), |rgba| self.backend.segment(rgba))
    }

    /// Segment a decoded image with per-request overrides
    ///
    /// `variant` overrides the processor's backend; `cutout` overrides the
    /// heuristic parameters. The owned backend is kept unless the overrides
    /// change its behaviour: a different variant, or different cutout
    /// parameters for the heuristic variant. Cutout overrides are validated
    /// but otherwise ignored by the pass-through variant.
    ///
    /// # Errors
    /// - Invalid override configuration
    /// - Any backend error
    pub fn process_image_with(
        &self,
        image: &DynamicImage,
        variant: Option<SegmenterVariant>,
        cutout: Option<CutoutConfig>,
    ) -> Result<SegmentationResult> {
        let config = SegmenterConfig {
            variant: variant.unwrap_or_else(|| self.variant()),
            cutout: cutout.unwrap_or(self.config.cutout),
        };
        config.validate()?;

        if !self.needs_override_backend(&config) {
            return self.process_image(image);
        }

        tracing::debug!(variant = %config.variant, "Building backend for request overrides");
        let backend = DefaultBackendFactory.create_backend(&config)?;
        Self::run(image, config.variant, |rgba| backend.segment(rgba))
    }

    fn needs_override_backend(&self, requested: &SegmenterConfig) -> bool {
        match requested.variant {
            variant if variant != self.variant() => true,
            SegmenterVariant::Heuristic => requested.cutout != self.config.cutout,
            SegmenterVariant::Passthrough => false,
        }
    }

    fn run<F>(
        image: &DynamicImage,
        variant: SegmenterVariant,
        segment: F,
    ) -> Result<SegmentationResult>
    where
        F: FnOnce(&RgbaImage) -> Result<BackendOutput>,
    {
        let total_start = Instant::now();
        let original_dimensions = image.dimensions();

        let normalize_start = Instant::now();
        let rgba = image.to_rgba8();
        let normalize_ms = elapsed_ms(normalize_start);

        let segment_start = Instant::now();
        let output = segment(&rgba)?;
        let segment_ms = elapsed_ms(segment_start);

        if output.image.dimensions() != original_dimensions {
            return Err(SegmentError::internal(format!(
                "Backend changed dimensions from {:?} to {:?}",
                original_dimensions,
                output.image.dimensions()
            )));
        }

        let transparent_pixels = count_transparent(&output.image);
        let metadata = ProcessingMetadata {
            variant,
            threshold: output.threshold,
            background_color: output.background_color,
            transparent_pixels,
            timings: ProcessingTimings {
                decode_ms: 0,
                normalize_ms,
                segment_ms,
                total_ms: elapsed_ms(total_start),
            },
            processed_at: chrono::Utc::now(),
        };

        info!(
            %variant,
            width = original_dimensions.0,
            height = original_dimensions.1,
            transparent_pixels,
            transparent_ratio = metadata.transparent_ratio(original_dimensions),
            segment_ms,
            "Segmented image"
        );

        Ok(SegmentationResult::new(
            output.image,
            original_dimensions,
            metadata,
        ))
    }
}

fn with_decode_time(mut result: SegmentationResult, decode_ms: u64) -> SegmentationResult {
    result.metadata.timings.decode_ms = decode_ms;
    result.metadata.timings.total_ms += decode_ms;
    result
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::{FixedMaskModel, RecordingBackend};
    use std::sync::Arc;
    use image::{Rgb, RgbImage, Rgba};
    use std::io::Cursor;

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_default_factory_variants() {
        let factory = DefaultBackendFactory;
        assert_eq!(factory.available_variants().len(), 2);

        for variant in factory.available_variants() {
            let config = SegmenterConfig {
                variant,
                ..SegmenterConfig::default()
            };
            let backend = factory.create_backend(&config).unwrap();
            assert_eq!(backend.variant(), variant);
        }
    }

    #[test]
    fn test_process_bytes_heuristic() {
        let processor = SegmentationProcessor::new(SegmenterConfig::default()).unwrap();
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([200, 200, 200])));

        let result = processor.process_bytes(&png_bytes(&image)).unwrap();
        assert_eq!(result.original_dimensions, (20, 20));
        assert_eq!(result.metadata.variant, SegmenterVariant::Heuristic);
        assert_eq!(result.metadata.transparent_pixels, 400);
        assert_eq!(result.metadata.background_color, Some([200.0, 200.0, 200.0]));
        assert_eq!(result.metadata.threshold, Some(30.0));
    }

    #[test]
    fn test_process_bytes_decode_failure() {
        let processor = SegmentationProcessor::new(SegmenterConfig::default()).unwrap();
        let err = processor.process_bytes(b"garbage").unwrap_err();
        assert!(matches!(err, SegmentError::Decode(_)));
    }

    #[test]
    fn test_process_image_too_small() {
        let processor = SegmentationProcessor::new(SegmenterConfig::default()).unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::new(5, 5));
        let err = processor.process_image(&image).unwrap_err();
        assert!(matches!(err, SegmentError::DimensionTooSmall { .. }));
    }

    #[test]
    fn test_passthrough_processor_keeps_pixels() {
        let config = SegmenterConfig::builder()
            .variant(SegmenterVariant::Passthrough)
            .build()
            .unwrap();
        let processor = SegmentationProcessor::new(config).unwrap();
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([1, 2, 3])));

        let result = processor.process_image(&image).unwrap();
        assert!(result.image.pixels().all(|p| p.0 == [1, 2, 3, 255]));
        assert_eq!(result.metadata.variant, SegmenterVariant::Passthrough);
        assert_eq!(result.metadata.transparent_pixels, 0);
        assert!(result.metadata.threshold.is_none());
    }

    #[test]
    fn test_overrides() {
        let processor = SegmentationProcessor::new(SegmenterConfig::default()).unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 12, Rgba([9, 9, 9, 255])));

        let result = processor
            .process_image_with(&image, Some(SegmenterVariant::Passthrough), None)
            .unwrap();
        assert_eq!(result.metadata.variant, SegmenterVariant::Passthrough);
        assert_eq!(result.metadata.transparent_pixels, 0);

        let result = processor
            .process_image_with(&image, None, Some(CutoutConfig::with_threshold(0.0)))
            .unwrap();
        assert_eq!(result.metadata.variant, SegmenterVariant::Heuristic);
        assert_eq!(result.metadata.threshold, Some(0.0));
        assert_eq!(result.metadata.transparent_pixels, 0);

        let err = processor
            .process_image_with(&image, None, Some(CutoutConfig::with_threshold(-1.0)))
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_threshold_override_keeps_injected_mask_model() {
        let model = Arc::new(FixedMaskModel::new(128));
        let config = SegmenterConfig::builder()
            .variant(SegmenterVariant::Passthrough)
            .build()
            .unwrap();
        let processor = SegmentationProcessor::with_backend(
            config,
            Box::new(PassthroughBackend::with_model(model.clone())),
        )
        .unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255])));

        let result = processor
            .process_image_with(&image, None, Some(CutoutConfig::with_threshold(20.0)))
            .unwrap();
        assert!(result.image.pixels().all(|p| p.0 == [9, 9, 9, 128]));

        let result = processor
            .process_image_with(&image, Some(SegmenterVariant::Passthrough), None)
            .unwrap();
        assert!(result.image.pixels().all(|p| p.0[3] == 128));
        assert_eq!(model.call_count(), 2);

        // Invalid overrides are still rejected for the pass-through variant
        assert!(processor
            .process_image_with(&image, None, Some(CutoutConfig::with_threshold(-1.0)))
            .is_err());
    }

    #[test]
    fn test_override_rebuilds_only_on_variant_change() {
        let backend = RecordingBackend::new();
        let processor =
            SegmentationProcessor::with_backend(SegmenterConfig::default(), Box::new(backend.clone()))
                .unwrap();
        let image = DynamicImage::ImageRgb8(RgbImage::new(12, 12));

        // Recording backend reports Passthrough; requesting Heuristic rebuilds
        let result = processor
            .process_image_with(&image, Some(SegmenterVariant::Heuristic), None)
            .unwrap();
        assert_eq!(result.metadata.variant, SegmenterVariant::Heuristic);
        assert!(backend.get_call_history().is_empty());

        processor
            .process_image_with(&image, None, Some(CutoutConfig::with_threshold(5.0)))
            .unwrap();
        assert_eq!(backend.get_call_history(), vec![(12, 12)]);
    }

    #[test]
    fn test_injected_backend_receives_rgba() {
        let backend = RecordingBackend::new();
        let processor =
            SegmentationProcessor::with_backend(SegmenterConfig::default(), Box::new(backend.clone()))
                .unwrap();
        assert_eq!(processor.variant(), SegmenterVariant::Passthrough);
        assert_eq!(processor.config().variant, SegmenterVariant::Passthrough);

        let image = DynamicImage::ImageRgb8(RgbImage::new(7, 3));
        processor.process_image(&image).unwrap();
        assert_eq!(backend.get_call_history(), vec![(7, 3)]);
    }

    #[test]
    fn test_process_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("input.png");
        let image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        ImageIOService::save_png(&image, &path).unwrap();

        let processor = SegmentationProcessor::new(SegmenterConfig::default()).unwrap();
        let result = processor.process_file(&path).unwrap();
        assert_eq!(result.metadata.transparent_pixels, 100);
        assert!(result.metadata.timings.total_ms >= result.metadata.timings.decode_ms);
    }

    #[test]
    fn test_process_file_missing() {
        let processor = SegmentationProcessor::new(SegmenterConfig::default()).unwrap();
        let err = processor
            .process_file("/definitely/not/here.png")
            .unwrap_err();
        assert!(matches!(err, SegmentError::Io(_)));
    }
}
