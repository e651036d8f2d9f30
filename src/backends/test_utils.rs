//! Test utilities and mock models for backend testing
//!
//! These implementations of [`MaskModel`] and [`SegmentationBackend`] let the
//! processor and backends be exercised without a real segmentation model.

use crate::{
    config::SegmenterVariant,
    error::{Result, SegmentError},
    inference::{BackendOutput, MaskModel, SegmentationBackend},
    types::SegmentationMask,
};
use image::RgbaImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mask model that predicts the same alpha value everywhere
#[derive(Debug, Default)]
pub struct FixedMaskModel {
    alpha: u8,
    /// Force the mask to these dimensions instead of the image's
    dimensions: Option<(u32, u32)>,
    calls: AtomicUsize,
}

impl FixedMaskModel {
    #[must_use]
    pub fn new(alpha: u8) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }

    /// Model whose masks always have `dimensions`, for mismatch tests
    #[must_use]
    pub fn with_dimensions(alpha: u8, dimensions: (u32, u32)) -> Self {
        Self {
            alpha,
            dimensions: Some(dimensions),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MaskModel for FixedMaskModel {
    fn name(&self) -> &str {
        "fixed-mask"
    }

    fn predict_mask(&self, image: &RgbaImage) -> Result<SegmentationMask> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (width, height) = self.dimensions.unwrap_or_else(|| image.dimensions());
        let len = width as usize * height as usize;
        Ok(SegmentationMask::new(vec![self.alpha; len], (width, height)))
    }
}

/// Mask model that always fails
#[derive(Debug, Default)]
pub struct FailingMaskModel;

impl MaskModel for FailingMaskModel {
    fn name(&self) -> &str {
        "failing-mask"
    }

    fn predict_mask(&self, _image: &RgbaImage) -> Result<SegmentationMask> {
        Err(SegmentError::model("simulated inference failure"))
    }
}

/// Backend that records the dimensions of every image it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    call_history: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the call history for verification in tests
    pub fn get_call_history(&self) -> Vec<(u32, u32)> {
        self.call_history.lock().unwrap().clone()
    }
}

impl SegmentationBackend for RecordingBackend {
    fn variant(&self) -> SegmenterVariant {
        SegmenterVariant::Passthrough
    }

    fn segment(&self, image: &RgbaImage) -> Result<BackendOutput> {
        self.call_history.lock().unwrap().push(image.dimensions());
        Ok(BackendOutput::image_only(image.clone()))
    }
}
