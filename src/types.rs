//! Core types for segmentation operations

use crate::{
    config::SegmenterVariant,
    error::{Result, SegmentError},
    services::ImageIOService,
};
use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of a segmentation operation
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// The processed RGBA image
    pub image: RgbaImage,

    /// Original image dimensions
    pub original_dimensions: (u32, u32),

    /// Processing metadata
    pub metadata: ProcessingMetadata,
}

impl SegmentationResult {
    /// Create a new segmentation result
    #[must_use]
    pub fn new(image: RgbaImage, original_dimensions: (u32, u32), metadata: ProcessingMetadata) -> Self {
        Self {
            image,
            original_dimensions,
            metadata,
        }
    }

    /// Encode the result as PNG bytes
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        ImageIOService::encode_png(&self.image)
    }

    /// Save the result as PNG with alpha channel
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ImageIOService::save_png(&self.image, path)
    }

    /// Get image dimensions
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Per-stage timings in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Time spent decoding the input bytes (zero for pre-decoded images)
    pub decode_ms: u64,
    /// Time spent converting to RGBA
    pub normalize_ms: u64,
    /// Time spent inside the segmentation backend
    pub segment_ms: u64,
    /// Total time
    pub total_ms: u64,
}

/// Metadata describing how an image was segmented
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Variant that produced the output
    pub variant: SegmenterVariant,
    /// Distance threshold used by the heuristic variant
    pub threshold: Option<f32>,
    /// Background reference colour estimated by the heuristic variant
    pub background_color: Option<[f32; 3]>,
    /// Number of fully transparent output pixels
    pub transparent_pixels: usize,
    /// Stage timings
    pub timings: ProcessingTimings,
    /// When processing finished
    pub processed_at: DateTime<Utc>,
}

impl ProcessingMetadata {
    /// Create metadata for the given variant with empty measurements
    #[must_use]
    pub fn new(variant: SegmenterVariant) -> Self {
        Self {
            variant,
            threshold: None,
            background_color: None,
            transparent_pixels: 0,
            timings: ProcessingTimings::default(),
            processed_at: Utc::now(),
        }
    }

    /// Fraction of transparent pixels for an image of `dimensions`
    #[must_use]
    pub fn transparent_ratio(&self, dimensions: (u32, u32)) -> f64 {
        let total = u64::from(dimensions.0) * u64::from(dimensions.1);
        if total == 0 {
            return 0.0;
        }
        self.transparent_pixels as f64 / total as f64
    }
}

/// Alpha mask produced by a segmentation model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    /// Mask data as grayscale values (0-255), row-major
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Create a new segmentation mask
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Write the mask into the alpha channel of an RGBA image
    ///
    /// # Errors
    /// - Mask and image dimensions differ
    /// - Mask data length does not match its dimensions
    pub fn apply_to_image(&self, image: &mut RgbaImage) -> Result<()> {
        if image.dimensions() != self.dimensions {
            let (img_width, img_height) = image.dimensions();
            let (mask_width, mask_height) = self.dimensions;
            return Err(SegmentError::model(format!(
                "Mask dimensions {}x{} do not match image dimensions {}x{}",
                mask_width, mask_height, img_width, img_height
            )));
        }
        let pixel_count = self.dimensions.0 as usize * self.dimensions.1 as usize;
        if self.data.len() != pixel_count {
            return Err(SegmentError::model(format!(
                "Mask holds {} values for {} pixels",
                self.data.len(),
                pixel_count
            )));
        }

        for (pixel, &alpha) in image.pixels_mut().zip(&self.data) {
            pixel.0[3] = alpha;
        }
        Ok(())
    }

    /// Get mask statistics
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total_pixels = self.data.len();
        let foreground_pixels = self.data.iter().filter(|&&x| x > 127).count();
        let background_pixels = total_pixels - foreground_pixels;
        let ratio = |count: usize| {
            if total_pixels == 0 {
                0.0
            } else {
                count as f32 / total_pixels as f32
            }
        };

        MaskStatistics {
            total_pixels,
            foreground_pixels,
            background_pixels,
            foreground_ratio: ratio(foreground_pixels),
            background_ratio: ratio(background_pixels),
        }
    }
}

/// Statistics about a segmentation mask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub total_pixels: usize,
    pub foreground_pixels: usize,
    pub background_pixels: usize,
    pub foreground_ratio: f32,
    pub background_ratio: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_mask_apply() {
        let mut image = RgbaImage::from_pixel(2, 2, Rgba([9, 8, 7, 255]));
        let mask = SegmentationMask::new(vec![0, 255, 128, 3], (2, 2));
        mask.apply_to_image(&mut image).unwrap();

        let alphas: Vec<u8> = image.pixels().map(|p| p.0[3]).collect();
        assert_eq!(alphas, vec![0, 255, 128, 3]);
        assert!(image.pixels().all(|p| p.0[..3] == [9, 8, 7]));
    }

    #[test]
    fn test_mask_dimension_mismatch() {
        let mut image = RgbaImage::new(3, 2);
        let mask = SegmentationMask::new(vec![0; 4], (2, 2));
        let err = mask.apply_to_image(&mut image).unwrap_err();
        assert!(matches!(err, SegmentError::Model(_)));
        assert!(err.to_string().contains("2x2"));
    }

    #[test]
    fn test_mask_short_data() {
        let mut image = RgbaImage::new(2, 2);
        let mask = SegmentationMask::new(vec![0; 3], (2, 2));
        let err = mask.apply_to_image(&mut image).unwrap_err();
        assert!(err.to_string().contains("3 values for 4 pixels"));
    }

    #[test]
    fn test_mask_statistics() {
        let mask = SegmentationMask::new(vec![0, 255, 200, 10], (2, 2));
        let stats = mask.statistics();
        assert_eq!(stats.total_pixels, 4);
        assert_eq!(stats.foreground_pixels, 2);
        assert_eq!(stats.background_pixels, 2);
        assert!((stats.foreground_ratio - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_transparent_ratio() {
        let mut metadata = ProcessingMetadata::new(SegmenterVariant::Heuristic);
        metadata.transparent_pixels = 25;
        assert!((metadata.transparent_ratio((10, 10)) - 0.25).abs() < f64::EPSILON);
        assert!(metadata.transparent_ratio((0, 10)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_result_png_bytes() {
        let image = RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 0]));
        let result = SegmentationResult::new(
            image,
            (4, 3),
            ProcessingMetadata::new(SegmenterVariant::Passthrough),
        );
        let bytes = result.to_png_bytes().unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(result.dimensions(), (4, 3));
    }
}
