//! Image I/O operations service
//!
//! This module separates decoding, encoding and file access from the
//! segmentation logic so the transforms stay pure in-memory functions.

use crate::error::{Result, SegmentError};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Extensions accepted when scanning directories for input images
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tiff", "tif", "bmp", "gif"];

/// Service for handling image decoding, encoding and file operations
pub struct ImageIOService;

impl ImageIOService {
    /// Decode an image from raw bytes, detecting the format from content
    ///
    /// # Errors
    /// - `Decode` when the bytes are not a decodable image
    ///
    /// # Examples
    /// ```rust,no_run
    /// use photo_segmenter::services::ImageIOService;
    ///
    /// let image_data = std::fs::read("input.jpg")?;
    /// let image = ImageIOService::load_from_bytes(&image_data)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(SegmentError::Decode)
    }

    /// Load an image from a file path
    ///
    /// # Errors
    /// - `Io` when the file cannot be read
    /// - `Decode` when the contents are not a decodable image
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();
        let data = std::fs::read(path_ref)
            .map_err(|e| SegmentError::file_io_error("read image file", path_ref, &e))?;

        Self::load_from_bytes(&data).map_err(|e| {
            log::debug!("Failed to decode {}: {}", path_ref.display(), e);
            e
        })
    }

    /// Read the full contents of an async reader
    ///
    /// Decoding is left to the caller so it can run off the async executor.
    ///
    /// # Errors
    /// - `Io` when reading the stream fails
    pub async fn read_from_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        Ok(buffer)
    }

    /// Encode an RGBA image as PNG bytes
    ///
    /// # Errors
    /// - `Encode` when the PNG encoder fails
    pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(SegmentError::Encode)?;
        Ok(buffer.into_inner())
    }

    /// Save an RGBA image as PNG, creating parent directories as needed
    ///
    /// # Errors
    /// - `Io` when the directory or file cannot be written
    /// - `Encode` when the PNG encoder fails
    pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SegmentError::file_io_error("create output directory", parent, &e))?;
        }

        let bytes = Self::encode_png(image)?;
        std::fs::write(path_ref, bytes)
            .map_err(|e| SegmentError::file_io_error("write output image", path_ref, &e))
    }

    /// Check if a file path has a supported image extension
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
    }
}
