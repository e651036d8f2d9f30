//! Error types for segmentation operations

use thiserror::Error;

/// Result type alias for segmentation operations
pub type Result<T> = std::result::Result<T, SegmentError>;

/// Error taxonomy for decoding, segmenting and encoding images
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Uploaded bytes are not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Image is smaller than the corner patch in at least one axis
    #[error(
        "Image dimensions {width}x{height} are too small: both sides must be at least {patch} pixels"
    )]
    DimensionTooSmall {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
        /// Corner patch size that could not be sampled
        patch: u32,
    },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Output encoding failed
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Mask model failures
    #[error("Model error: {0}")]
    Model(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SegmentError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a dimension error for an image that cannot hold a corner patch
    #[must_use]
    pub fn dimension_too_small(width: u32, height: u32, patch: u32) -> Self {
        Self::DimensionTooSmall {
            width,
            height,
            patch,
        }
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Whether the error was caused by the caller's input rather than the service
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::DimensionTooSmall { .. } | Self::InvalidConfig(_)
        )
    }
}
