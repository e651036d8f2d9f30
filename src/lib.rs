#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Photo Segmenter
//!
//! Background cutout for photographs, exposed as a library, an HTTP service
//! and a batch CLI.
//!
//! Two segmenter variants are available:
//!
//! - **Heuristic**: estimates the background colour from the four corner
//!   patches and makes every pixel close to it fully transparent.
//! - **Passthrough**: returns the image converted to RGBA unchanged, or with
//!   the alpha channel of an injected [`MaskModel`] applied.
//!
//! ## Features
//!
//! - `server` (default): axum service with `POST /api/segment` and `GET /health`
//! - `cli` (default): `photo-segmenter serve` and `photo-segmenter process`
//! - `tracing-json`: JSON log output for the CLI
//! - `webp-support`: WebP decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photo_segmenter::{segment_bytes, SegmenterConfig};
//!
//! # async fn example(upload: Vec<u8>) -> anyhow::Result<()> {
//! let config = SegmenterConfig::builder().threshold(25.0).build()?;
//! let result = segment_bytes(&upload, &config).await?;
//! let png = result.to_png_bytes()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Direct cutout
//!
//! ```rust,no_run
//! use photo_segmenter::cutout::cutout;
//!
//! # fn example() -> anyhow::Result<()> {
//! let image = image::open("photo.jpg")?;
//! let rgba = cutout(&image, 30.0)?;
//! rgba.save("photo_segmented.png")?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod cutout;
pub mod error;
pub mod inference;
pub mod processor;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

use tokio::io::AsyncRead;

// Public API exports
pub use backends::{passthrough, HeuristicBackend, PassthroughBackend};
pub use config::{
    CutoutConfig, SegmenterConfig, SegmenterConfigBuilder, SegmenterVariant, DEFAULT_PATCH_SIZE,
    DEFAULT_THRESHOLD,
};
pub use cutout::{cutout, cutout_rgba, cutout_with_config, CutoutOutput};
pub use error::{Result, SegmentError};
pub use inference::{BackendOutput, MaskModel, SegmentationBackend};
pub use processor::{BackendFactory, DefaultBackendFactory, SegmentationProcessor};
pub use services::ImageIOService;
pub use types::{
    MaskStatistics, ProcessingMetadata, ProcessingTimings, SegmentationMask, SegmentationResult,
};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Segment an encoded image held in memory
///
/// Decoding and segmentation run on the blocking thread pool.
///
/// # Errors
/// - `Decode` when the bytes are not a supported image
/// - `DimensionTooSmall` when the heuristic variant gets an image smaller than a corner patch
/// - `InvalidConfig` when `config` fails validation
pub async fn segment_bytes(image_bytes: &[u8], config: &SegmenterConfig) -> Result<SegmentationResult> {
    let bytes = image_bytes.to_vec();
    run_blocking(config, move |processor| processor.process_bytes(&bytes)).await
}

/// Segment an already decoded image
///
/// # Errors
/// - `DimensionTooSmall` when the heuristic variant gets an image smaller than a corner patch
/// - `InvalidConfig` when `config` fails validation
pub async fn segment_image(
    image: image::DynamicImage,
    config: &SegmenterConfig,
) -> Result<SegmentationResult> {
    run_blocking(config, move |processor| processor.process_image(&image)).await
}

/// Segment an image read from any async stream (file, socket, cursor)
///
/// The stream is read on the async executor; decoding runs on the blocking pool.
///
/// # Errors
/// - `Io` when reading the stream fails
/// - plus everything [`segment_bytes`] can return
pub async fn segment_from_reader<R: AsyncRead + Unpin>(
    reader: R,
    config: &SegmenterConfig,
) -> Result<SegmentationResult> {
    let bytes = ImageIOService::read_from_reader(reader).await?;
    run_blocking(config, move |processor| processor.process_bytes(&bytes)).await
}

async fn run_blocking<F>(config: &SegmenterConfig, job: F) -> Result<SegmentationResult>
where
    F: FnOnce(&SegmentationProcessor) -> Result<SegmentationResult> + Send + 'static,
{
    let processor = SegmentationProcessor::new(*config)?;
    tokio::task::spawn_blocking(move || job(&processor))
        .await
        .map_err(|e| SegmentError::internal(format!("Segmentation task failed: {}", e)))?
}
