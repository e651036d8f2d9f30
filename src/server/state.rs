//! Shared application state.

use std::sync::Arc;

use crate::error::Result;
use crate::processor::SegmentationProcessor;

use super::config::ServerConfig;

/// State shared by all handlers. Cheap to clone.
#[derive(Clone, Debug)]
pub struct AppState {
    pub processor: Arc<SegmentationProcessor>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build state with the default backend for `config.segmenter`.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let processor = SegmentationProcessor::new(config.segmenter)?;
        Ok(Self::with_processor(config, processor))
    }

    /// Build state around an injected processor.
    pub fn with_processor(config: ServerConfig, processor: SegmentationProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
            config: Arc::new(config),
        }
    }
}
