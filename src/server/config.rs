//! Server configuration.

use serde::{Deserialize, Serialize};

use crate::config::SegmenterConfig;

/// Default upload limit (20 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 20 * 1024 * 1024;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Max request body size in bytes
    pub max_body_size: usize,
    /// Default segmenter settings for requests without overrides
    pub segmenter: SegmenterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            segmenter: SegmenterConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
