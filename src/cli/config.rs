//! Conversion from CLI arguments to library configuration

use super::main_impl::{SegmenterArgs, ServeArgs};
use crate::config::SegmenterConfig;
use crate::server::ServerConfig;
use anyhow::{Context, Result};

/// Convert CLI arguments to segmenter and server configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build a validated [`SegmenterConfig`]
    pub(crate) fn segmenter_config(args: &SegmenterArgs) -> Result<SegmenterConfig> {
        SegmenterConfig::builder()
            .variant(args.variant)
            .threshold(args.threshold)
            .patch_size(args.patch_size)
            .build()
            .context("Invalid segmenter configuration")
    }

    /// Build a [`ServerConfig`] from `serve` arguments
    pub(crate) fn server_config(args: &ServeArgs) -> Result<ServerConfig> {
        if args.max_body_size == 0 {
            anyhow::bail!("Invalid max body size: must be greater than zero");
        }

        Ok(ServerConfig {
            host: args.host.clone(),
            port: args.port,
            max_body_size: args.max_body_size,
            segmenter: Self::segmenter_config(&args.segmenter)?,
        })
    }
}
