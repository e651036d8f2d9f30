//! Photo segmenter CLI
//!
//! `serve` runs the HTTP service, `process` cuts out local files in batch.

use super::batch;
use super::config::CliConfigBuilder;
use crate::config::SegmenterVariant;
use crate::processor::SegmentationProcessor;
use crate::server::{self, AppState, DEFAULT_MAX_BODY_SIZE};
use crate::tracing_config::{init_cli_tracing, TracingFormat};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

/// Background cutout service and batch tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "photo-segmenter")]
pub struct Cli {
    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = TracingFormat::Console, global = true)]
    pub log_format: TracingFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service
    Serve(ServeArgs),
    /// Cut out the background of local image files
    Process(ProcessArgs),
}

/// Segmenter settings shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct SegmenterArgs {
    /// Segmenter variant
    #[arg(long, value_enum, env = "SEGMENTER_VARIANT", default_value_t = SegmenterVariant::Heuristic)]
    pub variant: SegmenterVariant,

    /// Color distance below which a pixel counts as background
    #[arg(long, env = "SEGMENTER_THRESHOLD", default_value_t = crate::config::DEFAULT_THRESHOLD)]
    pub threshold: f32,

    /// Side length of the corner patches used to estimate the background
    #[arg(long, default_value_t = crate::config::DEFAULT_PATCH_SIZE)]
    pub patch_size: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "SEGMENTER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "SEGMENTER_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,

    #[command(flatten)]
    pub segmenter: SegmenterArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// Input image files or directories
    #[arg(value_name = "INPUT", required = true)]
    pub input: Vec<PathBuf>,

    /// Output directory, or a .png file for a single input (defaults to next to each input)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub segmenter: SegmenterArgs,
}

/// Main entry point for the CLI
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_tracing(cli.verbose, cli.log_format).context("Failed to initialize tracing")?;
    debug!(?cli, "Parsed arguments");

    match cli.command {
        Command::Serve(args) => serve_command(&args).await,
        Command::Process(args) => process_command(args).await,
    }
}

async fn serve_command(args: &ServeArgs) -> Result<()> {
    let config = CliConfigBuilder::server_config(args)?;
    let state = AppState::new(config).context("Failed to create segmentation processor")?;
    server::serve(state).await
}

async fn process_command(args: ProcessArgs) -> Result<()> {
    let config = CliConfigBuilder::segmenter_config(&args.segmenter)?;
    let processor =
        SegmentationProcessor::new(config).context("Failed to create segmentation processor")?;

    let inputs = batch::collect_inputs(&args.input, args.recursive)?;
    if inputs.is_empty() {
        anyhow::bail!("No supported image files found in the provided inputs");
    }
    info!("Found {} image file(s) to process", inputs.len());

    let output = args.output;
    let summary = tokio::task::spawn_blocking(move || {
        batch::run(&processor, &inputs, output.as_deref())
    })
    .await
    .context("Batch task failed")??;

    summary.into_result()
}
