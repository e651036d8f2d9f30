//! CLI module for the photo-segmenter binary
//!
//! This module is only available when the "cli" feature is enabled.

mod batch;
mod config;
#[path = "main.rs"]
mod main_impl;

pub use batch::{collect_inputs, output_path_for, BatchSummary};
pub use main_impl::{main, Cli, Command, ProcessArgs, SegmenterArgs, ServeArgs};
