//! Batch processing of local files for the `process` subcommand

use crate::processor::SegmentationProcessor;
use crate::services::ImageIOService;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

/// Suffix appended to the input stem for outputs
const OUTPUT_SUFFIX: &str = "_segmented";

/// Outcome of a batch run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: Vec<PathBuf>,
}

impl BatchSummary {
    /// Fail when any input could not be processed
    pub fn into_result(self) -> Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }
        anyhow::bail!(
            "{} of {} file(s) failed to process",
            self.failed.len(),
            self.processed + self.failed.len()
        )
    }
}

/// Expand files and directories into a sorted list of supported images.
///
/// Files that already carry the output suffix are skipped so reruns over the
/// same directory don't feed previous results back in.
pub fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            if ImageIOService::is_supported_format(input) {
                files.push(input.clone());
            } else {
                warn!("Skipping unsupported file: {}", input.display());
            }
        } else if input.is_dir() {
            let max_depth = if recursive { usize::MAX } else { 1 };
            for entry in walkdir::WalkDir::new(input).max_depth(max_depth) {
                let entry = entry
                    .with_context(|| format!("Failed to read directory {}", input.display()))?;
                let path = entry.path();
                if entry.file_type().is_file()
                    && ImageIOService::is_supported_format(path)
                    && !is_previous_output(path)
                {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            anyhow::bail!(
                "Input path does not exist or is not accessible: {}",
                input.display()
            );
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// `<dir>/<stem>_segmented.png`, where `dir` is `output_dir` or the input's parent
pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    let file_name = format!("{}{}.png", stem, OUTPUT_SUFFIX);

    match output_dir.or_else(|| input.parent()) {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn is_previous_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}

/// Where results go for a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputTarget {
    /// Next to each input
    Alongside,
    /// Inside a directory
    Directory(PathBuf),
    /// Exactly this file (single input only)
    File(PathBuf),
}

impl OutputTarget {
    fn resolve(output: Option<&Path>, input_count: usize) -> Self {
        match output {
            None => Self::Alongside,
            Some(path) if input_count == 1 && has_png_extension(path) => {
                Self::File(path.to_path_buf())
            },
            Some(dir) => Self::Directory(dir.to_path_buf()),
        }
    }

    fn path_for(&self, input: &Path) -> PathBuf {
        match self {
            Self::Alongside => output_path_for(input, None),
            Self::Directory(dir) => output_path_for(input, Some(dir)),
            Self::File(path) => path.clone(),
        }
    }
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Process every input, continuing past individual failures.
///
/// `output` is a directory, or with a single input, a `.png` file path.
pub fn run(
    processor: &SegmentationProcessor,
    inputs: &[PathBuf],
    output: Option<&Path>,
) -> Result<BatchSummary> {
    let target = OutputTarget::resolve(output, inputs.len());
    if let OutputTarget::Directory(dir) = &target {
        if dir.is_file() {
            anyhow::bail!(
                "Output path exists and is a file, not a directory: {}",
                dir.display()
            );
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let progress = if inputs.len() > 1 {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut summary = BatchSummary::default();

    for input in inputs {
        if let Some(pb) = &progress {
            pb.set_message(format!("Processing {}", input.display()));
        }

        let output = target.path_for(input);
        let outcome = processor.process_file(input).and_then(|result| {
            result.save_png(&output)?;
            Ok(result.metadata)
        });
        match outcome {
            Ok(metadata) => {
                summary.processed += 1;
                info!("Processed {} -> {}", input.display(), output.display());
                if let Ok(json) = serde_json::to_string(&metadata) {
                    debug!("Metadata for {}: {}", input.display(), json);
                }
            },
            Err(e) => {
                error!("Failed to process {}: {}", input.display(), e);
                summary.failed.push(input.clone());
            },
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Completed! Processed: {}, Failed: {}",
            summary.processed,
            summary.failed.len()
        ));
    }

    if !summary.failed.is_empty() {
        warn!(
            "Some files failed to process. Processed: {}, Failed: {}",
            summary.processed,
            summary.failed.len()
        );
    }

    Ok(summary)
}
