//! Photo Segmenter CLI
//!
//! Runs the HTTP cutout service or processes local files in batch.

#[cfg(feature = "cli")]
use photo_segmenter::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
