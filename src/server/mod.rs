//! HTTP boundary for the segmenter
//!
//! A thin axum layer over [`SegmentationProcessor`](crate::processor::SegmentationProcessor):
//! `POST /api/segment` and `GET /health`. Decoding and segmentation run on
//! the blocking pool; each request is independent.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ServerConfig, DEFAULT_MAX_BODY_SIZE};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;

use anyhow::Context;
use tracing::info;

/// Bind `state.config` and serve until Ctrl-C.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let address = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(
        address = %listener.local_addr().context("Failed to read bound address")?,
        variant = %state.processor.variant(),
        threshold = state.processor.config().cutout.threshold,
        "Listening"
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
