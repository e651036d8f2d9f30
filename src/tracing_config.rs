//! Tracing configuration module for structured logging
//!
//! The library only emits events; the binary configures the subscriber here.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default)
    #[default]
    Console,
    /// Compact output without colors for CI and log collectors
    Compact,
    /// JSON structured logging (requires the `tracing-json` feature)
    Json,
}

/// Tracing configuration builder
#[derive(Debug, Default)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlation
    pub session_id: Option<String>,
}

impl TracingConfig {
    /// Create a new tracing configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set output format
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Set session ID for correlation
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",  // Default: informational messages and above
            1 => "debug", // -v: internal state and computations
            _ => "trace", // -vv+: extremely detailed traces
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    /// - Invalid filter directives
    /// - A global subscriber is already installed
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = match &self.env_filter {
            Some(env_filter) => EnvFilter::try_new(env_filter)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };
        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_level(true)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true);
                registry.with(fmt_layer).try_init()?;
            },
            #[cfg(not(feature = "tracing-json"))]
            TracingFormat::Json | TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact();
                registry.with(fmt_layer).try_init()?;
                if self.format == TracingFormat::Json {
                    tracing::warn!("JSON logging requires the tracing-json feature; using compact output");
                }
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::debug!(session_id = %session_id, "Tracing initialized");
        }

        Ok(())
    }
}

/// Initialize tracing with CLI-friendly defaults
///
/// `RUST_LOG` takes precedence over the verbosity flag when set.
pub fn init_cli_tracing(verbosity: u8, format: TracingFormat) -> anyhow::Result<()> {
    let mut config = TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format)
        .with_session_id(uuid::Uuid::new_v4().to_string());

    if let Ok(directives) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !directives.trim().is_empty() {
            config = config.with_env_filter(directives);
        }
    }

    config.init()
}
