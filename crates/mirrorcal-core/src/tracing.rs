//! Logging setup shared by the mirrorcal binaries.
//!
//! ```ignore
//! use mirrorcal_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Target prefix used for the default filter directive.
pub const LOG_TARGET: &str = "mirrorcal";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Human-readable pretty format.
    Pretty,
    /// Compact single-line format (default).
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level used when `RUST_LOG` is not set.
    pub default_level: Level,
    /// Output format for log messages
    pub output_format: TracingOutputFormat,
    /// Whether to include file/line information
    pub include_location: bool,
    /// Whether to include timestamps
    pub include_timestamp: bool,
    /// Custom filter directive; overrides `default_level` and `RUST_LOG`.
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_timestamp: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Debug-level config with source locations, for `--debug`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Self::default()
        }
    }

    /// Picks a config from a `-v` count: 0 warn, 1 the debug preset, 2+ trace
    /// with source locations.
    #[must_use]
    pub fn from_verbosity(verbose: u8) -> Self {
        match verbose {
            0 => Self::default(),
            1 => Self::cli_debug(),
            _ => Self::cli_debug().with_level(Level::TRACE),
        }
    }

    /// Toggle timestamps on log lines
    #[must_use]
    pub fn with_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set a custom env filter directive
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The filter directive applied when neither `env_filter` nor `RUST_LOG` is set.
    pub fn default_directive(&self) -> String {
        format!("{}={}", LOG_TARGET, self.default_level)
    }
}

/// Initialize tracing with the given configuration.
///
/// Logs go to stderr so that stdout stays clean for rendered output.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the env filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = match config.env_filter {
        Some(ref filter) => EnvFilter::try_new(filter)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default_directive())),
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let layer = match (config.output_format, config.include_timestamp) {
        (TracingOutputFormat::Pretty, true) => base.pretty().boxed(),
        (TracingOutputFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (TracingOutputFormat::Compact, true) => base.compact().boxed(),
        (TracingOutputFormat::Compact, false) => base.compact().without_time().boxed(),
        (TracingOutputFormat::Json, true) => base.json().boxed(),
        (TracingOutputFormat::Json, false) => base.json().without_time().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
