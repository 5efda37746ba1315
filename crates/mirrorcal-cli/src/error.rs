//! CLI error types.

use std::fmt;

use mirrorcal_core::TracingError;
use mirrorcal_sources::FetchError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// Invalid command-line argument.
    InvalidArgument(String),
    /// A calendar source could not be read.
    Fetch(FetchError),
    /// Logging could not be set up.
    Tracing(TracingError),
    /// Output could not be serialized.
    Serialize(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::Fetch(err) => write!(f, "calendar source error: {}", err),
            Self::Tracing(err) => write!(f, "logging setup failed: {}", err),
            Self::Serialize(msg) => write!(f, "serialization error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Tracing(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

impl From<TracingError> for CliError {
    fn from(err: TracingError) -> Self {
        Self::Tracing(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
