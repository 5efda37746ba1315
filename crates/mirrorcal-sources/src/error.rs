//! Error types for fetching raw calendar data.

use std::fmt;

use mirrorcal_core::EventError;
use thiserror::Error;

/// The category of a fetch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorCode {
    /// Connection failed, timed out, DNS resolution failed, etc.
    NetworkError,
    /// The server answered with a 5xx status.
    ServerError,
    /// The resource does not exist (404).
    NotFound,
    /// Credentials were rejected (401/403).
    AuthenticationFailed,
    /// The body could not be read or decoded.
    InvalidResponse,
    /// The locator is not a usable URL or path.
    InvalidLocator,
    /// A local file could not be read.
    IoError,
}

impl FetchErrorCode {
    /// Returns true if this error is transient and the fetch may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::ServerError)
    }

    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::NotFound => "not_found",
            Self::AuthenticationFailed => "authentication_failed",
            Self::InvalidResponse => "invalid_response",
            Self::InvalidLocator => "invalid_locator",
            Self::IoError => "io_error",
        }
    }

    /// Maps a non-success HTTP status to a code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed,
            404 | 410 => Self::NotFound,
            500..=599 => Self::ServerError,
            _ => Self::InvalidResponse,
        }
    }
}

impl fmt::Display for FetchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while retrieving calendar data.
#[derive(Debug, Error)]
pub struct FetchError {
    code: FetchErrorCode,
    message: String,
    /// The URL or path that was requested.
    locator: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    /// Creates a fetch error with the given code and message.
    pub fn new(code: FetchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            locator: None,
            source: None,
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::NetworkError, message)
    }

    /// Creates an error from a non-success HTTP status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::from_status(status), message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::InvalidResponse, message)
    }

    /// Creates an invalid locator error.
    pub fn invalid_locator(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::InvalidLocator, message)
    }

    /// Creates a local I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::IoError, message)
    }

    /// Sets the locator this error relates to.
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> FetchErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the locator, if set.
    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(ref locator) = self.locator {
            write!(f, " ({})", locator)?;
        }
        Ok(())
    }
}

impl From<FetchError> for EventError {
    fn from(err: FetchError) -> Self {
        EventError::Fetch {
            locator: err.locator.clone().unwrap_or_default(),
            message: format!("{}: {}", err.code, err.message),
            source: Some(Box::new(err)),
        }
    }
}

/// A specialized Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
