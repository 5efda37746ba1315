//! Fetch configuration.

use std::time::Duration;

use url::Url;

use crate::error::{FetchError, FetchResult};

/// Settings for retrieving calendar data over HTTP.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Username for basic authentication.
    pub username: Option<String>,

    /// Password for basic authentication.
    pub password: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl FetchConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credentials for authentication.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns true if credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some()
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("mirrorcal/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Parses a feed locator into an HTTP(S) URL.
///
/// `webcal://` is rewritten to `https://`.
///
/// # Errors
///
/// Returns an `invalid_locator` error for unparsable URLs or other schemes.
pub fn parse_feed_url(locator: &str) -> FetchResult<Url> {
    let locator = locator.trim();
    let rewritten;
    let locator = match locator.strip_prefix("webcal://") {
        Some(rest) => {
            rewritten = format!("https://{}", rest);
            rewritten.as_str()
        }
        None => locator,
    };

    let url = Url::parse(locator).map_err(|e| {
        FetchError::invalid_locator(format!("invalid URL: {}", e))
            .with_locator(locator)
            .with_source(e)
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(
            FetchError::invalid_locator(format!("unsupported scheme: {}", other))
                .with_locator(locator),
        ),
    }
}
