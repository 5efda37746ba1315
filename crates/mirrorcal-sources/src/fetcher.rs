//! Retrieval of calendar text referenced by locator.
//!
//! The adapter never performs I/O itself. It hands locators to an
//! [`EventFetcher`], which returns the iCalendar text behind them.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{FetchError, FetchResult};

/// A boxed future for async trait methods.
///
/// Boxing keeps the traits object-safe so collaborators can be passed around
/// as `dyn EventFetcher` / `dyn CalendarSource`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieves the iCalendar text behind a locator.
pub trait EventFetcher: Send + Sync {
    /// Fetches the document at `locator`.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` on transport failures, non-success statuses or
    /// unusable locators.
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, FetchResult<String>>;
}

impl<T: EventFetcher + ?Sized> EventFetcher for Arc<T> {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, FetchResult<String>> {
        (**self).fetch(locator)
    }
}

impl<T: EventFetcher + ?Sized> EventFetcher for &T {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, FetchResult<String>> {
        (**self).fetch(locator)
    }
}

/// A fetcher that refuses every locator.
///
/// Used when only inline data and parsed components are expected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetcher;

impl EventFetcher for NoFetcher {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, FetchResult<String>> {
        Box::pin(async move {
            Err(FetchError::invalid_locator("fetching is disabled").with_locator(locator))
        })
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use reqwest::{Client, StatusCode};
    use tracing::{debug, trace, warn};

    use super::{BoxFuture, EventFetcher};
    use crate::config::{FetchConfig, parse_feed_url};
    use crate::error::{FetchError, FetchResult};

    /// Fetches iCalendar documents over HTTP(S).
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: Client,
        config: FetchConfig,
    }

    impl HttpFetcher {
        /// Creates a fetcher with the given configuration.
        ///
        /// # Errors
        ///
        /// Returns a network error if the HTTP client cannot be built.
        pub fn new(config: FetchConfig) -> FetchResult<Self> {
            let client = Client::builder()
                .timeout(config.timeout)
                .user_agent(&config.user_agent)
                .build()
                .map_err(|e| {
                    FetchError::network(format!("Failed to create HTTP client: {}", e))
                        .with_source(e)
                })?;

            Ok(Self { client, config })
        }

        /// Returns the fetch configuration.
        pub fn config(&self) -> &FetchConfig {
            &self.config
        }

        async fn get(&self, locator: &str) -> FetchResult<String> {
            let url = parse_feed_url(locator)?;

            let mut request = self.client.get(url.clone());
            if let Some(ref username) = self.config.username {
                request = request.basic_auth(username, self.config.password.as_deref());
            }

            trace!(url = %url, "Sending request");
            let response = request.send().await.map_err(|e| {
                let message = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {}", e)
                };
                FetchError::network(message)
                    .with_locator(locator)
                    .with_source(e)
            })?;

            let status = response.status();
            if !status.is_success() {
                if status == StatusCode::UNAUTHORIZED && !self.config.has_credentials() {
                    warn!(url = %url, "Server requires authentication but no credentials are configured");
                }
                return Err(FetchError::status(
                    status.as_u16(),
                    format!("server returned {}", status),
                )
                .with_locator(locator));
            }

            let body = response.text().await.map_err(|e| {
                FetchError::invalid_response(format!("failed to read body: {}", e))
                    .with_locator(locator)
                    .with_source(e)
            })?;

            debug!(url = %url, bytes = body.len(), "Fetched calendar data");
            Ok(body)
        }
    }

    impl EventFetcher for HttpFetcher {
        fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, FetchResult<String>> {
            Box::pin(self.get(locator))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorCode;

    #[tokio::test]
    async fn no_fetcher_refuses() {
        let err = NoFetcher.fetch("https://cal.example.com/a.ics").await.unwrap_err();
        assert_eq!(err.code(), FetchErrorCode::InvalidLocator);
        assert_eq!(err.locator(), Some("https://cal.example.com/a.ics"));
    }

    #[tokio::test]
    async fn shared_fetcher_delegates() {
        let shared: Arc<dyn EventFetcher> = Arc::new(NoFetcher);
        assert!(shared.fetch("x").await.is_err());
    }
}
