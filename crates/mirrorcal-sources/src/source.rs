//! Calendar sources: where raw events come from.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{FetchError, FetchResult};
use crate::fetcher::{BoxFuture, EventFetcher};
use crate::ics::parse_events;
use crate::raw_event::RawEvent;

/// Produces the raw events of one calendar.
pub trait CalendarSource: Send + Sync {
    /// Returns a short label for logs (a URL or a path).
    fn name(&self) -> &str;

    /// Retrieves every raw event of the calendar.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` if the calendar as a whole cannot be read.
    /// Problems with single events surface later, when they are parsed.
    fn fetch_raw_events(&self) -> BoxFuture<'_, FetchResult<Vec<RawEvent>>>;
}

/// An iCalendar feed served over HTTP(S).
///
/// The feed is split into one [`RawEvent`] per `VEVENT`, each in
/// already-parsed component form.
pub struct IcsFeedSource {
    url: String,
    fetcher: Arc<dyn EventFetcher>,
}

impl IcsFeedSource {
    /// Creates a source for the feed at `url`.
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn EventFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }

    async fn load(&self) -> FetchResult<Vec<RawEvent>> {
        let body = self.fetcher.fetch(&self.url).await?;
        let events = split_calendar(&body).map_err(|e| e.with_locator(&self.url))?;
        info!(source = %self.url, events = events.len(), "Loaded calendar feed");
        Ok(events)
    }
}

impl CalendarSource for IcsFeedSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn fetch_raw_events(&self) -> BoxFuture<'_, FetchResult<Vec<RawEvent>>> {
        Box::pin(self.load())
    }
}

/// A local `.ics` file.
#[derive(Debug, Clone)]
pub struct IcsFileSource {
    path: PathBuf,
    label: String,
}

impl IcsFileSource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }

    async fn load(&self) -> FetchResult<Vec<RawEvent>> {
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            FetchError::io(format!("failed to read calendar file: {}", e))
                .with_locator(&self.label)
                .with_source(e)
        })?;
        let events = split_calendar(&body).map_err(|e| e.with_locator(&self.label))?;
        info!(source = %self.label, events = events.len(), "Loaded calendar file");
        Ok(events)
    }
}

impl CalendarSource for IcsFileSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch_raw_events(&self) -> BoxFuture<'_, FetchResult<Vec<RawEvent>>> {
        Box::pin(self.load())
    }
}

/// Picks a source for a configured locator: URLs become feeds, anything
/// else is read as a file path.
pub fn source_for(locator: &str, fetcher: Arc<dyn EventFetcher>) -> Box<dyn CalendarSource> {
    let lower = locator.to_ascii_lowercase();
    if ["http://", "https://", "webcal://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        Box::new(IcsFeedSource::new(locator, fetcher))
    } else {
        Box::new(IcsFileSource::new(locator))
    }
}

fn split_calendar(body: &str) -> FetchResult<Vec<RawEvent>> {
    let events = parse_events(body)
        .map_err(|e| FetchError::invalid_response(e.to_string()))?;
    debug!(count = events.len(), "Split calendar into events");
    Ok(events.into_iter().map(RawEvent::component).collect())
}
