//! Turns raw event handles into [`ParsedEvent`] records.
//!
//! Resolution order for one [`RawEvent`]:
//!
//! 1. Inline `data`, parsed as a calendar document; its first `VEVENT` wins.
//! 2. If that is absent or fails, the reference: a locator is fetched and
//!    parsed the same way, a component is used directly.
//!
//! Failures are per event. [`RawEventAdapter::parse_all`] records them as
//! diagnostics and carries on with the rest of the batch.

use icalendar::Event;
use mirrorcal_core::{EventDiagnostic, EventError, ParsedEvent};
use tracing::{debug, info, warn};

use crate::fetcher::{EventFetcher, NoFetcher};
use crate::ics;
use crate::raw_event::{EventReference, RawEvent};

/// Parsed events plus the raw events that could not be parsed.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    /// Successfully parsed events, in input order.
    pub events: Vec<ParsedEvent>,
    /// Raw events that were skipped, with the reason.
    pub diagnostics: Vec<EventDiagnostic>,
}

impl ParsedBatch {
    /// Returns true if every raw event parsed.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Adapts raw events into engine records, fetching references through `F`.
#[derive(Debug, Clone, Default)]
pub struct RawEventAdapter<F = NoFetcher> {
    fetcher: F,
}

impl RawEventAdapter<NoFetcher> {
    /// An adapter that only handles inline data and parsed components.
    pub fn offline() -> Self {
        Self { fetcher: NoFetcher }
    }
}

impl<F: EventFetcher> RawEventAdapter<F> {
    /// Creates an adapter using `fetcher` for locator references.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Parses one raw event.
    ///
    /// # Errors
    ///
    /// - [`EventError::Malformed`] if no event component or no start time
    ///   can be found.
    /// - [`EventError::Fetch`] if the reference had to be fetched and the
    ///   fetch failed.
    pub async fn parse(&self, raw: &RawEvent) -> Result<ParsedEvent, EventError> {
        if let Some(ref data) = raw.data {
            match parse_inline(data) {
                Ok(parsed) => return Ok(parsed),
                Err(err) if raw.reference.is_some() => {
                    debug!(error = %err, "Inline data unusable, trying reference");
                }
                Err(err) => return Err(err),
            }
        }

        match raw.reference {
            Some(EventReference::Locator(ref locator)) => {
                let body = self
                    .fetcher
                    .fetch(locator)
                    .await
                    .map_err(|e| EventError::from(e.with_locator(locator.as_str())))?;
                parse_inline(&body)
            }
            Some(EventReference::Component(ref event)) => parse_component(event),
            None => Err(EventError::malformed("event has neither data nor a reference")),
        }
    }

    /// Parses a batch of raw events.
    ///
    /// A raw event that fails is logged and recorded in
    /// [`ParsedBatch::diagnostics`]; the others are still parsed.
    pub async fn parse_all(&self, raws: &[RawEvent]) -> ParsedBatch {
        let mut batch = ParsedBatch::default();

        for (index, raw) in raws.iter().enumerate() {
            match self.parse(raw).await {
                Ok(event) => batch.events.push(event),
                Err(error) => {
                    warn!(
                        index,
                        kind = %error.kind(),
                        error = %error,
                        "Skipping event that failed to parse"
                    );
                    batch.diagnostics.push(EventDiagnostic::new(index, error));
                }
            }
        }

        info!(
            parsed = batch.events.len(),
            skipped = batch.diagnostics.len(),
            "Parsed raw events"
        );

        batch
    }
}

/// Parses serialized calendar data, using its first `VEVENT`.
///
/// # Errors
///
/// Returns [`EventError::Malformed`] if the data does not parse, holds no
/// event, or the event has no start.
pub fn parse_inline(data: &str) -> Result<ParsedEvent, EventError> {
    let event = ics::first_event(data)?;
    parse_component(&event)
}

/// Parses an already-structured `VEVENT` component.
///
/// # Errors
///
/// Returns [`EventError::Malformed`] if the component has no start.
pub fn parse_component(event: &Event) -> Result<ParsedEvent, EventError> {
    ics::parse_component(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, FetchResult};
    use crate::fetcher::BoxFuture;
    use chrono::{NaiveDate, NaiveDateTime};
    use icalendar::{Component, EventLike};
    use mirrorcal_core::EventErrorKind;
    use std::collections::HashMap;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn calendar(summary: &str, dtstart: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//Test//EN\r\n\
             BEGIN:VEVENT\r\nUID:{summary}@example.com\r\nDTSTART:{dtstart}\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\n\
             END:VCALENDAR\r\n"
        )
    }

    /// Serves canned bodies by locator; anything else is a 404.
    #[derive(Default)]
    struct MapFetcher(HashMap<String, String>);

    impl MapFetcher {
        fn with(mut self, locator: &str, body: String) -> Self {
            self.0.insert(locator.to_string(), body);
            self
        }
    }

    impl EventFetcher for MapFetcher {
        fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, FetchResult<String>> {
            Box::pin(async move {
                self.0
                    .get(locator)
                    .cloned()
                    .ok_or_else(|| FetchError::status(404, "no such event"))
            })
        }
    }

    mod single {
        use super::*;

        #[tokio::test]
        async fn inline_data() {
            let raw = RawEvent::inline(calendar("Lunch", "20240105T120000Z"));
            let parsed = RawEventAdapter::offline().parse(&raw).await.unwrap();
            assert_eq!(parsed.summary, "Lunch");
            assert_eq!(parsed.start, naive(2024, 1, 5, 12, 0));
        }

        #[tokio::test]
        async fn locator_is_fetched() {
            let url = "https://cal.example.com/lunch.ics";
            let fetcher = MapFetcher::default().with(url, calendar("Lunch", "20240105T120000Z"));
            let parsed = RawEventAdapter::new(fetcher)
                .parse(&RawEvent::locator(url))
                .await
                .unwrap();
            assert_eq!(parsed.summary, "Lunch");
        }

        #[tokio::test]
        async fn fetch_failure_is_fetch_error() {
            let url = "https://cal.example.com/missing.ics";
            let err = RawEventAdapter::new(MapFetcher::default())
                .parse(&RawEvent::locator(url))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), EventErrorKind::FetchError);
            match err {
                EventError::Fetch { locator, .. } => assert_eq!(locator, url),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn component_used_directly() {
            let event = Event::new()
                .summary("Review")
                .starts(naive(2024, 2, 1, 15, 0))
                .done();
            let parsed = RawEventAdapter::offline()
                .parse(&RawEvent::component(event))
                .await
                .unwrap();
            assert_eq!(parsed.summary, "Review");
            assert_eq!(parsed.start, naive(2024, 2, 1, 15, 0));
        }

        #[tokio::test]
        async fn broken_inline_falls_back_to_reference() {
            let url = "https://cal.example.com/lunch.ics";
            let fetcher = MapFetcher::default().with(url, calendar("Lunch", "20240105T120000Z"));
            let raw = RawEvent::inline("garbage")
                .with_reference(EventReference::Locator(url.to_string()));
            let parsed = RawEventAdapter::new(fetcher).parse(&raw).await.unwrap();
            assert_eq!(parsed.summary, "Lunch");
        }

        #[tokio::test]
        async fn broken_inline_without_reference_fails() {
            let err = RawEventAdapter::offline()
                .parse(&RawEvent::inline("garbage"))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), EventErrorKind::MalformedEvent);
        }

        #[tokio::test]
        async fn empty_raw_event_is_malformed() {
            let err = RawEventAdapter::offline()
                .parse(&RawEvent::default())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), EventErrorKind::MalformedEvent);
        }
    }

    mod batch {
        use super::*;

        #[tokio::test]
        async fn failures_do_not_stop_the_batch() {
            let no_start = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//Test//EN\r\n\
                BEGIN:VEVENT\r\nUID:ghost@example.com\r\nSUMMARY:Ghost\r\nEND:VEVENT\r\n\
                END:VCALENDAR\r\n";
            let raws = vec![
                RawEvent::inline(calendar("First", "20240101T090000Z")),
                RawEvent::inline(no_start),
                RawEvent::locator("https://cal.example.com/missing.ics"),
                RawEvent::inline(calendar("Last", "20240103T090000Z")),
            ];

            let batch = RawEventAdapter::new(MapFetcher::default())
                .parse_all(&raws)
                .await;

            let summaries: Vec<_> = batch.events.iter().map(|e| e.summary.as_str()).collect();
            assert_eq!(summaries, vec!["First", "Last"]);
            assert!(!batch.is_clean());

            let failed: Vec<_> = batch
                .diagnostics
                .iter()
                .map(|d| (d.index, d.kind()))
                .collect();
            assert_eq!(
                failed,
                vec![
                    (1, EventErrorKind::MalformedEvent),
                    (2, EventErrorKind::FetchError)
                ]
            );
        }

        #[tokio::test]
        async fn oversized_duration_is_skipped() {
            let forever = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//Test//EN\r\n\
                BEGIN:VEVENT\r\nUID:forever@example.com\r\nDTSTART:20240101T090000Z\r\n\
                DURATION:P99999999W\r\nSUMMARY:Forever\r\nEND:VEVENT\r\n\
                END:VCALENDAR\r\n";
            let raws = vec![
                RawEvent::inline(forever),
                RawEvent::inline(calendar("Good", "20240102T090000Z")),
            ];

            let batch = RawEventAdapter::offline().parse_all(&raws).await;

            assert_eq!(batch.events.len(), 1);
            assert_eq!(batch.events[0].summary, "Good");
            assert_eq!(batch.diagnostics.len(), 1);
            assert_eq!(batch.diagnostics[0].index, 0);
            assert_eq!(batch.diagnostics[0].kind(), EventErrorKind::MalformedEvent);
        }
    }
}
