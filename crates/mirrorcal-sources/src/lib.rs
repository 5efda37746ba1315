//! Raw calendar events and the collaborators that produce them.
//!
//! - [`RawEvent`] - an opaque event handle (inline data, locator or component)
//! - [`RawEventAdapter`] - turns raw events into [`mirrorcal_core::ParsedEvent`]s
//! - [`EventFetcher`] - retrieves the calendar text behind a locator
//! - [`CalendarSource`] - yields the raw events of a whole calendar
//!
//! ```text
//!  CalendarSource ──► RawEvent ──► RawEventAdapter ──► ParsedEvent
//!                                       │
//!                                  EventFetcher
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mirrorcal_sources::{CalendarSource, RawEventAdapter};
//!
//! let raws = source.fetch_raw_events().await?;
//! let batch = RawEventAdapter::new(fetcher).parse_all(&raws).await;
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod ics;
pub mod raw_event;
pub mod source;

pub use adapter::{ParsedBatch, RawEventAdapter, parse_component, parse_inline};
pub use config::{FetchConfig, parse_feed_url};
pub use error::{FetchError, FetchErrorCode, FetchResult};
#[cfg(feature = "http")]
pub use fetcher::HttpFetcher;
pub use fetcher::{BoxFuture, EventFetcher, NoFetcher};
pub use raw_event::{EventReference, RawEvent};
pub use source::{CalendarSource, IcsFeedSource, IcsFileSource, source_for};
