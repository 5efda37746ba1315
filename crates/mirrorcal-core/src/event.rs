//! Event records flowing through the engine.
//!
//! - [`ParsedEvent`]: one calendar event as extracted from a raw source.
//! - [`Occurrence`]: one concrete appearance of an event in time.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::time::{EventTime, to_zone};

/// Summary used when an event carries none.
pub const DEFAULT_SUMMARY: &str = "Unnamed";

/// Location used when an event carries none.
pub const DEFAULT_LOCATION: &str = "No Location";

/// Duration assumed for events without an end time.
pub fn default_duration() -> Duration {
    Duration::hours(1)
}

/// A calendar event reduced to the fields the engine needs.
///
/// Timestamps are naive UTC. `end` is stored as found; when it is absent a
/// one hour duration is applied at expansion time rather than stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEvent {
    /// When the event (or the first instance of a series) starts.
    pub start: NaiveDateTime,
    /// When the event ends, if known.
    pub end: Option<NaiveDateTime>,
    /// Raw recurrence rule text (`FREQ=...`), if the event repeats.
    pub recurrence_rule: Option<String>,
    /// The event title.
    pub summary: String,
    /// The event location.
    pub location: String,
}

impl ParsedEvent {
    /// Creates an event starting at `start`, with default summary and location.
    pub fn new(start: impl Into<EventTime>) -> Self {
        Self {
            start: start.into().to_naive_utc(),
            end: None,
            recurrence_rule: None,
            summary: DEFAULT_SUMMARY.to_string(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }

    /// Builder method to set the end time.
    pub fn with_end(mut self, end: impl Into<EventTime>) -> Self {
        self.end = Some(end.into().to_naive_utc());
        self
    }

    /// Builder method to set the recurrence rule.
    pub fn with_recurrence_rule(mut self, rule: impl Into<String>) -> Self {
        self.recurrence_rule = Some(rule.into());
        self
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Returns true if the event carries a recurrence rule.
    pub fn is_recurring(&self) -> bool {
        self.recurrence_rule.is_some()
    }

    /// The length every occurrence of this event spans.
    ///
    /// `end - start` when an end is known, one hour otherwise.
    pub fn duration(&self) -> Duration {
        match self.end {
            Some(end) => end - self.start,
            None => default_duration(),
        }
    }

    /// Builds the occurrence of this event starting at `start`.
    pub fn occurrence_at(&self, start: NaiveDateTime) -> Occurrence {
        Occurrence {
            start,
            end: start + self.duration(),
            summary: self.summary.clone(),
            location: self.location.clone(),
        }
    }
}

/// One concrete appearance of an event.
///
/// Occurrences have no identity beyond their field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Start of this appearance (naive UTC).
    pub start: NaiveDateTime,
    /// End of this appearance (naive UTC).
    pub end: NaiveDateTime,
    /// The event title.
    pub summary: String,
    /// The event location.
    pub location: String,
}

impl Occurrence {
    /// Returns the length of this occurrence.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Start converted to the given timezone.
    pub fn local_start<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        to_zone(self.start, tz)
    }

    /// End converted to the given timezone.
    pub fn local_end<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        to_zone(self.end, tz)
    }

    /// The calendar date this occurrence starts on, in the given timezone.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.local_start(tz).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn defaults() {
        let event = ParsedEvent::new(naive(2024, 1, 1, 10, 0));
        assert_eq!(event.summary, "Unnamed");
        assert_eq!(event.location, "No Location");
        assert!(event.end.is_none());
        assert!(!event.is_recurring());
        assert_eq!(event.duration(), Duration::hours(1));
    }

    #[test]
    fn explicit_end_sets_duration() {
        let event = ParsedEvent::new(naive(2024, 1, 1, 10, 0)).with_end(naive(2024, 1, 1, 11, 30));
        assert_eq!(event.duration(), Duration::minutes(90));
    }

    #[test]
    fn all_day_start_is_midnight() {
        let event = ParsedEvent::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(event.start, naive(2024, 3, 5, 0, 0));
    }

    #[test]
    fn builder_methods() {
        let event = ParsedEvent::new(naive(2024, 1, 1, 10, 0))
            .with_summary("Standup")
            .with_location("Kitchen")
            .with_recurrence_rule("FREQ=DAILY");
        assert_eq!(event.summary, "Standup");
        assert_eq!(event.location, "Kitchen");
        assert!(event.is_recurring());
    }

    #[test]
    fn occurrence_preserves_duration() {
        let event = ParsedEvent::new(naive(2024, 1, 1, 10, 0))
            .with_end(naive(2024, 1, 1, 12, 0))
            .with_summary("Review");
        let occ = event.occurrence_at(naive(2024, 1, 8, 10, 0));
        assert_eq!(occ.end, naive(2024, 1, 8, 12, 0));
        assert_eq!(occ.duration(), Duration::hours(2));
        assert_eq!(occ.summary, "Review");
    }

    #[test]
    fn occurrence_local_date() {
        let event = ParsedEvent::new(naive(2024, 5, 31, 23, 30));
        let occ = event.occurrence_at(event.start);
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(occ.local_date(&Utc), NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(occ.local_date(&plus_two), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }
}
