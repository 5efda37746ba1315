//! Time types and conversions for the occurrence engine.
//!
//! All arithmetic inside the engine happens on naive timestamps that are, by
//! convention, UTC. This module is the only place that touches time zones:
//!
//! - [`EventTime`] captures the shapes an incoming calendar value can take
//!   (date-only, floating, zone-aware) and folds them into naive UTC.
//! - [`to_local_display`] / [`to_zone`] convert naive UTC back to wall-clock
//!   time at the presentation boundary.
//! - [`QueryWindow`] is the inclusive range occurrences are computed against.

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::month::CalendarMonth;

/// A start or end value as it appears on a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A date without a time of day (all-day events).
    Date(NaiveDate),
    /// A wall-clock time with no zone attached. Treated as UTC.
    Floating(NaiveDateTime),
    /// A zone-aware instant.
    Zoned(DateTime<FixedOffset>),
}

impl EventTime {
    /// Creates an `EventTime` from a datetime in any timezone.
    pub fn from_zoned<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        Self::Zoned(dt.fixed_offset())
    }

    /// Returns `true` for date-only values.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Folds this value into the engine's naive-UTC representation.
    ///
    /// Date-only values become midnight before any conversion; floating values
    /// are returned unchanged.
    pub fn to_naive_utc(&self) -> NaiveDateTime {
        match self {
            Self::Date(date) => date.and_time(NaiveTime::MIN),
            Self::Floating(naive) => *naive,
            Self::Zoned(dt) => to_naive_utc(dt),
        }
    }
}

impl From<NaiveDate> for EventTime {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(naive: NaiveDateTime) -> Self {
        Self::Floating(naive)
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_zoned(dt)
    }
}

/// Converts a zone-aware datetime to UTC and strips the zone.
pub fn to_naive_utc<Tz: TimeZone>(dt: &DateTime<Tz>) -> NaiveDateTime {
    dt.naive_utc()
}

/// Converts a naive-UTC timestamp to the host's local timezone.
pub fn to_local_display(naive_utc: NaiveDateTime) -> DateTime<Local> {
    to_zone(naive_utc, &Local)
}

/// Converts a naive-UTC timestamp to the given timezone.
pub fn to_zone<Tz: TimeZone>(naive_utc: NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    tz.from_utc_datetime(&naive_utc)
}

/// Interprets a wall-clock time in `tz` and returns it as naive UTC.
///
/// Ambiguous times (DST fold) resolve to the earliest instant. Times that fall
/// into a DST gap are shifted forward by the gap length, the same way clocks
/// skip over it.
pub fn local_to_naive_utc<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> NaiveDateTime {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.naive_utc(),
        LocalResult::Ambiguous(earliest, _) => earliest.naive_utc(),
        LocalResult::None => {
            // Probe forward until the wall clock exists again; gaps never exceed a day.
            let mut probe = local;
            for _ in 0..(24 * 4) {
                probe += Duration::minutes(15);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    let gap = probe - local;
                    return dt.naive_utc() - gap;
                }
            }
            local
        }
    }
}

/// An inclusive time range in naive UTC.
///
/// Both ends are inclusive: an occurrence starting exactly at `start` or at
/// `end` is inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    /// First instant of the window (inclusive).
    pub start: NaiveDateTime,
    /// Last instant of the window (inclusive).
    pub end: NaiveDateTime,
}

impl QueryWindow {
    /// Creates a new window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        assert!(start <= end, "QueryWindow start must be <= end");
        Self { start, end }
    }

    /// Window covering one calendar month of local time in `tz`.
    ///
    /// Runs from local midnight on the first day to 23:59:59 on the last day,
    /// both converted to naive UTC.
    pub fn for_month<Tz: TimeZone>(month: CalendarMonth, tz: &Tz) -> Self {
        let first = month.first_day().and_time(NaiveTime::MIN);
        let last = month.last_day().and_time(end_of_day());
        Self::new(local_to_naive_utc(first, tz), local_to_naive_utc(last, tz))
    }

    /// Window from `now` to `now + horizon_days`.
    ///
    /// The end saturates at the last representable instant.
    pub fn upcoming(now: NaiveDateTime, horizon_days: i64) -> Self {
        let end = Duration::try_days(horizon_days.max(0))
            .and_then(|horizon| now.checked_add_signed(horizon))
            .unwrap_or(NaiveDateTime::MAX);
        Self::new(now, end)
    }

    /// Returns the length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a timestamp lies in the window, bounds included.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
