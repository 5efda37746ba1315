//! iCalendar (RFC 5545) parsing into engine records.

use std::sync::LazyLock;

use chrono::Duration;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
};
use mirrorcal_core::{EventError, EventTime, ParsedEvent, local_to_naive_utc, to_zone};
use regex::Regex;
use tracing::{debug, warn};

static RE_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("valid duration regex")
});

/// Parses calendar text and returns every `VEVENT` in document order.
///
/// # Errors
///
/// Returns a malformed-event error if the text is not a calendar document.
pub fn parse_events(ics: &str) -> Result<Vec<Event>, EventError> {
    let calendar = ics
        .parse::<Calendar>()
        .map_err(|e| EventError::malformed(format!("invalid calendar data: {}", e)))?;

    Ok(calendar
        .components
        .into_iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(event),
            _ => None,
        })
        .collect())
}

/// Parses calendar text and returns its first `VEVENT`.
///
/// # Errors
///
/// Returns a malformed-event error if the text does not parse or holds no event.
pub fn first_event(ics: &str) -> Result<Event, EventError> {
    parse_events(ics)?
        .into_iter()
        .next()
        .ok_or_else(|| EventError::malformed("no VEVENT component found"))
}

/// Extracts a [`ParsedEvent`] from a `VEVENT` component.
///
/// `DTSTART` is required. The end comes from `DTEND`, or from `DTSTART +
/// DURATION` when only a duration is given. Summary and location fall back to
/// their defaults.
///
/// # Errors
///
/// Returns a malformed-event error if `DTSTART` is missing or unparsable.
pub fn parse_component(event: &Event) -> Result<ParsedEvent, EventError> {
    let start = event
        .get_start()
        .map(convert_date_time)
        .ok_or_else(|| EventError::malformed("missing or unparsable DTSTART"))?;

    let mut parsed = ParsedEvent::new(start);

    if let Some(end) = event.get_end() {
        parsed = parsed.with_end(convert_date_time(end));
    } else if let Some(value) = event.property_value("DURATION") {
        match parse_duration(value) {
            Some(duration) => {
                let end = parsed.start.checked_add_signed(duration).ok_or_else(|| {
                    EventError::malformed(format!("DURATION {} is out of range", value))
                })?;
                parsed = parsed.with_end(end);
            }
            None => warn!(duration = %value, "Ignoring unparsable DURATION"),
        }
    }

    if let Some(rule) = event.property_value("RRULE") {
        parsed = parsed.with_recurrence_rule(rule);
    }
    if let Some(summary) = event.get_summary() {
        parsed = parsed.with_summary(summary);
    }
    if let Some(location) = event.get_location() {
        parsed = parsed.with_location(location);
    }

    debug!(
        summary = %parsed.summary,
        start = %parsed.start,
        recurring = parsed.is_recurring(),
        "Parsed event component"
    );

    Ok(parsed)
}

/// Converts an iCalendar date or datetime into an [`EventTime`].
///
/// `TZID` values are resolved through the IANA database. An unknown zone
/// keeps the wall-clock time and treats it as UTC.
pub fn convert_date_time(dt: DatePerhapsTime) -> EventTime {
    match dt {
        DatePerhapsTime::Date(date) => EventTime::Date(date),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => EventTime::from(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => EventTime::Floating(naive),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            match tzid.trim_matches('"').parse::<chrono_tz::Tz>() {
                Ok(tz) => {
                    let utc = local_to_naive_utc(date_time, &tz);
                    EventTime::from_zoned(to_zone(utc, &tz))
                }
                Err(_) => {
                    warn!(tzid = %tzid, "Unknown TZID, treating time as UTC");
                    EventTime::Floating(date_time)
                }
            }
        }
    }
}

/// Parses an RFC 5545 duration such as `PT30M`, `P1DT2H` or `-P1W`.
///
/// Returns `None` when the text is not a duration or does not fit in a
/// [`Duration`].
pub fn parse_duration(value: &str) -> Option<Duration> {
    let caps = RE_DURATION.captures(value.trim())?;

    if (2..=6).all(|i| caps.get(i).is_none()) {
        return None;
    }

    let field = |i: usize| -> Option<i64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let duration = Duration::try_weeks(field(2)?)?
        .checked_add(&Duration::try_days(field(3)?)?)?
        .checked_add(&Duration::try_hours(field(4)?)?)?
        .checked_add(&Duration::try_minutes(field(5)?)?)?
        .checked_add(&Duration::try_seconds(field(6)?)?)?;

    match caps.get(1).map(|m| m.as_str()) {
        Some("-") => Some(-duration),
        _ => Some(duration),
    }
}
