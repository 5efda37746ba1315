//! Presentation strings for the month grid and the upcoming list.
//!
//! Everything here converts naive-UTC occurrences to local time for display.
//! A formatting failure affects only the entry being formatted: it is
//! replaced by [`DETAILS_UNAVAILABLE`] and the rest of the list still renders.

use std::borrow::Cow;
use std::fmt::{self, Write as _};

use chrono::{Datelike, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::{DEFAULT_SUMMARY, Occurrence};
use crate::month::{MonthView, WeekStart};

/// Placeholder shown when the upcoming list is empty.
pub const NO_UPCOMING_EVENTS: &str = "No upcoming events.";

/// Placeholder shown for an entry that could not be formatted.
pub const DETAILS_UNAVAILABLE: &str = "Event details unavailable";

/// Default date pattern of an upcoming entry (`March 05, 2024`).
pub const DEFAULT_DATE_FORMAT: &str = "%B %d, %Y";

/// Time format preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// 12-hour format with AM/PM (e.g., "02:30 PM").
    #[default]
    H12,
    /// 24-hour format (e.g., "14:30").
    H24,
}

impl TimeFormat {
    /// The `strftime` pattern for this format.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::H12 => "%I:%M %p",
            Self::H24 => "%H:%M",
        }
    }
}

/// Configuration options for presentation strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Clock style for start/end times.
    pub time_format: TimeFormat,
    /// `strftime` pattern for the date line of an upcoming entry.
    pub date_format: String,
    /// Maximum title length (truncated with ellipsis).
    pub max_title_length: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::H12,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_title_length: None,
        }
    }
}

/// One upcoming occurrence, ready to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingEntry {
    /// Local start date, e.g. `March 05, 2024`.
    pub date: String,
    /// Local start and end times, e.g. `09:00 AM - 10:00 AM`.
    pub time_range: String,
    /// Event title.
    pub title: String,
}

impl fmt::Display for UpcomingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.date, self.time_range, self.title)
    }
}

/// Formats one occurrence for the upcoming list.
///
/// # Errors
///
/// Returns `fmt::Error` if a configured pattern cannot be rendered.
pub fn format_upcoming_entry<Tz>(
    occurrence: &Occurrence,
    tz: &Tz,
    options: &FormatOptions,
) -> Result<UpcomingEntry, fmt::Error>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let start = occurrence.local_start(tz);
    let end = occurrence.local_end(tz);
    let clock = options.time_format.pattern();

    let mut date = String::new();
    write!(date, "{}", start.format(&options.date_format))?;

    let mut time_range = String::new();
    write!(
        time_range,
        "{} - {}",
        start.format(clock),
        end.format(clock)
    )?;

    Ok(UpcomingEntry {
        date,
        time_range,
        title: title(occurrence, options).into_owned(),
    })
}

/// Renders the upcoming list as text blocks, one per occurrence.
///
/// An empty list renders as the single [`NO_UPCOMING_EVENTS`] placeholder.
pub fn render_upcoming<Tz>(occurrences: &[Occurrence], tz: &Tz, options: &FormatOptions) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if occurrences.is_empty() {
        return vec![NO_UPCOMING_EVENTS.to_string()];
    }

    occurrences
        .iter()
        .map(|occ| match format_upcoming_entry(occ, tz, options) {
            Ok(entry) => entry.to_string(),
            Err(_) => {
                warn!(summary = %occ.summary, start = %occ.start, "Failed to render event details");
                DETAILS_UNAVAILABLE.to_string()
            }
        })
        .collect()
}

/// Label for an occurrence inside a month-grid cell.
pub fn cell_label<'a>(occurrence: &'a Occurrence, options: &FormatOptions) -> Cow<'a, str> {
    title(occurrence, options)
}

/// Renders a month view as plain text: a grid followed by a day-by-day agenda.
///
/// Days outside the month are shown in parentheses; days with events carry
/// a `*`.
pub fn render_month_text<Tz>(
    view: &MonthView,
    tz: &Tz,
    week_start: WeekStart,
    options: &FormatOptions,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.month.first_day().format("%B %Y"));

    let header: Vec<String> = week_start
        .columns()
        .iter()
        .map(|day| format!("{:>5}", day.to_string()))
        .collect();
    let _ = writeln!(out, "{}", header.concat());

    for week in &view.weeks {
        let row: Vec<String> = week
            .iter()
            .map(|date| {
                let mut cell = if view.is_in_month(*date) {
                    date.day().to_string()
                } else {
                    format!("({})", date.day())
                };
                if !view.events_on(*date).is_empty() {
                    cell.push('*');
                }
                format!("{:>5}", cell)
            })
            .collect();
        let _ = writeln!(out, "{}", row.concat());
    }

    for (date, occurrences) in &view.days {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", date.format("%a %d"));
        for occ in occurrences {
            let start = occ.local_start(tz);
            let mut time = String::new();
            if write!(time, "{}", start.format(options.time_format.pattern())).is_err() {
                time = DETAILS_UNAVAILABLE.to_string();
            }
            let _ = writeln!(out, "  {}  {}", time, cell_label(occ, options));
        }
    }

    out
}

/// An occurrence in machine-readable form, with local times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOccurrence {
    /// Local start as RFC 3339.
    pub start: String,
    /// Local end as RFC 3339.
    pub end: String,
    /// Event title.
    pub summary: String,
    /// Event location.
    pub location: String,
}

impl JsonOccurrence {
    /// Converts an occurrence to local time in `tz`.
    pub fn from_occurrence<Tz>(occurrence: &Occurrence, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            start: occurrence.local_start(tz).to_rfc3339(),
            end: occurrence.local_end(tz).to_rfc3339(),
            summary: occurrence.summary.clone(),
            location: occurrence.location.clone(),
        }
    }
}

/// Truncates a string to a maximum length, adding "..." if truncated.
///
/// The result never exceeds `max_len` characters; below four there is no
/// room for the dots and the string is cut short.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    if max_len <= 3 {
        return Cow::Owned(s.chars().take(max_len).collect());
    }

    let truncated: String = s.chars().take(max_len - 3).collect();
    Cow::Owned(format!("{}...", truncated))
}

fn title<'a>(occurrence: &'a Occurrence, options: &FormatOptions) -> Cow<'a, str> {
    let summary = occurrence.summary.trim();
    let summary = if summary.is_empty() {
        DEFAULT_SUMMARY
    } else {
        summary
    };
    match options.max_title_length {
        Some(max) => ellipsis(summary, max),
        None => Cow::Borrowed(summary),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipsis_short_string_borrowed() {
        assert!(matches!(ellipsis("Lunch", 10), Cow::Borrowed("Lunch")));
    }

    #[test]
    fn ellipsis_truncates() {
        assert_eq!(ellipsis("Quarterly planning", 10), "Quarter...");
        assert_eq!(ellipsis("anything", 0), "");
        assert_eq!(ellipsis("Quarterly", 4), "Q...");
    }

    #[test]
    fn ellipsis_never_exceeds_limit() {
        for max in 0..=12 {
            let out = ellipsis("Quarterly planning", max);
            assert!(out.chars().count() <= max, "{max}: {out}");
        }
        assert_eq!(ellipsis("Quarterly", 2), "Qu");
        assert_eq!(ellipsis("Quarterly", 3), "Qua");
        assert_eq!(ellipsis("", 0), "");
    }

    #[test]
    fn time_format_patterns() {
        assert_eq!(TimeFormat::H12.pattern(), "%I:%M %p");
        assert_eq!(TimeFormat::H24.pattern(), "%H:%M");
        assert_eq!(TimeFormat::default(), TimeFormat::H12);
    }

    #[test]
    fn default_options() {
        let options = FormatOptions::default();
        assert_eq!(options.date_format, "%B %d, %Y");
        assert!(options.max_title_length.is_none());
    }
}
