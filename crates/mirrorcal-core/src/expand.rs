//! Occurrence expansion.
//!
//! Turns a [`ParsedEvent`] and a [`QueryWindow`] into the concrete
//! [`Occurrence`]s that fall inside the window, expanding iCalendar recurrence
//! rules with the `rrule` crate.
//!
//! Production order for a single event is deterministic: recurrence order,
//! preceded by the anchor instance when the rule itself does not produce it.
//! Nothing is sorted across events.

use chrono::{Duration, NaiveDateTime, TimeZone};
use rrule::{RRuleSet, Tz as RRuleTz};
use tracing::{debug, info, warn};

use crate::error::{EventDiagnostic, EventError};
use crate::event::{Occurrence, ParsedEvent};
use crate::time::QueryWindow;

/// Tunables for recurrence expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpanderConfig {
    /// Upper bound on instances produced for one event in one window.
    pub max_instances: u16,
}

impl ExpanderConfig {
    /// Default instance cap per event and window.
    pub const DEFAULT_MAX_INSTANCES: u16 = 4096;

    /// Sets the instance cap.
    #[must_use]
    pub fn with_max_instances(mut self, max: u16) -> Self {
        self.max_instances = max;
        self
    }
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            max_instances: Self::DEFAULT_MAX_INSTANCES,
        }
    }
}

/// The outcome of expanding a batch of events against one window.
#[derive(Debug, Default)]
pub struct Expansion {
    /// Occurrences of every event that expanded cleanly, in event order.
    pub occurrences: Vec<Occurrence>,
    /// Events that were skipped, with the reason.
    pub diagnostics: Vec<EventDiagnostic>,
}

impl Expansion {
    /// Returns true if no event was skipped.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Expands parsed events into occurrences.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccurrenceExpander {
    config: ExpanderConfig,
}

impl OccurrenceExpander {
    /// Creates an expander with the given configuration.
    pub fn new(config: ExpanderConfig) -> Self {
        Self { config }
    }

    /// Returns the expander configuration.
    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    /// Computes the occurrences of `event` that start inside `window`.
    ///
    /// Without a recurrence rule the event yields one occurrence if its start
    /// is in the window, none otherwise. With a rule, every instance in the
    /// window is produced, and the anchor (`event.start`) is put in front if
    /// it is in the window but the rule did not yield it. Every occurrence
    /// spans the event's duration.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::RecurrenceRule`] if the rule cannot be parsed.
    pub fn expand(
        &self,
        event: &ParsedEvent,
        window: &QueryWindow,
    ) -> Result<Vec<Occurrence>, EventError> {
        let starts = match event.recurrence_rule.as_deref() {
            None => {
                if window.contains(event.start) {
                    vec![event.start]
                } else {
                    Vec::new()
                }
            }
            Some(rule) => {
                let mut starts = self.recurrence_starts(rule, event.start, window)?;
                if window.contains(event.start) && !starts.contains(&event.start) {
                    starts.insert(0, event.start);
                }
                starts
            }
        };

        Ok(starts
            .into_iter()
            .map(|start| event.occurrence_at(start))
            .collect())
    }

    /// Expands every event, skipping the ones that fail.
    ///
    /// A failing event is logged and recorded in [`Expansion::diagnostics`];
    /// the remaining events are still expanded.
    pub fn expand_all<'a, I>(&self, events: I, window: &QueryWindow) -> Expansion
    where
        I: IntoIterator<Item = &'a ParsedEvent>,
    {
        let mut expansion = Expansion::default();

        for (index, event) in events.into_iter().enumerate() {
            match self.expand(event, window) {
                Ok(occurrences) => {
                    debug!(
                        index,
                        summary = %event.summary,
                        count = occurrences.len(),
                        "Expanded event"
                    );
                    expansion.occurrences.extend(occurrences);
                }
                Err(error) => {
                    warn!(
                        index,
                        summary = %event.summary,
                        kind = %error.kind(),
                        error = %error,
                        "Skipping event that failed to expand"
                    );
                    expansion
                        .diagnostics
                        .push(EventDiagnostic::new(index, error).with_summary(&event.summary));
                }
            }
        }

        info!(
            occurrences = expansion.occurrences.len(),
            skipped = expansion.diagnostics.len(),
            window_start = %window.start,
            window_end = %window.end,
            "Expanded events"
        );

        expansion
    }

    /// Enumerates the rule instances anchored at `anchor` that fall in `window`.
    fn recurrence_starts(
        &self,
        rule: &str,
        anchor: NaiveDateTime,
        window: &QueryWindow,
    ) -> Result<Vec<NaiveDateTime>, EventError> {
        let normalized = normalize_rule(rule);
        // A series that ends before it starts only has its anchor instance.
        if until_of(&normalized).is_some_and(|until| until < anchor) {
            debug!(rule = %rule, anchor = %anchor, "UNTIL precedes DTSTART, no rule instances");
            return Ok(Vec::new());
        }

        let rule_set = build_rule_set(rule, &normalized, anchor)?;

        // after/before bounds are widened by a second so both window ends stay inclusive.
        let tz = RRuleTz::UTC;
        let one_second = Duration::seconds(1);
        let after = window.start.checked_sub_signed(one_second).unwrap_or(window.start);
        let before = window.end.checked_add_signed(one_second).unwrap_or(window.end);
        let after = tz.from_utc_datetime(&after);
        let before = tz.from_utc_datetime(&before);

        let result = rule_set
            .after(after)
            .before(before)
            .all(self.config.max_instances);

        if result.limited {
            warn!(
                rule = %rule,
                max_instances = self.config.max_instances,
                "Recurrence expansion truncated"
            );
        }

        Ok(result
            .dates
            .iter()
            .map(|dt| dt.naive_utc())
            .filter(|ts| window.contains(*ts))
            .collect())
    }
}

/// Expands one event with the default configuration.
///
/// # Errors
///
/// Returns [`EventError::RecurrenceRule`] if the rule cannot be parsed.
pub fn expand(event: &ParsedEvent, window: &QueryWindow) -> Result<Vec<Occurrence>, EventError> {
    OccurrenceExpander::default().expand(event, window)
}

/// Parses `normalized` into a rule set anchored at `anchor` (naive UTC).
///
/// Errors name the rule as the event gave it.
fn build_rule_set(
    rule: &str,
    normalized: &str,
    anchor: NaiveDateTime,
) -> Result<RRuleSet, EventError> {
    let text = format!(
        "DTSTART:{}Z\nRRULE:{}",
        anchor.format("%Y%m%dT%H%M%S"),
        normalized
    );

    text.parse::<RRuleSet>()
        .map_err(|e| EventError::recurrence_rule(rule, e.to_string()))
}

/// Cleans up rule text before it reaches the rule parser.
///
/// Strips an `RRULE:` prefix and rewrites date-only or floating `UNTIL`
/// values to UTC, which the parser requires when `DTSTART` is UTC.
fn normalize_rule(rule: &str) -> String {
    let rule = rule.trim();
    let rule = match rule.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &rule[6..],
        _ => rule,
    };

    rule.split(';')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                format!("UNTIL={}", normalize_until(value))
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Reads the UTC `UNTIL` bound of a normalized rule, if it has one.
fn until_of(rule: &str) -> Option<NaiveDateTime> {
    rule.split(';')
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("UNTIL"))
        .and_then(|(_, value)| NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ").ok())
}

fn normalize_until(value: &str) -> String {
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if value.ends_with('Z') {
        value.to_string()
    } else if value.len() == 8 && is_digits(value) {
        format!("{}T000000Z", value)
    } else if value.len() == 15
        && value.as_bytes()[8] == b'T'
        && is_digits(&value[..8])
        && is_digits(&value[9..])
    {
        format!("{}Z", value)
    } else {
        value.to_string()
    }
}
