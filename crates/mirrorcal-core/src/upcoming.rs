//! Upcoming view: the next few occurrences across all events.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::EventDiagnostic;
use crate::event::{Occurrence, ParsedEvent};
use crate::expand::OccurrenceExpander;
use crate::time::QueryWindow;

/// Options for selecting upcoming occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingOptions {
    /// How far ahead of `now` to search for occurrences.
    pub horizon_days: i64,
    /// Maximum number of occurrences returned.
    pub limit: usize,
}

impl UpcomingOptions {
    /// Default search horizon.
    pub const DEFAULT_HORIZON_DAYS: i64 = 180;

    /// Largest horizon accepted from user input (about a century).
    pub const MAX_HORIZON_DAYS: i64 = 36_600;

    /// Default number of occurrences shown.
    pub const DEFAULT_LIMIT: usize = 10;

    /// Sets the search horizon.
    #[must_use]
    pub fn with_horizon_days(mut self, days: i64) -> Self {
        self.horizon_days = days;
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for UpcomingOptions {
    fn default() -> Self {
        Self {
            horizon_days: Self::DEFAULT_HORIZON_DAYS,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Selected upcoming occurrences plus the events that were skipped.
#[derive(Debug, Default)]
pub struct Upcoming {
    /// Occurrences sorted by start, at most `limit` of them.
    pub occurrences: Vec<Occurrence>,
    /// Events skipped during expansion.
    pub diagnostics: Vec<EventDiagnostic>,
}

impl Upcoming {
    /// Returns true if nothing is coming up.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Picks the next occurrences across a set of events.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpcomingSelector {
    expander: OccurrenceExpander,
    options: UpcomingOptions,
}

impl UpcomingSelector {
    /// Creates a selector.
    pub fn new(expander: OccurrenceExpander, options: UpcomingOptions) -> Self {
        Self { expander, options }
    }

    /// Returns the selection options.
    pub fn options(&self) -> &UpcomingOptions {
        &self.options
    }

    /// Selects the occurrences starting at or after `now` (naive UTC).
    ///
    /// Events are expanded over `[now, now + horizon]`, anything starting
    /// before `now` is dropped, the rest is sorted by start (ties keep
    /// encounter order) and cut to `limit`.
    pub fn select(&self, events: &[ParsedEvent], now: NaiveDateTime) -> Upcoming {
        let window = QueryWindow::upcoming(now, self.options.horizon_days);
        let expansion = self.expander.expand_all(events, &window);

        let mut occurrences: Vec<Occurrence> = expansion
            .occurrences
            .into_iter()
            .filter(|occ| occ.start >= now)
            .collect();
        occurrences.sort_by_key(|occ| occ.start);
        occurrences.truncate(self.options.limit);

        debug!(
            selected = occurrences.len(),
            limit = self.options.limit,
            "Selected upcoming occurrences"
        );

        Upcoming {
            occurrences,
            diagnostics: expansion.diagnostics,
        }
    }
}

/// Selects upcoming occurrences with the default expander.
///
/// Skipped events are logged but not returned; use [`UpcomingSelector`] to
/// inspect them.
pub fn select_upcoming(
    events: &[ParsedEvent],
    now: NaiveDateTime,
    horizon_days: i64,
    limit: usize,
) -> Vec<Occurrence> {
    let options = UpcomingOptions::default()
        .with_horizon_days(horizon_days)
        .with_limit(limit);
    UpcomingSelector::new(OccurrenceExpander::default(), options)
        .select(events, now)
        .occurrences
}
