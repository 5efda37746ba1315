//! Core types: time, events, expansion, month and upcoming views, formatting

pub mod error;
pub mod event;
pub mod expand;
pub mod format;
pub mod month;
pub mod time;
pub mod tracing;
pub mod upcoming;

pub use error::{EventDiagnostic, EventError, EventErrorKind};
pub use event::{DEFAULT_LOCATION, DEFAULT_SUMMARY, Occurrence, ParsedEvent};
pub use expand::{ExpanderConfig, Expansion, OccurrenceExpander, expand};
pub use format::{
    FormatOptions, JsonOccurrence, TimeFormat, UpcomingEntry, cell_label, ellipsis,
    format_upcoming_entry, render_month_text, render_upcoming,
};
pub use month::{CalendarMonth, DateBuckets, MonthView, WeekStart, group_by_date, month_grid, month_view};
pub use time::{EventTime, QueryWindow, local_to_naive_utc, to_local_display, to_naive_utc, to_zone};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use upcoming::{Upcoming, UpcomingOptions, UpcomingSelector, select_upcoming};
