//! Month view: calendar geometry and per-day occurrence buckets.
//!
//! [`month_view`] expands events over one local calendar month and buckets
//! the occurrences by the local date they start on. Bucketing always uses the
//! local date, never the UTC one.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Days, NaiveDate, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EventDiagnostic;
use crate::event::{Occurrence, ParsedEvent};
use crate::expand::OccurrenceExpander;
use crate::time::QueryWindow;

/// Occurrences keyed by local calendar date.
pub type DateBuckets = BTreeMap<NaiveDate, Vec<Occurrence>>;

/// A validated year/month pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// Earliest accepted year.
    pub const MIN_YEAR: i32 = 1;
    /// Latest accepted year.
    pub const MAX_YEAR: i32 = 9999;

    /// Creates a month, or `None` if `month` is not in `1..=12` or the year is
    /// outside [`Self::MIN_YEAR`]..=[`Self::MAX_YEAR`].
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month number (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Number of days in the month.
    pub fn len_days(&self) -> u32 {
        self.last_day().day()
    }

    /// Returns true if `date` lies in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The following month.
    pub fn succ(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// The preceding month.
    pub fn pred(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The first column of a week row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    /// Weeks run Monday to Sunday.
    #[default]
    Monday,
    /// Weeks run Sunday to Saturday.
    Sunday,
}

impl WeekStart {
    /// The weekday in the first column.
    pub fn weekday(&self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Sunday => Weekday::Sun,
        }
    }

    /// Weekdays in column order.
    pub fn columns(&self) -> [Weekday; 7] {
        let first = self.weekday();
        let mut days = [first; 7];
        for i in 1..7 {
            days[i] = days[i - 1].succ();
        }
        days
    }
}

/// Whole weeks covering `month`, including lead and trail days from the
/// adjacent months.
pub fn month_grid(month: CalendarMonth, week_start: WeekStart) -> Vec<[NaiveDate; 7]> {
    let first = month.first_day();
    let last = month.last_day();

    let lead = (first.weekday().num_days_from_monday() + 7
        - week_start.weekday().num_days_from_monday())
        % 7;
    let mut weeks = Vec::with_capacity(6);
    let Some(mut cursor) = first.checked_sub_days(Days::new(u64::from(lead))) else {
        return weeks;
    };

    // Rows stop early only at the edges of the representable date range.
    while cursor <= last {
        let mut week = [cursor; 7];
        for (offset, slot) in (0u64..).zip(week.iter_mut()) {
            match cursor.checked_add_days(Days::new(offset)) {
                Some(day) => *slot = day,
                None => return weeks,
            }
        }
        weeks.push(week);
        match cursor.checked_add_days(Days::new(7)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    weeks
}

/// Buckets occurrences by the local date they start on.
///
/// Within a bucket, occurrences keep their input order.
pub fn group_by_date<Tz, I>(occurrences: I, tz: &Tz) -> DateBuckets
where
    Tz: TimeZone,
    I: IntoIterator<Item = Occurrence>,
{
    let mut buckets = DateBuckets::new();
    for occurrence in occurrences {
        buckets
            .entry(occurrence.local_date(tz))
            .or_default()
            .push(occurrence);
    }
    buckets
}

/// Everything needed to draw one month.
#[derive(Debug)]
pub struct MonthView {
    /// The month shown.
    pub month: CalendarMonth,
    /// Grid rows, seven dates each.
    pub weeks: Vec<[NaiveDate; 7]>,
    /// Occurrences keyed by local start date, limited to the month.
    pub days: DateBuckets,
    /// Events skipped while building the view.
    pub diagnostics: Vec<EventDiagnostic>,
}

impl MonthView {
    /// Occurrences starting on `date`, in expansion order.
    pub fn events_on(&self, date: NaiveDate) -> &[Occurrence] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `date` belongs to the month rather than a lead/trail day.
    pub fn is_in_month(&self, date: NaiveDate) -> bool {
        self.month.contains(date)
    }

    /// Total number of occurrences in the month.
    pub fn occurrence_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// Builds the view of `month` as seen from timezone `tz`.
///
/// The month's local boundaries are converted to naive UTC for expansion;
/// each occurrence is then converted back to local time and kept only if its
/// local date still lies in the month.
pub fn month_view<Tz: TimeZone>(
    events: &[ParsedEvent],
    month: CalendarMonth,
    tz: &Tz,
    week_start: WeekStart,
    expander: &OccurrenceExpander,
) -> MonthView {
    let window = QueryWindow::for_month(month, tz);
    let expansion = expander.expand_all(events, &window);

    let in_month = expansion
        .occurrences
        .into_iter()
        .filter(|occ| month.contains(occ.local_date(tz)));
    let days = group_by_date(in_month, tz);

    debug!(
        month = %month,
        days_with_events = days.len(),
        skipped = expansion.diagnostics.len(),
        "Built month view"
    );

    MonthView {
        month,
        weeks: month_grid(month, week_start),
        days,
        diagnostics: expansion.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime, Utc};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn occurrence(start: NaiveDateTime, summary: &str) -> Occurrence {
        ParsedEvent::new(start)
            .with_summary(summary)
            .occurrence_at(start)
    }

    mod calendar_month {
        use super::*;

        #[test]
        fn rejects_invalid_month() {
            assert!(CalendarMonth::new(2024, 0).is_none());
            assert!(CalendarMonth::new(2024, 13).is_none());
            assert!(CalendarMonth::new(0, 1).is_none());
            assert!(CalendarMonth::new(10_000, 1).is_none());
            assert!(CalendarMonth::new(262_142, 12).is_none());
            assert!(CalendarMonth::new(9999, 12).is_some());
        }

        #[test]
        fn bounds() {
            let feb = CalendarMonth::new(2024, 2).unwrap();
            assert_eq!(feb.first_day(), date(2024, 2, 1));
            assert_eq!(feb.last_day(), date(2024, 2, 29));
            assert_eq!(feb.len_days(), 29);
            assert_eq!(CalendarMonth::new(2023, 12).unwrap().last_day(), date(2023, 12, 31));
        }

        #[test]
        fn navigation() {
            let dec = CalendarMonth::new(2023, 12).unwrap();
            assert_eq!(dec.succ(), CalendarMonth::new(2024, 1));
            assert_eq!(CalendarMonth::new(2024, 1).unwrap().pred(), Some(dec));
            assert_eq!(CalendarMonth::containing(date(2024, 7, 19)).to_string(), "2024-07");
        }
    }

    mod grid {
        use super::*;

        #[test]
        fn edges_of_the_date_range() {
            let last = CalendarMonth::new(CalendarMonth::MAX_YEAR, 12).unwrap();
            let weeks = month_grid(last, WeekStart::Monday);
            assert_eq!(weeks.last().unwrap()[6], date(10_000, 1, 2));

            let weeks = month_grid(CalendarMonth::containing(NaiveDate::MAX), WeekStart::Monday);
            assert!(!weeks.is_empty());
            assert!(weeks.iter().flatten().all(|d| *d <= NaiveDate::MAX));
        }

        #[test]
        fn monday_first_with_lead_and_trail_days() {
            // March 2024 starts on a Friday and ends on a Sunday.
            let weeks = month_grid(CalendarMonth::new(2024, 3).unwrap(), WeekStart::Monday);
            assert_eq!(weeks.len(), 5);
            assert_eq!(weeks[0][0], date(2024, 2, 26));
            assert_eq!(weeks[0][4], date(2024, 3, 1));
            assert_eq!(weeks[4][6], date(2024, 3, 31));
            for week in &weeks {
                assert_eq!(week[0].weekday(), Weekday::Mon);
            }
        }

        #[test]
        fn six_row_month() {
            // September 2024 starts on a Sunday.
            let weeks = month_grid(CalendarMonth::new(2024, 9).unwrap(), WeekStart::Monday);
            assert_eq!(weeks.len(), 6);
            assert_eq!(weeks[0][6], date(2024, 9, 1));
            assert_eq!(weeks[5][0], date(2024, 9, 30));
            assert_eq!(weeks[5][6], date(2024, 10, 6));
        }

        #[test]
        fn sunday_first() {
            let weeks = month_grid(CalendarMonth::new(2024, 9).unwrap(), WeekStart::Sunday);
            assert_eq!(weeks[0][0], date(2024, 9, 1));
            assert_eq!(weeks.len(), 5);
        }

        #[test]
        fn columns_follow_week_start() {
            assert_eq!(WeekStart::Monday.columns()[6], Weekday::Sun);
            assert_eq!(WeekStart::Sunday.columns()[1], Weekday::Mon);
        }
    }

    mod grouping {
        use super::*;

        #[test]
        fn buckets_by_local_date_not_utc() {
            let occ = occurrence(naive(2024, 5, 31, 23, 30), "Late call");
            let buckets = group_by_date(vec![occ.clone()], &plus_two());
            assert!(buckets.get(&date(2024, 5, 31)).is_none());
            assert_eq!(buckets[&date(2024, 6, 1)], vec![occ]);
        }

        #[test]
        fn keeps_input_order_within_day() {
            let occs = vec![
                occurrence(naive(2024, 6, 3, 15, 0), "Afternoon"),
                occurrence(naive(2024, 6, 3, 8, 0), "Morning"),
            ];
            let buckets = group_by_date(occs, &Utc);
            let day: Vec<_> = buckets[&date(2024, 6, 3)]
                .iter()
                .map(|o| o.summary.as_str())
                .collect();
            assert_eq!(day, vec!["Afternoon", "Morning"]);
        }
    }

    mod view {
        use super::*;

        #[test]
        fn recurring_event_fills_month() {
            let events = vec![
                ParsedEvent::new(naive(2024, 1, 1, 10, 0))
                    .with_summary("Gym")
                    .with_recurrence_rule("FREQ=WEEKLY;BYDAY=MO"),
            ];
            let view = month_view(
                &events,
                CalendarMonth::new(2024, 1).unwrap(),
                &Utc,
                WeekStart::Monday,
                &OccurrenceExpander::default(),
            );
            assert_eq!(view.occurrence_count(), 5);
            assert_eq!(view.events_on(date(2024, 1, 29))[0].summary, "Gym");
            assert!(view.events_on(date(2024, 1, 30)).is_empty());
            assert!(view.diagnostics.is_empty());
        }

        #[test]
        fn local_month_boundary_is_respected() {
            // 22:30 UTC on May 31 is already June 1 at UTC+2.
            let events = vec![
                ParsedEvent::new(naive(2024, 5, 31, 22, 30)).with_summary("Edge"),
                ParsedEvent::new(naive(2024, 5, 31, 21, 30)).with_summary("May"),
            ];
            let june = month_view(
                &events,
                CalendarMonth::new(2024, 6).unwrap(),
                &plus_two(),
                WeekStart::Monday,
                &OccurrenceExpander::default(),
            );
            assert_eq!(june.occurrence_count(), 1);
            assert_eq!(june.events_on(date(2024, 6, 1))[0].summary, "Edge");
            assert!(june.is_in_month(date(2024, 6, 1)));
            assert!(!june.is_in_month(date(2024, 5, 31)));
        }

        #[test]
        fn broken_event_does_not_blank_month() {
            let events = vec![
                ParsedEvent::new(naive(2024, 1, 5, 9, 0))
                    .with_summary("Broken")
                    .with_recurrence_rule("FREQ=NEVER"),
                ParsedEvent::new(naive(2024, 1, 6, 9, 0)).with_summary("Fine"),
            ];
            let view = month_view(
                &events,
                CalendarMonth::new(2024, 1).unwrap(),
                &Utc,
                WeekStart::Monday,
                &OccurrenceExpander::default(),
            );
            assert_eq!(view.occurrence_count(), 1);
            assert_eq!(view.diagnostics.len(), 1);
        }
    }
}
