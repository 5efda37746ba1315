//! The `month` command.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate, TimeZone, Utc};
use mirrorcal_core::{
    CalendarMonth, FormatOptions, JsonOccurrence, MonthView, OccurrenceExpander, ParsedEvent,
    WeekStart, month_view, render_month_text,
};
use serde::Serialize;

use crate::cli::MonthArgs;
use crate::config::{DisplayZone, MirrorConfig};
use crate::error::{CliError, CliResult};

/// Machine-readable month view.
#[derive(Debug, Serialize)]
pub struct MonthJson {
    /// `YYYY-MM`.
    pub month: String,
    /// Grid rows, seven dates each.
    pub weeks: Vec<[NaiveDate; 7]>,
    /// Occurrences keyed by local date.
    pub days: BTreeMap<NaiveDate, Vec<JsonOccurrence>>,
}

/// Prints the month grid for the requested (or current) month.
pub async fn run(
    config: &MirrorConfig,
    sources: &[String],
    zone: DisplayZone,
    args: &MonthArgs,
    json: bool,
) -> CliResult<()> {
    let month = target_month(args, zone.today(Utc::now()))?;
    let week_start = args
        .week_start
        .map(WeekStart::from)
        .unwrap_or(config.month.week_start);

    let batch = super::load_events(config, sources).await?;

    let options = config.format_options();
    let output = match zone {
        DisplayZone::Local => render(&batch.events, month, &Local, week_start, &options, json)?,
        DisplayZone::Named(tz) => render(&batch.events, month, &tz, week_start, &options, json)?,
    };

    if !json && let Some(ref name) = config.calendar.name {
        println!("{}\n", name);
    }
    println!("{}", output);
    Ok(())
}

/// Resolves `--year`/`--month` against today's date.
pub fn target_month(args: &MonthArgs, today: NaiveDate) -> CliResult<CalendarMonth> {
    let current = CalendarMonth::containing(today);
    let year = args.year.unwrap_or(current.year());
    let month = args.month.unwrap_or(current.month());
    CalendarMonth::new(year, month)
        .ok_or_else(|| CliError::InvalidArgument(format!("no such month: {}-{:02}", year, month)))
}

/// Builds and renders the month view as text or JSON.
pub fn render<Tz>(
    events: &[ParsedEvent],
    month: CalendarMonth,
    tz: &Tz,
    week_start: WeekStart,
    options: &FormatOptions,
    json: bool,
) -> CliResult<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let view = month_view(events, month, tz, week_start, &OccurrenceExpander::default());

    if json {
        Ok(serde_json::to_string_pretty(&to_json(&view, tz))?)
    } else {
        Ok(render_month_text(&view, tz, week_start, options))
    }
}

fn to_json<Tz>(view: &MonthView, tz: &Tz) -> MonthJson
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    MonthJson {
        month: view.month.to_string(),
        weeks: view.weeks.clone(),
        days: view
            .days
            .iter()
            .map(|(date, occs)| {
                let entries = occs
                    .iter()
                    .map(|occ| JsonOccurrence::from_occurrence(occ, tz))
                    .collect();
                (*date, entries)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::WeekStartArg;
    use chrono::FixedOffset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn defaults_to_current_month() {
        let month = target_month(&MonthArgs::default(), date(2024, 3, 17)).unwrap();
        assert_eq!(month, CalendarMonth::new(2024, 3).unwrap());
    }

    #[test]
    fn explicit_month() {
        let args = MonthArgs {
            year: Some(2025),
            month: Some(1),
            week_start: Some(WeekStartArg::Sunday),
        };
        let month = target_month(&args, date(2024, 3, 17)).unwrap();
        assert_eq!(month.to_string(), "2025-01");
    }

    #[test]
    fn invalid_month_rejected() {
        let args = MonthArgs {
            year: Some(2024),
            month: Some(0),
            week_start: None,
        };
        assert!(matches!(
            target_month(&args, date(2024, 3, 17)),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn json_buckets_by_local_date() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let events = vec![
            ParsedEvent::new(date(2024, 3, 9).and_hms_opt(23, 30, 0).unwrap()).with_summary("Late"),
        ];
        let month = CalendarMonth::new(2024, 3).unwrap();

        let json = render(
            &events,
            month,
            &tz,
            WeekStart::Monday,
            &FormatOptions::default(),
            true,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["month"], "2024-03");
        assert_eq!(value["weeks"].as_array().unwrap().len(), 5);
        assert_eq!(value["days"]["2024-03-10"][0]["summary"], "Late");
        assert!(value["days"].get("2024-03-09").is_none());
    }

    #[test]
    fn text_has_header() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let month = CalendarMonth::new(2024, 2).unwrap();
        let text = render(&[], month, &tz, WeekStart::Monday, &FormatOptions::default(), false)
            .unwrap();
        assert!(text.starts_with("February 2024\n"));
    }
}
