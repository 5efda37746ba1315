//! The `upcoming` command.

use std::fmt;

use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use mirrorcal_core::{
    FormatOptions, JsonOccurrence, Occurrence, OccurrenceExpander, UpcomingSelector,
    render_upcoming,
};

use crate::cli::UpcomingArgs;
use crate::config::{DisplayZone, MirrorConfig};
use crate::error::CliResult;

/// Prints the next occurrences across all sources.
pub async fn run(
    config: &MirrorConfig,
    sources: &[String],
    zone: DisplayZone,
    args: &UpcomingArgs,
    json: bool,
) -> CliResult<()> {
    let batch = super::load_events(config, sources).await?;
    let occurrences = select(config, args, &batch.events, Utc::now().naive_utc());

    let options = config.format_options();
    let output = match zone {
        DisplayZone::Local => render(&occurrences, &Local, &options, json)?,
        DisplayZone::Named(tz) => render(&occurrences, &tz, &options, json)?,
    };

    if !json && let Some(ref name) = config.calendar.name {
        println!("{}\n", name);
    }
    println!("{}", output);
    Ok(())
}

/// Applies the command-line overrides and selects occurrences after `now`.
pub fn select(
    config: &MirrorConfig,
    args: &UpcomingArgs,
    events: &[mirrorcal_core::ParsedEvent],
    now: NaiveDateTime,
) -> Vec<Occurrence> {
    let mut options = config.upcoming_options();
    if let Some(limit) = args.limit {
        options = options.with_limit(limit);
    }
    if let Some(days) = args.horizon_days {
        options = options.with_horizon_days(days);
    }

    UpcomingSelector::new(OccurrenceExpander::default(), options)
        .select(events, now)
        .occurrences
}

/// Renders occurrences as text blocks or a JSON array.
pub fn render<Tz>(
    occurrences: &[Occurrence],
    tz: &Tz,
    options: &FormatOptions,
    json: bool,
) -> CliResult<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if json {
        let entries: Vec<JsonOccurrence> = occurrences
            .iter()
            .map(|occ| JsonOccurrence::from_occurrence(occ, tz))
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    } else {
        Ok(render_upcoming(occurrences, tz, options).join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use mirrorcal_core::ParsedEvent;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn events() -> Vec<ParsedEvent> {
        vec![
            ParsedEvent::new(naive(2024, 3, 12, 9, 0)).with_summary("Later"),
            ParsedEvent::new(naive(2024, 3, 5, 8, 0)).with_summary("Dentist"),
            ParsedEvent::new(naive(2024, 2, 5, 8, 0)).with_summary("Past"),
        ]
    }

    #[test]
    fn args_override_config() {
        let config = MirrorConfig::default();
        let now = naive(2024, 3, 1, 0, 0);

        let all = select(&config, &UpcomingArgs::default(), &events(), now);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].summary, "Dentist");

        let args = UpcomingArgs {
            limit: Some(1),
            horizon_days: None,
        };
        assert_eq!(select(&config, &args, &events(), now).len(), 1);

        let args = UpcomingArgs {
            limit: None,
            horizon_days: Some(7),
        };
        let near = select(&config, &args, &events(), now);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].summary, "Dentist");
    }

    #[test]
    fn render_text_and_json() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let occs = select(
            &MirrorConfig::default(),
            &UpcomingArgs::default(),
            &events(),
            naive(2024, 3, 1, 0, 0),
        );

        let text = render(&occs, &tz, &FormatOptions::default(), false).unwrap();
        assert!(text.starts_with("March 05, 2024\n08:00 AM - 09:00 AM\nDentist"));
        assert!(text.contains("\n\nMarch 12, 2024"));

        let json = render(&occs, &tz, &FormatOptions::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["summary"], "Dentist");
        assert_eq!(value[0]["start"], "2024-03-05T08:00:00+00:00");
    }

    #[test]
    fn render_empty_placeholder() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let text = render(&[], &tz, &FormatOptions::default(), false).unwrap();
        assert_eq!(text, "No upcoming events.");
    }
}
