//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mirrorcal_core::{CalendarMonth, TracingOutputFormat, UpcomingOptions, WeekStart};

/// mirrorcal - calendar month and upcoming views for a wall display
#[derive(Debug, Parser)]
#[command(name = "mirrorcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MIRRORCAL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output (repeat for trace)
    #[arg(long = "debug", short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Calendar source (feed URL or .ics path); replaces configured sources (can be repeated)
    #[arg(long = "source", action = clap::ArgAction::Append, global = true)]
    pub sources: Vec<String>,

    /// IANA timezone used for display (defaults to the configured or host zone)
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the next occurrences across all calendars (default)
    Upcoming(UpcomingArgs),

    /// Show a month grid with the occurrences of each day
    Month(MonthArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options of the `upcoming` command.
#[derive(Debug, Clone, Default, Args)]
pub struct UpcomingArgs {
    /// Maximum number of occurrences to display
    #[arg(long)]
    pub limit: Option<usize>,

    /// How many days ahead to look
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=UpcomingOptions::MAX_HORIZON_DAYS))]
    pub horizon_days: Option<i64>,
}

/// Options of the `month` command.
#[derive(Debug, Clone, Default, Args)]
pub struct MonthArgs {
    /// Year to show (defaults to the current year)
    #[arg(
        long,
        value_parser = clap::value_parser!(i32)
            .range(i64::from(CalendarMonth::MIN_YEAR)..=i64::from(CalendarMonth::MAX_YEAR))
    )]
    pub year: Option<i32>,

    /// Month to show, 1-12 (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// First column of the grid
    #[arg(long, value_enum)]
    pub week_start: Option<WeekStartArg>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Single-line human-readable logs
    Compact,
    /// Multi-line human-readable logs
    Pretty,
    /// One JSON object per line
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Compact => Self::Compact,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Json => Self::Json,
        }
    }
}

/// First day of the week in the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WeekStartArg {
    Monday,
    Sunday,
}

impl From<WeekStartArg> for WeekStart {
    fn from(arg: WeekStartArg) -> Self {
        match arg {
            WeekStartArg::Monday => Self::Monday,
            WeekStartArg::Sunday => Self::Sunday,
        }
    }
}
