//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/mirrorcal/config.toml` by default:
//!
//! ```toml
//! [calendar]
//! sources = ["https://cal.example.com/family.ics", "~/calendars/work.ics"]
//! username = "alice"
//! password = "env::CALDAV_APP_PASSWORD"
//!
//! [upcoming]
//! limit = 10
//!
//! [display]
//! timezone = "Europe/Paris"
//! time_format = "h24"
//! ```
//!
//! Credential values support secret references (`pass::…`, `env::…`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use mirrorcal_core::{FormatOptions, TimeFormat, UpcomingOptions, WeekStart};
use mirrorcal_sources::FetchConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable overriding `calendar.username`.
pub const ENV_USERNAME: &str = "CALDAV_USERNAME";
/// Environment variable overriding `calendar.password`.
pub const ENV_PASSWORD: &str = "CALDAV_APP_PASSWORD";
/// Environment variable overriding `calendar.name`.
pub const ENV_CALENDAR_NAME: &str = "CALENDAR_NAME";

/// Configuration for the mirrorcal CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Where events come from.
    pub calendar: CalendarSettings,

    /// Upcoming list settings.
    pub upcoming: UpcomingSettings,

    /// Month grid settings.
    pub month: MonthSettings,

    /// Display settings.
    pub display: DisplaySettings,

    /// HTTP settings.
    pub fetch: FetchSettings,
}

/// Calendar source settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Feed URLs or local `.ics` paths.
    pub sources: Vec<String>,

    /// Username for HTTP basic authentication.
    pub username: Option<String>,

    /// Password for HTTP basic authentication (supports `pass::` and `env::`).
    pub password: Option<String>,

    /// Display name of the calendar.
    pub name: Option<String>,
}

/// Upcoming list settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpcomingSettings {
    /// Maximum number of occurrences shown.
    pub limit: usize,

    /// How many days ahead to search.
    pub horizon_days: i64,
}

impl Default for UpcomingSettings {
    fn default() -> Self {
        Self {
            limit: UpcomingOptions::DEFAULT_LIMIT,
            horizon_days: UpcomingOptions::DEFAULT_HORIZON_DAYS,
        }
    }
}

/// Month grid settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthSettings {
    /// First column of the grid.
    pub week_start: WeekStart,
}

/// Display settings for output formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// IANA timezone name; the host zone when unset.
    pub timezone: Option<String>,

    /// Clock style.
    pub time_format: TimeFormat,

    /// `strftime` pattern for dates in the upcoming list.
    pub date_format: String,

    /// Maximum title length (truncated with ellipsis).
    pub max_title_length: Option<usize>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        let options = FormatOptions::default();
        Self {
            timezone: None,
            time_format: options.time_format,
            date_format: options.date_format,
            max_title_length: options.max_title_length,
        }
    }
}

/// HTTP settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// User agent override.
    pub user_agent: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: FetchConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// The timezone used to present times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    /// The host's local zone.
    Local,
    /// A named IANA zone.
    Named(chrono_tz::Tz),
}

impl DisplayZone {
    /// Parses an IANA name; `None` selects the host zone.
    ///
    /// # Errors
    ///
    /// Returns a message for unknown zone names.
    pub fn parse(name: Option<&str>) -> Result<Self, String> {
        match name {
            None => Ok(Self::Local),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(Self::Named)
                .map_err(|_| format!("unknown timezone: {}", name)),
        }
    }

    /// Today's date in this zone.
    pub fn today(&self, now: DateTime<Utc>) -> chrono::NaiveDate {
        match self {
            Self::Local => Local.from_utc_datetime(&now.naive_utc()).date_naive(),
            Self::Named(tz) => tz.from_utc_datetime(&now.naive_utc()).date_naive(),
        }
    }
}

impl MirrorConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))?;
        debug!(path = %path.display(), sources = config.calendar.sources.len(), "Loaded configuration");
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mirrorcal")
    }

    /// Applies the `CALDAV_USERNAME`, `CALDAV_APP_PASSWORD` and
    /// `CALENDAR_NAME` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(username) = lookup(ENV_USERNAME) {
            self.calendar.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.calendar.password = Some(password);
        }
        if let Some(name) = lookup(ENV_CALENDAR_NAME) {
            self.calendar.name = Some(name);
        }
        self
    }

    /// Builds the HTTP fetch configuration, resolving secret references.
    pub fn fetch_config(&self) -> Result<FetchConfig, String> {
        let mut config =
            FetchConfig::new().with_timeout(Duration::from_secs(self.fetch.timeout_secs));

        if let Some(ref agent) = self.fetch.user_agent {
            config = config.with_user_agent(agent);
        }

        let username = crate::secret::resolve_opt(self.calendar.username.as_deref(), "username")?;
        let password = crate::secret::resolve_opt(self.calendar.password.as_deref(), "password")?;
        match (username, password) {
            (Some(username), password) => {
                config = config.with_credentials(username, password.unwrap_or_default());
            }
            (None, Some(_)) => {
                return Err("calendar.password is set but calendar.username is missing".to_string());
            }
            (None, None) => {}
        }

        Ok(config)
    }

    /// Presentation options.
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            time_format: self.display.time_format,
            date_format: self.display.date_format.clone(),
            max_title_length: self.display.max_title_length,
        }
    }

    /// Upcoming selection options.
    pub fn upcoming_options(&self) -> UpcomingOptions {
        UpcomingOptions::default()
            .with_limit(self.upcoming.limit)
            .with_horizon_days(self.upcoming.horizon_days)
    }

    /// The display timezone.
    pub fn display_zone(&self) -> Result<DisplayZone, String> {
        DisplayZone::parse(self.display.timezone.as_deref())
    }

    /// Checks the settings that can be checked without network access.
    pub fn validate(&self) -> Result<(), String> {
        if self.calendar.sources.is_empty() {
            return Err("no calendar sources configured".to_string());
        }
        if self.upcoming.limit == 0 {
            return Err("upcoming.limit must be at least 1".to_string());
        }
        if self.upcoming.horizon_days <= 0 {
            return Err("upcoming.horizon_days must be positive".to_string());
        }
        if self.upcoming.horizon_days > UpcomingOptions::MAX_HORIZON_DAYS {
            return Err(format!(
                "upcoming.horizon_days must be at most {}",
                UpcomingOptions::MAX_HORIZON_DAYS
            ));
        }
        self.display_zone()?;
        self.fetch_config()?;
        Ok(())
    }
}
