use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use shared::{
    domain::{HebrewDateFormat, TimeFormat},
    error::ClockError,
};
use tracing::warn;

use crate::time_source::DisplayZone;

pub const DEFAULT_CONFIG_PATH: &str = "clock.toml";
pub const DEFAULT_DATE_FORMAT: &str = "%A, %B %-d, %Y";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

/// What the clock shows and how. Read-only once the service starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub time_format: TimeFormat,
    pub display_seconds: bool,
    pub show_period: bool,
    pub show_period_upper: bool,
    pub clock_bold: bool,
    pub show_date: bool,
    pub show_time: bool,
    pub date_format: String,
    pub show_hebrew_date: bool,
    pub hebrew_date_format: HebrewDateFormat,
    pub send_notifications: bool,
    pub timezone: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::H24,
            display_seconds: false,
            show_period: false,
            show_period_upper: false,
            clock_bold: false,
            show_date: true,
            show_time: true,
            date_format: DEFAULT_DATE_FORMAT.into(),
            show_hebrew_date: true,
            hebrew_date_format: HebrewDateFormat::Full,
            send_notifications: false,
            timezone: None,
        }
    }
}

impl DisplayConfig {
    pub fn zone(&self) -> Result<DisplayZone, ClockError> {
        DisplayZone::parse(self.timezone.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub request_timeout_ms: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host-wide hour cycle, used when the clock keeps its 24h default.
    pub time_format: Option<TimeFormat>,
    pub clock: DisplayConfig,
    pub worker: WorkerSettings,
}

impl Settings {
    /// The display configuration with the host-wide hour cycle applied.
    pub fn display_config(&self) -> DisplayConfig {
        let mut config = self.clock.clone();
        if config.time_format == TimeFormat::H24 {
            if let Some(global) = self.time_format {
                config.time_format = global;
            }
        }
        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.worker.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ClockError> {
        self.clock.zone()?;
        let mut pattern = StrftimeItems::new(&self.clock.date_format);
        if pattern.any(|item| matches!(item, Item::Error)) {
            return Err(ClockError::InvalidDatePattern(self.clock.date_format.clone()));
        }
        if self.worker.request_timeout_ms < MIN_REQUEST_TIMEOUT_MS {
            return Err(ClockError::RequestTimeoutTooShort(
                self.worker.request_timeout_ms,
                MIN_REQUEST_TIMEOUT_MS,
            ));
        }
        Ok(())
    }
}

pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

/// Applies `APP__<FIELD>` overrides. Values that fail to parse are ignored.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let clock = &mut settings.clock;

    if let Some(v) = parsed(&lookup, "APP__TIME_FORMAT", |v| {
        v.parse::<u8>().ok().and_then(|v| TimeFormat::try_from(v).ok())
    }) {
        clock.time_format = v;
    }
    override_bool(&lookup, "APP__DISPLAY_SECONDS", &mut clock.display_seconds);
    override_bool(&lookup, "APP__SHOW_PERIOD", &mut clock.show_period);
    override_bool(&lookup, "APP__SHOW_PERIOD_UPPER", &mut clock.show_period_upper);
    override_bool(&lookup, "APP__CLOCK_BOLD", &mut clock.clock_bold);
    override_bool(&lookup, "APP__SHOW_DATE", &mut clock.show_date);
    override_bool(&lookup, "APP__SHOW_TIME", &mut clock.show_time);
    override_bool(&lookup, "APP__SHOW_HEBREW_DATE", &mut clock.show_hebrew_date);
    override_bool(&lookup, "APP__SEND_NOTIFICATIONS", &mut clock.send_notifications);

    if let Some(v) = lookup("APP__DATE_FORMAT") {
        clock.date_format = v;
    }
    if let Some(v) = parsed(&lookup, "APP__HEBREW_DATE_FORMAT", |v| v.parse().ok()) {
        clock.hebrew_date_format = v;
    }
    if let Some(v) = lookup("APP__TIMEZONE") {
        clock.timezone = Some(v).filter(|v| !v.trim().is_empty());
    }
    if let Some(v) = parsed(&lookup, "APP__REQUEST_TIMEOUT_MS", |v| v.parse().ok()) {
        settings.worker.request_timeout_ms = v;
    }
}

fn override_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut bool) {
    if let Some(v) = parsed(lookup, key, parse_bool) {
        *target = v;
    }
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let value = parse(raw.trim());
    if value.is_none() {
        warn!(key, value = raw.as_str(), "ignoring unparsable environment override");
    }
    value
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
