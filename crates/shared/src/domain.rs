use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ClockError;

/// Calendar day in the display timezone. Converted dates are cached per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DayKey {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(value: NaiveDate) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HebrewDateFormat {
    /// Day, month and year.
    #[default]
    Full,
    /// Day and month.
    Short,
    /// Same two tokens as `Short`.
    DayOnly,
}

impl HebrewDateFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            HebrewDateFormat::Full => "full",
            HebrewDateFormat::Short => "short",
            HebrewDateFormat::DayOnly => "dayOnly",
        }
    }
}

impl std::str::FromStr for HebrewDateFormat {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "full" => Ok(HebrewDateFormat::Full),
            "short" => Ok(HebrewDateFormat::Short),
            "dayOnly" | "day_only" => Ok(HebrewDateFormat::DayOnly),
            other => Err(ClockError::InvalidHebrewDateFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimeFormat {
    H12,
    #[default]
    H24,
}

impl TryFrom<u8> for TimeFormat {
    type Error = ClockError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            12 => Ok(TimeFormat::H12),
            24 => Ok(TimeFormat::H24),
            other => Err(ClockError::InvalidTimeFormat(other)),
        }
    }
}

impl From<TimeFormat> for u8 {
    fn from(value: TimeFormat) -> Self {
        match value {
            TimeFormat::H12 => 12,
            TimeFormat::H24 => 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_key_orders_chronologically() {
        let earlier = DayKey::new(2025, 12, 31);
        let later = DayKey::new(2026, 1, 1);
        assert!(earlier < later);
        assert_eq!(later.to_string(), "2026-01-01");
    }

    #[test]
    fn time_format_rejects_unknown_hour_cycle() {
        assert_eq!(TimeFormat::try_from(12).expect("12h"), TimeFormat::H12);
        assert!(matches!(
            TimeFormat::try_from(13),
            Err(ClockError::InvalidTimeFormat(13))
        ));
    }

    #[test]
    fn hebrew_format_uses_camel_case_names() {
        let raw = serde_json::to_string(&HebrewDateFormat::DayOnly).expect("serialize");
        assert_eq!(raw, "\"dayOnly\"");
        assert_eq!(
            "short".parse::<HebrewDateFormat>().expect("parse"),
            HebrewDateFormat::Short
        );
    }
}
