use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::{DayKey, HebrewDateFormat};

/// Render side -> calendar worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarRequest {
    GetCalendarDate {
        /// Instant in the display timezone; the worker converts its local date.
        date: DateTime<FixedOffset>,
        format: HebrewDateFormat,
    },
}

impl CalendarRequest {
    pub fn day(&self) -> DayKey {
        match self {
            CalendarRequest::GetCalendarDate { date, .. } => DayKey::from(date.date_naive()),
        }
    }

    pub fn format(&self) -> HebrewDateFormat {
        match self {
            CalendarRequest::GetCalendarDate { format, .. } => *format,
        }
    }
}

/// Calendar worker -> render side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarEvent {
    CalendarDateResult {
        day: DayKey,
        format: HebrewDateFormat,
        text: String,
    },
}

/// Outbound fire-and-forget boundary signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClockNotification {
    ClockSecond { second: u32 },
    ClockMinute { minute: u32 },
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn request_day_follows_display_offset() {
        let jerusalem = FixedOffset::east_opt(3 * 3600).expect("offset");
        let date = jerusalem
            .with_ymd_and_hms(2025, 9, 23, 1, 30, 0)
            .single()
            .expect("valid instant");
        let request = CalendarRequest::GetCalendarDate {
            date,
            format: HebrewDateFormat::Full,
        };
        assert_eq!(request.day(), DayKey::new(2025, 9, 23));
    }

    #[test]
    fn notifications_use_tagged_wire_names() {
        let raw = serde_json::to_value(ClockNotification::ClockSecond { second: 12 })
            .expect("serialize");
        assert_eq!(
            raw,
            serde_json::json!({"type": "CLOCK_SECOND", "payload": {"second": 12}})
        );

        let raw = serde_json::to_value(CalendarEvent::CalendarDateResult {
            day: DayKey::new(2025, 9, 23),
            format: HebrewDateFormat::Short,
            text: "x".into(),
        })
        .expect("serialize");
        assert_eq!(raw["type"], "CALENDAR_DATE_RESULT");
        assert_eq!(raw["payload"]["format"], "short");
    }
}
