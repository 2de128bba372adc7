//! Gregorian to Hebrew calendar conversion for the clock's secondary date line.

use chrono::NaiveDate;
use shared::{
    domain::HebrewDateFormat,
    protocol::{CalendarEvent, CalendarRequest},
};
use thiserror::Error;
use tracing::warn;

mod gematriya;
pub mod hebrew;

pub use gematriya::gematriya;
pub use hebrew::{HebrewDate, HebrewMonth};

/// Shown in place of the Hebrew date when conversion fails.
pub const UNAVAILABLE_TEXT: &str = "<unavailable>";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("date with rata die {rata_die} precedes the hebrew calendar epoch")]
    BeforeEpoch { rata_die: i64 },
    #[error("hebrew month {0} out of range")]
    MonthOutOfRange(u32),
    #[error("{0} cannot be written as a hebrew numeral")]
    InvalidNumeral(i64),
    /// Raised by converters that delegate to an external calendar backend.
    #[error("calendar backend failure: {0}")]
    Backend(String),
}

impl HebrewDate {
    /// Day, month and year in Hebrew script, e.g. `א׳ תשרי תשפ״ו`.
    pub fn render_gematriya(&self) -> Result<String, CalendarError> {
        let day = gematriya(i64::from(self.day))?;
        let month = self.month.hebrew_name(self.is_leap_year());
        let year = gematriya(self.year)?;
        Ok(format!("{day} {month} {year}"))
    }
}

/// Produces the full rendering of a Gregorian day in the target calendar.
pub trait CalendarConverter: Send + Sync {
    fn render_full(&self, date: NaiveDate) -> Result<String, CalendarError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HebrewCalendar;

impl CalendarConverter for HebrewCalendar {
    fn render_full(&self, date: NaiveDate) -> Result<String, CalendarError> {
        HebrewDate::from_gregorian(date)?.render_gematriya()
    }
}

/// Converts `date` and applies `format`. Failures never escape: they are
/// logged and replaced by [`UNAVAILABLE_TEXT`].
pub fn convert(
    converter: &dyn CalendarConverter,
    date: NaiveDate,
    format: HebrewDateFormat,
) -> String {
    match converter.render_full(date) {
        Ok(full) => apply_format(&full, format),
        Err(err) => {
            warn!(%date, format = format.as_str(), "hebrew date conversion failed: {err}");
            UNAVAILABLE_TEXT.to_string()
        }
    }
}

fn apply_format(full: &str, format: HebrewDateFormat) -> String {
    match format {
        HebrewDateFormat::Full => full.to_string(),
        // Both keep the first two tokens; "dayOnly" has always rendered day and month.
        HebrewDateFormat::Short | HebrewDateFormat::DayOnly => {
            let tokens: Vec<&str> = full.split(' ').collect();
            match tokens.as_slice() {
                [day, month, ..] => format!("{day} {month}"),
                _ => full.to_string(),
            }
        }
    }
}

/// Answers one worker request.
pub fn handle_request(
    converter: &dyn CalendarConverter,
    request: &CalendarRequest,
) -> CalendarEvent {
    let day = request.day();
    let format = request.format();
    let text = match day.to_naive_date() {
        Some(date) => convert(converter, date, format),
        None => UNAVAILABLE_TEXT.to_string(),
    };
    CalendarEvent::CalendarDateResult { day, format, text }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
