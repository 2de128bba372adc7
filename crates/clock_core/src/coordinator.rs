use std::{
    fmt::{self, Write as _},
    sync::Arc,
    time::Duration,
};

use calendar::UNAVAILABLE_TEXT;
use chrono::{DateTime, FixedOffset, Utc};
use shared::{
    domain::{DayKey, TimeFormat},
    error::ClockError,
    protocol::{CalendarEvent, CalendarRequest},
};
use thiserror::Error;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::Instant,
};
use tracing::{debug, error, warn};

use crate::{
    cache::{CacheKey, CalendarCache, CalendarCacheEntry, Lookup},
    config::DisplayConfig,
    time_source::DisplayZone,
};

/// Shown while the first conversion for the day is in flight.
pub const LOADING_TEXT: &str = "Loading...";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid date pattern '{0}'")]
    InvalidDatePattern(String),
}

/// Outbound side of the calendar worker channel.
pub trait ConversionChannel {
    fn request(&self, request: CalendarRequest) -> Result<(), ClockError>;
}

impl ConversionChannel for mpsc::Sender<CalendarRequest> {
    fn request(&self, request: CalendarRequest) -> Result<(), ClockError> {
        self.try_send(request).map_err(|err| match err {
            TrySendError::Full(_) => ClockError::WorkerQueueFull,
            TrySendError::Closed(_) => ClockError::WorkerChannelClosed,
        })
    }
}

/// Everything the view layer needs for one frame. Hidden parts are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayModel {
    pub date_text: Option<String>,
    pub hebrew_date_text: Option<String>,
    pub hour_text: Option<String>,
    pub minute_text: Option<String>,
    pub second_text: Option<String>,
    pub period_text: Option<String>,
    pub bold_minutes: bool,
}

impl DisplayModel {
    pub fn time_text(&self) -> Option<String> {
        let hour = self.hour_text.as_deref()?;
        let minute = self.minute_text.as_deref()?;
        let mut time = if self.bold_minutes {
            format!("{hour}{minute}")
        } else {
            format!("{hour}:{minute}")
        };
        if let Some(second) = &self.second_text {
            time.push(':');
            time.push_str(second);
        }
        if let Some(period) = &self.period_text {
            time.push(' ');
            time.push_str(period);
        }
        Some(time)
    }
}

impl fmt::Display for DisplayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            self.hebrew_date_text.clone(),
            self.date_text.clone(),
            self.time_text(),
        ]
        .into_iter()
        .flatten()
        .collect();
        f.write_str(&parts.join(" | "))
    }
}

/// Builds display models on the render path and keeps the calendar cache in
/// step with the worker without ever waiting on it.
pub struct RenderCoordinator<C> {
    config: Arc<DisplayConfig>,
    zone: DisplayZone,
    cache: CalendarCache,
    channel: C,
}

impl<C: ConversionChannel> RenderCoordinator<C> {
    pub fn new(
        config: Arc<DisplayConfig>,
        zone: DisplayZone,
        channel: C,
        request_timeout: Duration,
    ) -> Self {
        Self {
            config,
            zone,
            cache: CalendarCache::new(request_timeout),
            channel,
        }
    }

    pub fn cache(&self) -> &CalendarCache {
        &self.cache
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.cache.pending_deadline()
    }

    /// Builds one frame. A part that cannot be rendered is replaced by the
    /// placeholder; the remaining fields are still filled in.
    pub fn render(&mut self, now: DateTime<Utc>, clock: Instant) -> DisplayModel {
        let local = self.zone.localize(now);
        let config = Arc::clone(&self.config);
        let mut model = DisplayModel::default();

        if config.show_date {
            model.date_text = Some(match format_pattern(&local, &config.date_format) {
                Ok(text) => text,
                Err(err) => {
                    warn!("failed to render gregorian date: {err}");
                    UNAVAILABLE_TEXT.to_string()
                }
            });
            if config.show_hebrew_date {
                model.hebrew_date_text = Some(self.hebrew_date_text(&local, clock));
            }
        }

        if config.show_time {
            let hour_pattern = match config.time_format {
                TimeFormat::H24 => "%H",
                TimeFormat::H12 => "%-I",
            };
            model.hour_text = Some(local.format(hour_pattern).to_string());
            model.minute_text = Some(local.format("%M").to_string());
            model.bold_minutes = config.clock_bold;
            if config.display_seconds {
                model.second_text = Some(local.format("%S").to_string());
            }
            if config.show_period && config.time_format == TimeFormat::H12 {
                let period_pattern = if config.show_period_upper { "%p" } else { "%P" };
                model.period_text = Some(local.format(period_pattern).to_string());
            }
        }

        model
    }

    /// Applies a worker response. Returns true when it filled the cache and the
    /// view should be refreshed.
    pub fn accept(&mut self, event: CalendarEvent) -> bool {
        let CalendarEvent::CalendarDateResult { day, format, text } = event;
        let accepted = self.cache.complete(CalendarCacheEntry {
            for_date: day,
            format,
            rendered_text: text,
        });
        if accepted {
            debug!(%day, format = format.as_str(), "calendar date cached");
        } else {
            debug!(%day, format = format.as_str(), "ignoring calendar date for a stale request");
        }
        accepted
    }

    fn hebrew_date_text(&mut self, local: &DateTime<FixedOffset>, clock: Instant) -> String {
        let key = CacheKey {
            day: DayKey::from(local.date_naive()),
            format: self.config.hebrew_date_format,
        };

        match self.cache.lookup(key, clock) {
            Lookup::Hit(text) => text,
            Lookup::Pending { attempts: 1 } => LOADING_TEXT.to_string(),
            // A retry after a timeout keeps showing the placeholder.
            Lookup::Pending { .. } => UNAVAILABLE_TEXT.to_string(),
            Lookup::TimedOut { attempts } => {
                warn!(
                    day = %key.day,
                    attempts,
                    "calendar worker did not answer in time; requesting again"
                );
                self.issue(key, local, clock);
                UNAVAILABLE_TEXT.to_string()
            }
            Lookup::Miss => {
                if self.issue(key, local, clock) {
                    LOADING_TEXT.to_string()
                } else {
                    UNAVAILABLE_TEXT.to_string()
                }
            }
        }
    }

    fn issue(&mut self, key: CacheKey, local: &DateTime<FixedOffset>, clock: Instant) -> bool {
        let request = CalendarRequest::GetCalendarDate {
            date: *local,
            format: key.format,
        };
        match self.channel.request(request) {
            Ok(()) => {
                debug!(day = %key.day, format = key.format.as_str(), "requested calendar date");
                self.cache.mark_pending(key, clock);
                true
            }
            Err(err) => {
                error!(day = %key.day, "failed to request calendar date: {err}");
                self.cache.clear();
                false
            }
        }
    }
}

fn format_pattern(local: &DateTime<FixedOffset>, pattern: &str) -> Result<String, RenderError> {
    let mut rendered = String::new();
    write!(rendered, "{}", local.format(pattern))
        .map_err(|_| RenderError::InvalidDatePattern(pattern.to_string()))?;
    Ok(rendered)
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
