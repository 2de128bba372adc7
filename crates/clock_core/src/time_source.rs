use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, Local, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use shared::error::ClockError;

/// Wall-clock reader. Swapped out in tests to drive the clock with virtual time.
pub trait TimeSource: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for simulations and tests.
#[derive(Debug)]
pub struct ManualTimeSource {
    now: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = instant;
    }

    pub fn advance(&self, by: std::time::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += TimeDelta::from_std(by).unwrap_or(TimeDelta::zero());
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Timezone the clock is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Named(Tz),
}

impl DisplayZone {
    pub fn parse(name: Option<&str>) -> Result<Self, ClockError> {
        match name.map(str::trim) {
            None | Some("") => Ok(DisplayZone::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(DisplayZone::Named)
                .map_err(|_| ClockError::InvalidTimezone(name.to_string())),
        }
    }

    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            DisplayZone::Local => instant.with_timezone(&Local).fixed_offset(),
            DisplayZone::Named(tz) => tz.from_utc_datetime(&instant.naive_utc()).fixed_offset(),
        }
    }
}
