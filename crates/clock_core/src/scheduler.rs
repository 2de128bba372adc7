//! Self-correcting boundary scheduler.
//!
//! Each firing re-reads the wall clock and sleeps until the next second (or
//! minute) boundary instead of repeating a fixed period, so neither the cost of
//! the tick callback nor timer jitter accumulates.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, FixedOffset, Timelike};
use shared::protocol::ClockNotification;
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::{debug, warn};

use crate::time_source::{DisplayZone, TimeSource};

/// Fire slightly after the boundary so the tick never reads the previous value.
pub const GUARD_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    pub last_second: u32,
    pub last_minute: u32,
    pub display_seconds: bool,
    pub zone: DisplayZone,
}

impl ClockState {
    pub fn new(now: &DateTime<FixedOffset>, display_seconds: bool, zone: DisplayZone) -> Self {
        Self {
            last_second: now.second(),
            last_minute: now.minute(),
            display_seconds,
            zone,
        }
    }

    /// Records the newly observed time and reports which boundary was crossed.
    pub fn advance(&mut self, now: &DateTime<FixedOffset>) -> Boundary {
        let second = now.second();
        let minute = now.minute();

        let boundary = if self.display_seconds && second != 0 && second != self.last_second {
            Boundary::Second(second)
        } else if minute != self.last_minute || !self.display_seconds {
            Boundary::Minute(minute)
        } else {
            Boundary::Unchanged
        };

        self.last_second = second;
        self.last_minute = minute;
        boundary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Second(u32),
    Minute(u32),
    /// Fired twice within the same second.
    Unchanged,
}

impl Boundary {
    pub fn notification(self) -> Option<ClockNotification> {
        match self {
            Boundary::Second(second) => Some(ClockNotification::ClockSecond { second }),
            Boundary::Minute(minute) => Some(ClockNotification::ClockMinute { minute }),
            Boundary::Unchanged => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub at: DateTime<FixedOffset>,
    pub boundary: Boundary,
}

/// Delay from `now` until just after the next second or minute boundary.
pub fn delay_to_next_boundary(now: &DateTime<FixedOffset>, display_seconds: bool) -> Duration {
    // Leap seconds report >= 1000ms.
    let millis = u64::from(now.timestamp_subsec_millis().min(999));
    let until_boundary = if display_seconds {
        1000 - millis
    } else {
        (60 - u64::from(now.second())) * 1000 - millis
    };
    Duration::from_millis(until_boundary + GUARD_MS)
}

pub struct DriftCorrectedScheduler {
    time: Arc<dyn TimeSource>,
    state: ClockState,
}

impl DriftCorrectedScheduler {
    pub fn new(time: Arc<dyn TimeSource>, zone: DisplayZone, display_seconds: bool) -> Self {
        let now = zone.localize(time.now());
        Self {
            time,
            state: ClockState::new(&now, display_seconds, zone),
        }
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.state.zone.localize(self.time.now())
    }

    pub fn next_delay(&self) -> Duration {
        delay_to_next_boundary(&self.now(), self.state.display_seconds)
    }

    /// Observes the clock after a timer expiry.
    pub fn fire(&mut self) -> Tick {
        let at = self.now();
        let boundary = self.state.advance(&at);
        Tick { at, boundary }
    }

    /// Arms a one-shot timer for the next boundary and re-arms it after every
    /// tick. A failing callback is logged and never stops the clock.
    pub fn start<F>(mut self, mut on_tick: F) -> SchedulerHandle
    where
        F: FnMut(&Tick) -> anyhow::Result<()> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                let delay = self.next_delay();
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = tokio::time::sleep(delay) => {}
                }

                let tick = self.fire();
                debug!(
                    second = self.state.last_second,
                    minute = self.state.last_minute,
                    "clock tick"
                );
                if let Err(err) = on_tick(&tick) {
                    warn!("clock tick callback failed: {err:#}");
                }
            }
            debug!("clock scheduler stopped");
            self.state
        });

        SchedulerHandle {
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Dropping the handle also stops the scheduler before its next re-arm.
pub struct SchedulerHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<ClockState>,
}

impl SchedulerHandle {
    pub async fn stop(mut self) -> Option<ClockState> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.await.ok()
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
