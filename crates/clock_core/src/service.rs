//! Event loop tying the scheduler, the render coordinator and the calendar worker together.

use std::{future::Future, sync::Arc, time::Duration};

use anyhow::anyhow;
use calendar::CalendarConverter;
use shared::{error::ClockError, protocol::ClockNotification};
use tokio::{sync::mpsc, time::Instant};
use tracing::{info, warn};

use crate::{
    config::{DisplayConfig, Settings},
    coordinator::{ConversionChannel, DisplayModel, RenderCoordinator},
    scheduler::{ClockState, DriftCorrectedScheduler, Tick},
    time_source::{DisplayZone, TimeSource},
    worker::{spawn_calendar_worker, CalendarWorker},
};

/// Receives every display model, scheduled or out-of-band.
pub trait RenderSink: Send {
    fn present(&mut self, model: &DisplayModel);
}

/// Receives boundary notifications when `send_notifications` is on.
pub trait NotificationSink: Send {
    fn notify(&mut self, notification: ClockNotification);
}

pub struct ClockService {
    config: Arc<DisplayConfig>,
    zone: DisplayZone,
    request_timeout: Duration,
    time: Arc<dyn TimeSource>,
    converter: Arc<dyn CalendarConverter>,
}

impl ClockService {
    pub fn new(
        settings: &Settings,
        time: Arc<dyn TimeSource>,
        converter: Arc<dyn CalendarConverter>,
    ) -> Result<Self, ClockError> {
        settings.validate()?;
        let config = settings.display_config();
        let zone = config.zone()?;
        Ok(Self {
            config: Arc::new(config),
            zone,
            request_timeout: settings.request_timeout(),
            time,
            converter,
        })
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    fn coordinator<C: ConversionChannel>(&self, channel: C) -> RenderCoordinator<C> {
        RenderCoordinator::new(
            Arc::clone(&self.config),
            self.zone,
            channel,
            self.request_timeout,
        )
    }

    fn build<C: ConversionChannel>(&self, coordinator: &mut RenderCoordinator<C>) -> DisplayModel {
        coordinator.render(self.time.now(), Instant::now())
    }

    /// Runs until `shutdown` resolves and returns the scheduler's final state.
    pub async fn run<S, N, F>(
        &self,
        sink: &mut S,
        notifier: &mut N,
        shutdown: F,
    ) -> anyhow::Result<Option<ClockState>>
    where
        S: RenderSink,
        N: NotificationSink,
        F: Future<Output = ()>,
    {
        let CalendarWorker {
            requests,
            mut events,
            task: worker,
        } = spawn_calendar_worker(Arc::clone(&self.converter));
        let mut coordinator = self.coordinator(requests);

        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<Tick>();
        let scheduler = DriftCorrectedScheduler::new(
            Arc::clone(&self.time),
            self.zone,
            self.config.display_seconds,
        )
        .start(move |tick| {
            tick_tx
                .send(*tick)
                .map_err(|_| anyhow!("clock service is no longer receiving ticks"))
        });

        info!(
            display_seconds = self.config.display_seconds,
            hebrew_date = self.config.show_hebrew_date,
            "clock started"
        );
        sink.present(&self.build(&mut coordinator));

        tokio::pin!(shutdown);
        loop {
            let deadline = coordinator.pending_deadline();
            tokio::select! {
                _ = &mut shutdown => break,
                Some(tick) = tick_rx.recv() => {
                    sink.present(&self.build(&mut coordinator));
                    if self.config.send_notifications {
                        if let Some(notification) = tick.boundary.notification() {
                            notifier.notify(notification);
                        }
                    }
                }
                Some(event) = events.recv() => {
                    if coordinator.accept(event) {
                        sink.present(&self.build(&mut coordinator));
                    }
                }
                _ = wait_until(deadline) => {
                    sink.present(&self.build(&mut coordinator));
                }
            }
        }

        let state = scheduler.stop().await;
        drop(coordinator);
        drop(events);
        if let Err(err) = worker.await {
            warn!("calendar worker ended abnormally: {err}");
        }
        info!("clock stopped");
        Ok(state)
    }

    /// Renders once, waiting for the calendar worker up to the request timeout.
    pub async fn snapshot(&self) -> DisplayModel {
        let CalendarWorker {
            requests,
            mut events,
            task: worker,
        } = spawn_calendar_worker(Arc::clone(&self.converter));
        let mut coordinator = self.coordinator(requests);
        let mut model = self.build(&mut coordinator);

        if let Some(deadline) = coordinator.pending_deadline() {
            match tokio::time::timeout_at(deadline, events.recv()).await {
                Ok(Some(event)) => {
                    if coordinator.accept(event) {
                        model = self.build(&mut coordinator);
                    }
                }
                Ok(None) => warn!("calendar worker stopped before answering"),
                Err(_) => model = self.build(&mut coordinator),
            }
        }

        drop(coordinator);
        drop(events);
        let _ = worker.await;
        model
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
