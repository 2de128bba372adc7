//! Calendar worker: converts dates off the render path and answers over a channel.

use std::sync::Arc;

use calendar::{CalendarConverter, UNAVAILABLE_TEXT};
use shared::protocol::{CalendarEvent, CalendarRequest};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

pub const WORKER_QUEUE_DEPTH: usize = 8;

pub struct CalendarWorker {
    pub requests: mpsc::Sender<CalendarRequest>,
    pub events: mpsc::Receiver<CalendarEvent>,
    pub task: JoinHandle<()>,
}

/// Spawns the worker task. It exits once every request sender is dropped or
/// the event receiver goes away.
pub fn spawn_calendar_worker(converter: Arc<dyn CalendarConverter>) -> CalendarWorker {
    let (request_tx, mut request_rx) = mpsc::channel::<CalendarRequest>(WORKER_QUEUE_DEPTH);
    let (event_tx, event_rx) = mpsc::channel::<CalendarEvent>(WORKER_QUEUE_DEPTH);

    let task = tokio::spawn(async move {
        info!("calendar worker started");
        while let Some(request) = request_rx.recv().await {
            let day = request.day();
            let format = request.format();
            debug!(%day, format = format.as_str(), "converting calendar date");

            let converter = Arc::clone(&converter);
            let event = match tokio::task::spawn_blocking(move || {
                calendar::handle_request(converter.as_ref(), &request)
            })
            .await
            {
                Ok(event) => event,
                Err(err) => {
                    warn!(%day, "calendar conversion aborted: {err}");
                    CalendarEvent::CalendarDateResult {
                        day,
                        format,
                        text: UNAVAILABLE_TEXT.to_string(),
                    }
                }
            };

            if event_tx.send(event).await.is_err() {
                break;
            }
        }
        info!("calendar worker stopped");
    });

    CalendarWorker {
        requests: request_tx,
        events: event_rx,
        task,
    }
}
