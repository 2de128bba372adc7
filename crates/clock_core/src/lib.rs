//! Drift-corrected clock with an asynchronously converted Hebrew date.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod scheduler;
pub mod service;
pub mod time_source;
pub mod worker;

pub use cache::{CacheKey, CacheState, CalendarCache, CalendarCacheEntry};
pub use config::{load_settings, DisplayConfig, Settings};
pub use coordinator::{DisplayModel, RenderCoordinator, RenderError, LOADING_TEXT};
pub use scheduler::{Boundary, ClockState, DriftCorrectedScheduler, SchedulerHandle, Tick};
pub use service::{ClockService, NotificationSink, RenderSink};
pub use time_source::{DisplayZone, ManualTimeSource, SystemTimeSource, TimeSource};
