use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),
    #[error("invalid time format {0}: expected 12 or 24")]
    InvalidTimeFormat(u8),
    #[error("invalid hebrew date format '{0}': expected full, short or dayOnly")]
    InvalidHebrewDateFormat(String),
    #[error("invalid date pattern '{0}'")]
    InvalidDatePattern(String),
    #[error("request timeout of {0}ms is below the {1}ms minimum")]
    RequestTimeoutTooShort(u64, u64),
    #[error("calendar worker channel closed")]
    WorkerChannelClosed,
    #[error("calendar worker queue is full")]
    WorkerQueueFull,
}
