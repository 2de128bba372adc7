//! Single-entry cache for the converted calendar date.
//!
//! The cache moves through `Empty -> Pending -> Populated` per (day, format).
//! Only one request is outstanding at a time; a new day or format discards
//! whatever was held before.

use std::time::Duration;

use shared::domain::{DayKey, HebrewDateFormat};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub day: DayKey,
    pub format: HebrewDateFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCacheEntry {
    pub for_date: DayKey,
    pub format: HebrewDateFormat,
    pub rendered_text: String,
}

impl CalendarCacheEntry {
    pub fn key(&self) -> CacheKey {
        CacheKey {
            day: self.for_date,
            format: self.format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Pending {
        key: CacheKey,
        requested_at: Instant,
        attempts: u32,
    },
    Populated(CalendarCacheEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit(String),
    /// A request for this key is in flight; `attempts` counts retries after timeouts.
    Pending { attempts: u32 },
    /// The in-flight request outlived the timeout.
    TimedOut { attempts: u32 },
    Miss,
}

#[derive(Debug)]
pub struct CalendarCache {
    state: CacheState,
    timeout: Duration,
}

impl CalendarCache {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: CacheState::Empty,
            timeout,
        }
    }

    pub fn state(&self) -> &CacheState {
        &self.state
    }

    pub fn lookup(&self, key: CacheKey, now: Instant) -> Lookup {
        match &self.state {
            CacheState::Populated(entry) if entry.key() == key => {
                Lookup::Hit(entry.rendered_text.clone())
            }
            CacheState::Pending {
                key: pending,
                requested_at,
                attempts,
            } if *pending == key => {
                if now.saturating_duration_since(*requested_at) >= self.timeout {
                    Lookup::TimedOut {
                        attempts: *attempts,
                    }
                } else {
                    Lookup::Pending {
                        attempts: *attempts,
                    }
                }
            }
            _ => Lookup::Miss,
        }
    }

    /// Records that a request for `key` was just sent. A stale entry or a
    /// pending request for another key is dropped.
    pub fn mark_pending(&mut self, key: CacheKey, now: Instant) {
        let attempts = match &self.state {
            CacheState::Pending {
                key: pending,
                attempts,
                ..
            } if *pending == key => attempts + 1,
            _ => 1,
        };
        self.state = CacheState::Pending {
            key,
            requested_at: now,
            attempts,
        };
    }

    /// Stores a converter result if it answers the outstanding request.
    pub fn complete(&mut self, entry: CalendarCacheEntry) -> bool {
        match &self.state {
            CacheState::Pending { key, .. } if *key == entry.key() => {
                self.state = CacheState::Populated(entry);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.state = CacheState::Empty;
    }

    /// When the outstanding request, if any, times out.
    pub fn pending_deadline(&self) -> Option<Instant> {
        match &self.state {
            CacheState::Pending { requested_at, .. } => Some(*requested_at + self.timeout),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
