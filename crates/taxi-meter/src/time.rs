//! # Wall Clock
//!
//! Source of "now" for day/night rate resolution.
//!
//! Not to be confused with the [`TripClock`](crate::clock::TripClock): the
//! trip clock counts ticks for the time fare, the wall clock only answers
//! which rate set is in force.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDateTime};

/// Provides the current local date and time.
pub trait WallClock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// The system's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl WallClock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A wall clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one clone and move the
/// meter's clock across a rate boundary mid-trip.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        FixedClock {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl WallClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
