//! # Meter Events
//!
//! The per-run event queue shared by the trip clock and the distance source.
//!
//! ## One Queue, Two Producers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  TripClock ──── TickSink ─────┐                                         │
//! │                               ├──► mpsc<MeterEvent> ──► Meter actor     │
//! │  DistanceSource ─ DistanceSink┘     (arrival order)     (one at a time) │
//! │                                                                         │
//! │  start  → fresh channel, sinks handed to the collaborators              │
//! │  stop   → receiver dropped FIRST, then collaborators told to stop       │
//! │  reset  → same as stop; queued and late events fail to deliver          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sinks are typed so a clock can only tick and a distance source can only
//! report distance. Sends are awaited on a bounded channel: a slow meter
//! applies back-pressure instead of dropping events.

use tokio::sync::mpsc;

use crate::error::{MeterError, MeterResult};

/// Default capacity of the per-run event queue.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// An event produced by one of the meter's collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeterEvent {
    /// One second of trip time has passed.
    Tick,

    /// Cumulative kilometres since the distance source was last reset.
    Distance(f64),
}

// =============================================================================
// Sinks
// =============================================================================

/// Write end handed to a [`TripClock`](crate::clock::TripClock).
#[derive(Debug, Clone)]
pub struct TickSink {
    tx: mpsc::Sender<MeterEvent>,
}

impl TickSink {
    /// Delivers one tick.
    ///
    /// Fails with [`MeterError::RunEnded`] once the run has been stopped or
    /// reset; the clock should stop producing at that point.
    pub async fn tick(&self) -> MeterResult<()> {
        self.tx
            .send(MeterEvent::Tick)
            .await
            .map_err(|_| MeterError::RunEnded)
    }

    /// Returns true if the run this sink belongs to is over.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Write end handed to a [`DistanceSource`](crate::distance::DistanceSource).
#[derive(Debug, Clone)]
pub struct DistanceSink {
    tx: mpsc::Sender<MeterEvent>,
}

impl DistanceSink {
    /// Delivers a cumulative distance reading in kilometres.
    pub async fn update(&self, distance_km: f64) -> MeterResult<()> {
        self.tx
            .send(MeterEvent::Distance(distance_km))
            .await
            .map_err(|_| MeterError::RunEnded)
    }

    /// Returns true if the run this sink belongs to is over.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Creates the queue for one run: both sinks plus the actor's receiver.
pub(crate) fn run_channel(capacity: usize) -> (TickSink, DistanceSink, mpsc::Receiver<MeterEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let ticks = TickSink { tx: tx.clone() };
    let distances = DistanceSink { tx };
    (ticks, distances, rx)
}
