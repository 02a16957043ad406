//! # Distance Source
//!
//! Turns a stream of position fixes into cumulative kilometres for the meter.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Positioning sensor                                                     │
//! │        │ PositionFeed::publish(fix)                                     │
//! │        ▼                                                                │
//! │  broadcast<PositionFix> ──► tracking task ──► DistanceAccumulator       │
//! │                                  │               (haversine, jitter     │
//! │                                  │                and accuracy filter)  │
//! │                                  ▼                                      │
//! │                      DistanceSink::update(total_km) ──► Meter           │
//! │                                                                         │
//! │  stop_tracking     → task aborted, anchor dropped, total KEPT           │
//! │  reset_accumulator → total and anchor cleared                           │
//! │                                                                         │
//! │  Every start, stop and reset bumps the run generation. A task that was  │
//! │  aborted mid-fix sees a newer generation under the lock and drops it.   │
//! │                                                                         │
//! │  Fixes published while not tracking have no subscriber and are lost,    │
//! │  so an idle meter never accrues distance.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taxi_core::{DistanceAccumulator, PositionFix};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::TrackingSettings;
use crate::event::DistanceSink;

/// Buffered fixes per subscriber before the tracking task starts lagging.
pub const DEFAULT_FIX_BUFFER: usize = 32;

// =============================================================================
// Distance Source Trait
// =============================================================================

/// The meter's distance collaborator.
///
/// Readings are cumulative since the last [`reset_accumulator`], not deltas.
/// `start_tracking` and `stop_tracking` must return without waiting for
/// background work.
///
/// [`reset_accumulator`]: DistanceSource::reset_accumulator
pub trait DistanceSource: Send + 'static {
    /// Begins delivering cumulative distance into `sink`.
    fn start_tracking(&mut self, sink: DistanceSink);

    /// Stops delivering distance. The accumulated total is kept.
    fn stop_tracking(&mut self);

    /// Zeroes the accumulated total.
    fn reset_accumulator(&mut self);
}

// =============================================================================
// Position Feed
// =============================================================================

/// Publishing end of the position stream, held by the sensor driver.
#[derive(Debug, Clone)]
pub struct PositionFeed {
    tx: broadcast::Sender<PositionFix>,
}

impl PositionFeed {
    /// Publishes one fix. Returns the number of trackers that received it.
    pub fn publish(&self, fix: PositionFix) -> usize {
        self.tx.send(fix).unwrap_or(0)
    }
}

// =============================================================================
// Shared Tracker State
// =============================================================================

/// The accumulator plus the generation of the run allowed to feed it.
#[derive(Debug)]
struct Tracker {
    accumulator: DistanceAccumulator,
    generation: u64,
}

impl Tracker {
    /// Ends the current run: its task may no longer push, and the next fix
    /// re-anchors.
    fn end_run(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.accumulator.detach();
        self.generation
    }
}

fn lock_tracker(tracker: &Mutex<Tracker>) -> MutexGuard<'_, Tracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Position Distance Source
// =============================================================================

/// Distance source that integrates great-circle distance between fixes.
#[derive(Debug)]
pub struct PositionDistanceSource {
    fixes: broadcast::Sender<PositionFix>,
    tracker: Arc<Mutex<Tracker>>,
    task: Option<JoinHandle<()>>,
}

impl Default for PositionDistanceSource {
    fn default() -> Self {
        PositionDistanceSource::new(DistanceAccumulator::default())
    }
}

impl PositionDistanceSource {
    /// Creates a source around the given accumulator.
    pub fn new(accumulator: DistanceAccumulator) -> Self {
        let (fixes, _) = broadcast::channel(DEFAULT_FIX_BUFFER);
        PositionDistanceSource {
            fixes,
            tracker: Arc::new(Mutex::new(Tracker {
                accumulator,
                generation: 0,
            })),
            task: None,
        }
    }

    /// Creates a source from the `[tracking]` config section.
    pub fn from_settings(settings: &TrackingSettings) -> Self {
        PositionDistanceSource::new(DistanceAccumulator::new(
            settings.min_step_m,
            settings.max_accuracy_m,
        ))
    }

    /// Returns a publishing handle for the positioning sensor.
    pub fn feed(&self) -> PositionFeed {
        PositionFeed {
            tx: self.fixes.clone(),
        }
    }

    /// Kilometres accumulated so far.
    pub fn total_km(&self) -> f64 {
        self.lock().accumulator.total_km()
    }

    /// Returns true while the tracking task is alive.
    pub fn is_tracking(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Tracker> {
        lock_tracker(&self.tracker)
    }

    async fn track(
        mut fixes: broadcast::Receiver<PositionFix>,
        tracker: Arc<Mutex<Tracker>>,
        generation: u64,
        sink: DistanceSink,
    ) {
        loop {
            match fixes.recv().await {
                Ok(fix) => {
                    if sink.is_closed() {
                        debug!("Run ended, tracking task exiting");
                        break;
                    }

                    // Guard must be released before the await below.
                    let total = {
                        let mut guard = lock_tracker(&tracker);
                        if guard.generation != generation {
                            debug!(generation, "Tracking run superseded, fix dropped");
                            break;
                        }
                        guard.accumulator.push(&fix)
                    };

                    if let Some(total_km) = total {
                        if sink.update(total_km).await.is_err() {
                            debug!("Distance sink closed, tracking task exiting");
                            break;
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Position tracking fell behind, fixes skipped");
                }
                Err(RecvError::Closed) => {
                    debug!("Position feed closed");
                    break;
                }
            }
        }
    }
}

impl DistanceSource for PositionDistanceSource {
    fn start_tracking(&mut self, sink: DistanceSink) {
        self.stop_tracking();

        let generation = self.lock().end_run();

        // Subscribe before returning so no fix published after start is missed.
        let fixes = self.fixes.subscribe();
        let tracker = Arc::clone(&self.tracker);

        info!(total_km = self.total_km(), generation, "Distance tracking started");
        self.task = Some(tokio::spawn(Self::track(fixes, tracker, generation, sink)));
    }

    fn stop_tracking(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.lock().end_run();
            info!(total_km = self.total_km(), "Distance tracking stopped");
        }
    }

    fn reset_accumulator(&mut self) {
        let mut tracker = self.lock();
        tracker.end_run();
        tracker.accumulator.reset();
        drop(tracker);
        debug!("Distance accumulator reset");
    }
}

impl Drop for PositionDistanceSource {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
