//! # Trip Clock
//!
//! Produces the once-per-second tick stream while the meter is running.
//!
//! ## Tick Timing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  start_ticking()                                                        │
//! │      │                                                                  │
//! │      ├── 1000ms ──► Tick ──► elapsed_seconds = 1                        │
//! │      ├── 1000ms ──► Tick ──► elapsed_seconds = 2                        │
//! │      ├── 1000ms ──► Tick ──► elapsed_seconds = 3                        │
//! │      ▼                                                                  │
//! │  stop_ticking()  (task aborted, no further ticks)                       │
//! │                                                                         │
//! │  The first tick fires one period AFTER start, never immediately.        │
//! │  Missed ticks are delayed, not burst: a stalled runtime does not        │
//! │  replay ten ticks at once. Elapsed time is tick COUNT, so drift in      │
//! │  the spacing never distorts the fare.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::ClockSettings;
use crate::event::TickSink;

/// Default tick period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

// =============================================================================
// Trip Clock Trait
// =============================================================================

/// The meter's time source.
///
/// Implementations must be non-blocking: `start_ticking` spawns or arms
/// whatever produces ticks and returns, `stop_ticking` requests teardown
/// and returns without waiting for it.
pub trait TripClock: Send + 'static {
    /// Begins delivering ticks into `sink`. Replaces any previous stream.
    fn start_ticking(&mut self, sink: TickSink);

    /// Stops delivering ticks.
    fn stop_ticking(&mut self);
}

// =============================================================================
// Interval Clock
// =============================================================================

/// Trip clock backed by a `tokio::time::interval` task.
#[derive(Debug)]
pub struct IntervalClock {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Default for IntervalClock {
    fn default() -> Self {
        IntervalClock::new(DEFAULT_TICK_INTERVAL)
    }
}

impl IntervalClock {
    /// Creates a clock that ticks every `period`.
    pub fn new(period: Duration) -> Self {
        IntervalClock { period, task: None }
    }

    /// Creates a clock from the `[clock]` config section.
    pub fn from_settings(settings: &ClockSettings) -> Self {
        IntervalClock::new(settings.tick_interval())
    }

    /// Returns true while a tick task is alive.
    pub fn is_ticking(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    async fn run(period: Duration, sink: TickSink) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            if sink.is_closed() || sink.tick().await.is_err() {
                debug!("Tick sink closed, clock task exiting");
                break;
            }
        }
    }
}

impl TripClock for IntervalClock {
    fn start_ticking(&mut self, sink: TickSink) {
        self.stop_ticking();

        info!(period_ms = self.period.as_millis() as u64, "Trip clock started");
        self.task = Some(tokio::spawn(Self::run(self.period, sink)));
    }

    fn stop_ticking(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Trip clock stopped");
        }
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{run_channel, MeterEvent};

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (ticks, _distances, mut rx) = run_channel(16);
        let mut clock = IntervalClock::new(Duration::from_secs(1));

        clock.start_ticking(ticks);
        assert!(clock.is_ticking());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        clock.stop_ticking();
        assert!(!clock.is_ticking());

        let mut count = 0;
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event, MeterEvent::Tick);
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_immediate_tick_on_start() {
        let (ticks, _distances, mut rx) = run_channel(16);
        let mut clock = IntervalClock::default();

        clock.start_ticking(ticks);
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv().ok(), Some(MeterEvent::Tick));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_stop() {
        let (ticks, _distances, mut rx) = run_channel(16);
        let mut clock = IntervalClock::new(Duration::from_millis(100));

        clock.start_ticking(ticks);
        tokio::time::sleep(Duration::from_millis(250)).await;
        clock.stop_ticking();

        let before = std::iter::from_fn(|| rx.try_recv().ok()).count();
        tokio::time::sleep(Duration::from_secs(5)).await;
        let after = std::iter::from_fn(|| rx.try_recv().ok()).count();

        assert_eq!(before, 2);
        assert_eq!(after, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_task_exits_when_run_ends() {
        let (ticks, _distances, rx) = run_channel(16);
        let mut clock = IntervalClock::new(Duration::from_millis(100));

        clock.start_ticking(ticks);
        drop(rx);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!clock.is_ticking());
    }
}
