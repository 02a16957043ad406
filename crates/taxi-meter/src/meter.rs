//! # Meter State Machine
//!
//! The single task that owns the live [`TripState`].
//!
//! ## Actor Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Meter Actor                                   │
//! │                                                                         │
//! │  MeterHandle ── (command, reply) ──┐                                    │
//! │  (any task, cloneable)             │  biased select                     │
//! │                                    ▼                                    │
//! │                             ┌─────────────┐                             │
//! │  TickSink ─────┐            │   Meter     │ ── watch<TripState> ──► UI  │
//! │                ├─ events ──►│ owns state  │                             │
//! │  DistanceSink ─┘  (per run) │ one at once │                             │
//! │                             └─────────────┘                             │
//! │                                                                         │
//! │  Commands are polled first, so a stop or reset that is already queued   │
//! │  wins over pending ticks. The event receiver only exists while Running. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Transitions
//! ```text
//!            start / toggle
//!     ┌────────┐ ─────────────► ┌─────────┐
//!     │  Idle  │                │ Running │ ◄── tick, distance
//!     └────────┘ ◄───────────── └─────────┘
//!        ▲  │     stop / toggle      │
//!        │  │ reset                  │ reset
//!        └──┘◄───────────────────────┘
//! ```

use std::sync::Arc;

use taxi_core::fare::accumulate;
use taxi_core::validation::{validate_distance, validate_schedule};
use taxi_core::{RateSchedule, TripState};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::{IntervalClock, TripClock};
use crate::config::MeterConfig;
use crate::distance::DistanceSource;
use crate::error::{MeterError, MeterResult};
use crate::event::{run_channel, MeterEvent, DEFAULT_EVENT_CAPACITY};
use crate::time::{LocalClock, WallClock};

/// Capacity of the command queue.
const COMMAND_CAPACITY: usize = 16;

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeterCommand {
    Start,
    Stop,
    Toggle,
    Reset,
    Shutdown,
}

type CommandEnvelope = (MeterCommand, oneshot::Sender<TripState>);

// =============================================================================
// Meter
// =============================================================================

/// The meter state machine. Build with [`MeterBuilder`], then run it with
/// [`Meter::spawn`] and drive it through the [`MeterHandle`].
pub struct Meter {
    schedule: RateSchedule,
    state: TripState,
    clock: Box<dyn TripClock>,
    distance: Box<dyn DistanceSource>,
    wall_clock: Arc<dyn WallClock>,
    event_capacity: usize,
    events: Option<mpsc::Receiver<MeterEvent>>,
    commands: mpsc::Receiver<CommandEnvelope>,
    state_tx: watch::Sender<TripState>,
}

impl Meter {
    /// Spawns the actor on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs the actor until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!(rate = %self.state.rate_info_text, "Meter started");

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    match command {
                        Some((MeterCommand::Shutdown, reply)) => {
                            self.stop();
                            let _ = reply.send(self.state.clone());
                            break;
                        }
                        Some((command, reply)) => {
                            self.apply(command);
                            let _ = reply.send(self.state.clone());
                        }
                        None => {
                            debug!("All meter handles dropped");
                            self.stop();
                            break;
                        }
                    }
                }

                event = next_event(&mut self.events) => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            debug!("Both event producers have gone away");
                            self.events = None;
                        }
                    }
                }
            }
        }

        info!("Meter stopped");
    }

    fn apply(&mut self, command: MeterCommand) {
        match command {
            MeterCommand::Start => self.start(),
            MeterCommand::Stop => self.stop(),
            MeterCommand::Toggle => {
                if self.state.running {
                    self.stop();
                } else {
                    self.start();
                }
            }
            MeterCommand::Reset => self.reset(),
            MeterCommand::Shutdown => {}
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn start(&mut self) {
        if self.state.running {
            debug!("Start ignored, meter already running");
            return;
        }

        let (ticks, distances, events) = run_channel(self.event_capacity);
        self.events = Some(events);
        self.clock.start_ticking(ticks);
        self.distance.start_tracking(distances);

        self.state.running = true;
        info!(
            elapsed_seconds = self.state.elapsed_seconds,
            distance_km = self.state.distance_km,
            "Meter running"
        );
        self.publish();
    }

    fn stop(&mut self) {
        if !self.state.running {
            return;
        }

        self.halt_streams();
        self.state.running = false;
        info!(
            elapsed_seconds = self.state.elapsed_seconds,
            distance_km = self.state.distance_km,
            total_fare = self.state.total_fare(),
            "Meter stopped running"
        );
        self.publish();
    }

    fn reset(&mut self) {
        if self.state.running {
            self.halt_streams();
        }

        self.distance.reset_accumulator();
        self.state.clear_counters();
        info!("Meter reset");
        self.recompute();
    }

    /// Drops the run's receiver before stopping the producers, so anything
    /// still queued or sent late is discarded.
    fn halt_streams(&mut self) {
        self.events = None;
        self.clock.stop_ticking();
        self.distance.stop_tracking();
    }

    // =========================================================================
    // Events
    // =========================================================================

    fn handle_event(&mut self, event: MeterEvent) {
        match event {
            MeterEvent::Tick => {
                self.state.elapsed_seconds += 1;
            }
            MeterEvent::Distance(distance_km) => {
                if let Err(e) = validate_distance(distance_km) {
                    warn!(distance_km, error = %e, "Rejected distance reading");
                    return;
                }
                if distance_km < self.state.distance_km {
                    warn!(
                        distance_km,
                        current_km = self.state.distance_km,
                        "Rejected decreasing distance reading"
                    );
                    return;
                }
                self.state.distance_km = distance_km;
            }
        }

        self.recompute();
    }

    fn recompute(&mut self) {
        let params = self.schedule.resolve(&self.wall_clock.now());
        let fare = accumulate(self.state.distance_km, self.state.elapsed_minutes(), &params);

        self.state.fare_breakdown = Some(fare);
        self.state.rate_info_text = self.schedule.describe(&params);

        debug!(
            elapsed_seconds = self.state.elapsed_seconds,
            distance_km = self.state.distance_km,
            total_fare = fare.total_fare,
            night = fare.is_night_rate,
            "Fare recomputed"
        );
        self.publish();
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

async fn next_event(events: &mut Option<mpsc::Receiver<MeterEvent>>) -> Option<MeterEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// Meter Handle
// =============================================================================

/// Cloneable handle for the presentation layer.
///
/// Command methods resolve once the actor has applied the command and
/// return the resulting state.
#[derive(Debug, Clone)]
pub struct MeterHandle {
    commands: mpsc::Sender<CommandEnvelope>,
    state: watch::Receiver<TripState>,
}

impl MeterHandle {
    async fn send(&self, command: MeterCommand) -> MeterResult<TripState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send((command, reply_tx))
            .await
            .map_err(|_| MeterError::ShuttingDown)?;
        reply_rx.await.map_err(|_| MeterError::ShuttingDown)
    }

    /// Starts the meter. No-op if already running.
    pub async fn start(&self) -> MeterResult<TripState> {
        self.send(MeterCommand::Start).await
    }

    /// Stops the meter, keeping the trip. No-op if idle.
    pub async fn stop(&self) -> MeterResult<TripState> {
        self.send(MeterCommand::Stop).await
    }

    /// Starts when idle, stops when running.
    pub async fn toggle(&self) -> MeterResult<TripState> {
        self.send(MeterCommand::Toggle).await
    }

    /// Ends the trip and zeroes the counters.
    pub async fn reset(&self) -> MeterResult<TripState> {
        self.send(MeterCommand::Reset).await
    }

    /// Stops the meter and ends the actor. Returns the final state.
    pub async fn shutdown(&self) -> MeterResult<TripState> {
        self.send(MeterCommand::Shutdown).await
    }

    /// The latest published state.
    pub fn snapshot(&self) -> TripState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every published state change.
    pub fn subscribe(&self) -> watch::Receiver<TripState> {
        let mut rx = self.state.clone();
        rx.borrow_and_update();
        rx
    }

    /// Returns true if the latest published state is running.
    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a [`Meter`] and its [`MeterHandle`].
pub struct MeterBuilder {
    schedule: RateSchedule,
    clock: Option<Box<dyn TripClock>>,
    distance: Option<Box<dyn DistanceSource>>,
    wall_clock: Arc<dyn WallClock>,
    event_capacity: usize,
}

impl MeterBuilder {
    /// Creates a new builder with the given schedule.
    pub fn new(schedule: RateSchedule) -> Self {
        MeterBuilder {
            schedule,
            clock: None,
            distance: None,
            wall_clock: Arc::new(LocalClock),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Creates a builder with the configured schedule and an
    /// [`IntervalClock`] at the configured tick period.
    pub fn from_config(config: &MeterConfig) -> Self {
        MeterBuilder::new(config.schedule().clone()).with_clock(IntervalClock::from_settings(&config.clock))
    }

    /// Sets the trip clock.
    pub fn with_clock(mut self, clock: impl TripClock) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Sets the distance source.
    pub fn with_distance_source(mut self, source: impl DistanceSource) -> Self {
        self.distance = Some(Box::new(source));
        self
    }

    /// Sets the wall clock used for day/night resolution.
    pub fn with_wall_clock(mut self, wall_clock: impl WallClock) -> Self {
        self.wall_clock = Arc::new(wall_clock);
        self
    }

    /// Sets the per-run event queue capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Builds the meter in the Idle state.
    pub fn build(self) -> MeterResult<(Meter, MeterHandle)> {
        validate_schedule(&self.schedule)?;

        let clock = self
            .clock
            .ok_or_else(|| MeterError::InvalidConfig("Trip clock required".into()))?;
        let distance = self
            .distance
            .ok_or_else(|| MeterError::InvalidConfig("Distance source required".into()))?;

        let state = TripState::new(self.schedule.describe_at(&self.wall_clock.now()));
        let (state_tx, state_rx) = watch::channel(state.clone());
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);

        let meter = Meter {
            schedule: self.schedule,
            state,
            clock,
            distance,
            wall_clock: self.wall_clock,
            event_capacity: self.event_capacity,
            events: None,
            commands: command_rx,
            state_tx,
        };

        let handle = MeterHandle {
            commands: command_tx,
            state: state_rx,
        };

        Ok((meter, handle))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DistanceSink, TickSink};
    use crate::time::FixedClock;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Mutex;
    use std::time::Duration;
    use taxi_core::{CoreError, RateSet};

    // =========================================================================
    // Test doubles
    // =========================================================================

    struct ProbeState<S> {
        sink: Option<S>,
        starts: usize,
        stops: usize,
        resets: usize,
    }

    /// Collaborator that records calls and hands its sink to the test.
    #[derive(Clone)]
    struct Probe<S>(Arc<Mutex<ProbeState<S>>>);

    impl<S: Clone> Probe<S> {
        fn new() -> Self {
            Probe(Arc::new(Mutex::new(ProbeState {
                sink: None,
                starts: 0,
                stops: 0,
                resets: 0,
            })))
        }

        fn sink(&self) -> S {
            self.0.lock().unwrap().sink.clone().expect("never started")
        }

        fn starts(&self) -> usize {
            self.0.lock().unwrap().starts
        }

        fn stops(&self) -> usize {
            self.0.lock().unwrap().stops
        }

        fn resets(&self) -> usize {
            self.0.lock().unwrap().resets
        }

        fn started(&self, sink: S) {
            let mut state = self.0.lock().unwrap();
            state.sink = Some(sink);
            state.starts += 1;
        }

        fn stopped(&self) {
            self.0.lock().unwrap().stops += 1;
        }
    }

    impl TripClock for Probe<TickSink> {
        fn start_ticking(&mut self, sink: TickSink) {
            self.started(sink);
        }

        fn stop_ticking(&mut self) {
            self.stopped();
        }
    }

    impl DistanceSource for Probe<DistanceSink> {
        fn start_tracking(&mut self, sink: DistanceSink) {
            self.started(sink);
        }

        fn stop_tracking(&mut self) {
            self.stopped();
        }

        fn reset_accumulator(&mut self) {
            self.0.lock().unwrap().resets += 1;
        }
    }

    struct Rig {
        handle: MeterHandle,
        task: JoinHandle<()>,
        clock: Probe<TickSink>,
        source: Probe<DistanceSink>,
        wall: FixedClock,
    }

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn city_schedule() -> RateSchedule {
        RateSchedule {
            day: RateSet::new(30.0, 10.0, 2.0),
            night: RateSet::new(45.0, 15.0, 3.0),
            ..RateSchedule::default()
        }
    }

    fn rig_at(now: NaiveDateTime) -> Rig {
        let clock = Probe::new();
        let source = Probe::new();
        let wall = FixedClock::new(now);

        let (meter, handle) = MeterBuilder::new(city_schedule())
            .with_clock(clock.clone())
            .with_distance_source(source.clone())
            .with_wall_clock(wall.clone())
            .build()
            .unwrap();

        Rig {
            handle,
            task: meter.spawn(),
            clock,
            source,
            wall,
        }
    }

    fn rig() -> Rig {
        rig_at(at(12, 0, 0))
    }

    async fn wait_until(handle: &MeterHandle, condition: impl FnMut(&TripState) -> bool) -> TripState {
        let mut rx = handle.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(condition))
            .await
            .expect("timed out waiting for meter state")
            .expect("meter gone")
            .clone();
        state
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[tokio::test]
    async fn test_initial_state() {
        let rig = rig();
        let state = rig.handle.snapshot();

        assert!(!state.running);
        assert_eq!(state.elapsed_seconds, 0);
        assert_eq!(state.distance_km, 0.0);
        assert!(state.fare_breakdown.is_none());
        assert!(state.rate_info_text.starts_with("Day rate"));
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result = MeterBuilder::new(city_schedule())
            .with_distance_source(Probe::<DistanceSink>::new())
            .build();
        assert!(matches!(result, Err(MeterError::InvalidConfig(_))));

        let result = MeterBuilder::new(city_schedule())
            .with_clock(Probe::<TickSink>::new())
            .build();
        assert!(matches!(result, Err(MeterError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_rejects_invalid_schedule() {
        let schedule = RateSchedule {
            night_end_hour: 30,
            ..city_schedule()
        };
        let result = MeterBuilder::new(schedule)
            .with_clock(Probe::<TickSink>::new())
            .with_distance_source(Probe::<DistanceSink>::new())
            .build();
        assert!(matches!(result, Err(MeterError::Core(CoreError::Validation(_)))));
    }

    // =========================================================================
    // Fare accumulation
    // =========================================================================

    #[tokio::test]
    async fn test_one_tick_and_half_km_at_day_rate() {
        let rig = rig();

        let state = rig.handle.start().await.unwrap();
        assert!(state.running);

        rig.clock.sink().tick().await.unwrap();
        rig.source.sink().update(0.5).await.unwrap();

        let state = wait_until(&rig.handle, |s| s.distance_km == 0.5).await;
        let fare = state.fare_breakdown.unwrap();

        assert_eq!(state.elapsed_seconds, 1);
        assert_eq!(fare.start_fare, 30.0);
        assert!((fare.distance_fare - 5.0).abs() < 1e-9);
        assert!((fare.time_fare - 2.0 / 60.0).abs() < 1e-9);
        assert!((fare.total_fare - 35.033).abs() < 1e-3);
        assert!(!fare.is_night_rate);
        assert_eq!(
            fare.total_fare,
            fare.start_fare + fare.distance_fare + fare.time_fare
        );
    }

    #[tokio::test]
    async fn test_rate_switches_at_night_start() {
        let rig = rig_at(at(16, 59, 59));
        rig.handle.start().await.unwrap();

        rig.clock.sink().tick().await.unwrap();
        let state = wait_until(&rig.handle, |s| s.elapsed_seconds == 1).await;
        assert!(!state.fare_breakdown.unwrap().is_night_rate);
        assert!(state.rate_info_text.starts_with("Day rate"));

        rig.wall.set(at(17, 0, 0));
        rig.clock.sink().tick().await.unwrap();
        let state = wait_until(&rig.handle, |s| s.elapsed_seconds == 2).await;
        let fare = state.fare_breakdown.unwrap();

        assert!(fare.is_night_rate);
        assert_eq!(fare.start_fare, 45.0);
        assert!(state.rate_info_text.starts_with("Night rate (17:00-06:00)"));
    }

    #[tokio::test]
    async fn test_invalid_distance_readings_rejected() {
        let rig = rig();
        rig.handle.start().await.unwrap();
        let distances = rig.source.sink();

        distances.update(0.5).await.unwrap();
        distances.update(-1.0).await.unwrap();
        distances.update(f64::NAN).await.unwrap();
        distances.update(0.2).await.unwrap();
        rig.clock.sink().tick().await.unwrap();

        let state = wait_until(&rig.handle, |s| s.elapsed_seconds == 1).await;
        assert_eq!(state.distance_km, 0.5);

        distances.update(0.7).await.unwrap();
        let state = wait_until(&rig.handle, |s| s.distance_km == 0.7).await;
        assert!((state.fare_breakdown.unwrap().distance_fare - 7.0).abs() < 1e-9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_producers_are_serialized() {
        let rig = rig();
        rig.handle.start().await.unwrap();

        let ticks = rig.clock.sink();
        let distances = rig.source.sink();

        let tick_task = tokio::spawn(async move {
            for _ in 0..100 {
                ticks.tick().await.unwrap();
            }
        });
        let distance_task = tokio::spawn(async move {
            for i in 1..=100 {
                distances.update(i as f64 * 0.01).await.unwrap();
            }
        });
        tick_task.await.unwrap();
        distance_task.await.unwrap();

        let state = wait_until(&rig.handle, |s| {
            s.elapsed_seconds == 100 && (s.distance_km - 1.0).abs() < 1e-9
        })
        .await;
        let fare = state.fare_breakdown.unwrap();

        // 30 + 1 km * 10 + 100/60 min * 2
        assert!((fare.total_fare - (30.0 + 10.0 + 100.0 / 60.0 * 2.0)).abs() < 1e-9);
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let rig = rig();

        rig.handle.start().await.unwrap();
        rig.handle.start().await.unwrap();

        assert_eq!(rig.clock.starts(), 1);
        assert_eq!(rig.source.starts(), 1);
        assert!(rig.handle.is_running());
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let rig = rig();
        let before = rig.handle.snapshot();

        let after = rig.handle.stop().await.unwrap();

        assert_eq!(before, after);
        assert_eq!(rig.clock.stops(), 0);
    }

    #[tokio::test]
    async fn test_toggle_twice_returns_to_idle() {
        let rig = rig();
        let before = rig.handle.snapshot();

        let running = rig.handle.toggle().await.unwrap();
        assert!(running.running);

        let idle = rig.handle.toggle().await.unwrap();
        assert_eq!(idle, before);
        assert_eq!(rig.clock.starts(), 1);
        assert_eq!(rig.clock.stops(), 1);
        assert_eq!(rig.source.stops(), 1);
    }

    #[tokio::test]
    async fn test_stop_keeps_trip_and_discards_late_events() {
        let rig = rig();
        rig.handle.start().await.unwrap();

        rig.clock.sink().tick().await.unwrap();
        rig.clock.sink().tick().await.unwrap();
        rig.source.sink().update(0.3).await.unwrap();
        let running = wait_until(&rig.handle, |s| s.distance_km == 0.3).await;

        let stopped = rig.handle.stop().await.unwrap();
        assert!(!stopped.running);
        assert_eq!(stopped.elapsed_seconds, 2);
        assert_eq!(stopped.distance_km, 0.3);
        assert_eq!(stopped.fare_breakdown, running.fare_breakdown);

        assert!(matches!(rig.clock.sink().tick().await, Err(MeterError::RunEnded)));
        assert_eq!(rig.handle.snapshot(), stopped);
    }

    #[tokio::test]
    async fn test_resume_continues_the_trip() {
        let rig = rig();
        rig.handle.start().await.unwrap();
        rig.clock.sink().tick().await.unwrap();
        wait_until(&rig.handle, |s| s.elapsed_seconds == 1).await;

        rig.handle.stop().await.unwrap();
        rig.handle.start().await.unwrap();
        rig.clock.sink().tick().await.unwrap();

        let state = wait_until(&rig.handle, |s| s.elapsed_seconds == 2).await;
        assert!(state.running);
        assert_eq!(rig.clock.starts(), 2);
    }

    #[tokio::test]
    async fn test_reset_while_running_discards_queued_events() {
        let rig = rig();
        rig.handle.start().await.unwrap();

        rig.clock.sink().tick().await.unwrap();
        rig.source.sink().update(1.2).await.unwrap();
        wait_until(&rig.handle, |s| s.distance_km == 1.2).await;

        // Queued but not yet processed when the reset lands.
        let ticks = rig.clock.sink();
        ticks.tick().await.unwrap();
        ticks.tick().await.unwrap();
        let state = rig.handle.reset().await.unwrap();

        assert!(!state.running);
        assert_eq!(state.elapsed_seconds, 0);
        assert_eq!(state.distance_km, 0.0);
        assert_eq!(state.total_fare(), 30.0);
        assert_eq!(rig.source.resets(), 1);
        assert_eq!(rig.clock.stops(), 1);

        assert!(matches!(ticks.tick().await, Err(MeterError::RunEnded)));
        tokio::task::yield_now().await;
        assert_eq!(rig.handle.snapshot(), state);
    }

    #[tokio::test]
    async fn test_reset_from_idle_shows_start_fare() {
        let rig = rig();

        let state = rig.handle.reset().await.unwrap();
        let fare = state.fare_breakdown.unwrap();

        assert!(!state.running);
        assert_eq!(fare.total_fare, fare.start_fare);
        assert_eq!(fare.start_fare, 30.0);
        assert_eq!(rig.clock.stops(), 0);
        assert_eq!(rig.source.resets(), 1);
    }

    #[tokio::test]
    async fn test_reset_uses_schedule_active_at_reset_time() {
        let rig = rig_at(at(16, 0, 0));
        rig.wall.set(at(22, 30, 0));

        let state = rig.handle.reset().await.unwrap();
        let fare = state.fare_breakdown.unwrap();

        assert!(fare.is_night_rate);
        assert_eq!(fare.total_fare, 45.0);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[tokio::test]
    async fn test_shutdown_stops_collaborators() {
        let rig = rig();
        rig.handle.start().await.unwrap();

        let last = rig.handle.shutdown().await.unwrap();
        rig.task.await.unwrap();

        assert!(!last.running);
        assert_eq!(rig.clock.stops(), 1);
        assert_eq!(rig.source.stops(), 1);
        assert!(matches!(rig.handle.start().await, Err(MeterError::ShuttingDown)));
        assert_eq!(rig.handle.snapshot(), last);
    }

    #[tokio::test]
    async fn test_actor_ends_when_handles_dropped() {
        let Rig { handle, task, .. } = rig();
        let other = handle.clone();
        drop(handle);
        drop(other);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("actor did not stop")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_clock_drives_elapsed_time() {
        let source = Probe::<DistanceSink>::new();
        let (meter, handle) = MeterBuilder::new(city_schedule())
            .with_clock(IntervalClock::new(Duration::from_secs(1)))
            .with_distance_source(source)
            .with_wall_clock(FixedClock::new(at(12, 0, 0)))
            .build()
            .unwrap();
        let _task = meter.spawn();

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        let state = wait_until(&handle, |s| s.elapsed_seconds == 3).await;
        assert!((state.fare_breakdown.unwrap().time_fare - 0.1).abs() < 1e-9);

        handle.stop().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(handle.snapshot().elapsed_seconds, 3);
    }
}
