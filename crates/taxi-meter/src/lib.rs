//! # taxi-meter: Live Trip Engine for the Taxi Meter
//!
//! This crate runs the meter: a single tokio task that owns the trip, fed by
//! a trip clock and a distance source, controlled and observed through a
//! cloneable handle.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Meter Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Meter (actor task)                          │  │
//! │  │                                                                  │  │
//! │  │  Owns TripState, applies commands and events one at a time,     │  │
//! │  │  recomputes the fare via taxi-core, publishes on a watch        │  │
//! │  └───────▲──────────────────────▲─────────────────────┬──────────┘  │
//! │          │ TickSink             │ DistanceSink        │ TripState    │
//! │  ┌───────┴────────┐   ┌─────────┴────────────┐   ┌────▼───────────┐  │
//! │  │  TripClock     │   │  DistanceSource      │   │  MeterHandle   │  │
//! │  │                │   │                      │   │                │  │
//! │  │ IntervalClock  │   │ PositionDistance-    │   │ toggle/reset   │  │
//! │  │ (tokio timer)  │   │ Source (GPS fixes)   │   │ snapshot/sub.  │  │
//! │  └────────────────┘   └──────────────────────┘   └────────────────┘  │
//! │                                                                         │
//! │  WallClock (time.rs) answers "day or night?" at each recomputation.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`meter`] - `Meter` actor, `MeterHandle`, `MeterBuilder`
//! - [`clock`] - `TripClock` trait and the interval-driven clock
//! - [`distance`] - `DistanceSource` trait and the position-fix source
//! - [`event`] - Per-run event queue and typed sinks
//! - [`time`] - Wall clock used for rate resolution
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Meter error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taxi_meter::{MeterBuilder, MeterConfig, PositionDistanceSource};
//!
//! let config = MeterConfig::load_or_default(None);
//! let source = PositionDistanceSource::from_settings(&config.tracking);
//! let feed = source.feed();
//!
//! let (meter, handle) = MeterBuilder::from_config(&config)
//!     .with_distance_source(source)
//!     .build()?;
//! meter.spawn();
//!
//! handle.toggle().await?;
//! println!("{:.2}", handle.snapshot().total_fare());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod config;
pub mod distance;
pub mod error;
pub mod event;
pub mod meter;
pub mod time;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{IntervalClock, TripClock};
pub use config::{ClockSettings, DeviceConfig, MeterConfig, TrackingSettings};
pub use distance::{DistanceSource, PositionDistanceSource, PositionFeed};
pub use error::{MeterError, MeterResult};
pub use event::{DistanceSink, MeterEvent, TickSink};
pub use meter::{Meter, MeterBuilder, MeterHandle};
pub use time::{FixedClock, LocalClock, WallClock};
