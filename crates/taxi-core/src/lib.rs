//! # taxi-core: Pure Fare Logic for the Taxi Meter
//!
//! This crate is the arithmetic heart of the meter. It contains the rate
//! schedule, the fare formula and the distance math as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Taxi Meter Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (meter-cli, ...)                   │   │
//! │  │        toggle() / reset()        subscribe() → TripState        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            taxi-meter (actor, clock, distance source)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ taxi-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ schedule  │  │   fare    │  │    geo    │  │   │
//! │  │   │ TripState │  │ resolve() │  │accumulate │  │ haversine │  │   │
//! │  │   │ RateSet   │  │ describe()│  │           │  │ Distance  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  │Accumulator│  │   │
//! │  │                                                 └───────────┘  │   │
//! │  │   NO I/O • NO CLOCK READS • NO ASYNC • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (RateSet, RateSchedule, FareBreakdown, TripState)
//! - [`schedule`] - Day/night rate resolution
//! - [`fare`] - Fare accumulation
//! - [`geo`] - Great-circle distance accumulation from position fixes
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveTime;
//! use taxi_core::fare::{accumulate, elapsed_minutes};
//! use taxi_core::{RateSchedule, RateSet};
//!
//! let schedule = RateSchedule {
//!     day: RateSet::new(30.0, 10.0, 2.0),
//!     ..RateSchedule::default()
//! };
//!
//! let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
//! let params = schedule.resolve(&noon);
//! let fare = accumulate(0.5, elapsed_minutes(1), &params);
//!
//! assert!(!fare.is_night_rate);
//! assert!((fare.total_fare - 35.033).abs() < 1e-3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fare;
pub mod geo;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use geo::{DistanceAccumulator, GeoPoint, PositionFix};
pub use types::*;
