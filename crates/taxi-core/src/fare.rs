//! # Fare Accumulator
//!
//! Turns (distance, elapsed time, rates) into a [`FareBreakdown`].
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  distance_fare = distance_km     × per_km_rate                          │
//! │  time_fare     = elapsed_minutes × per_minute_rate                      │
//! │  total_fare    = start_fare + distance_fare + time_fare                 │
//! │                                                                         │
//! │  elapsed_minutes = elapsed_seconds / 60   (real, NOT truncated)         │
//! │                                                                         │
//! │  Second 1:  1/60 min × 2.00 = 0.0333...                                 │
//! │  Second 2:  2/60 min × 2.00 = 0.0666...                                 │
//! │  → time fare grows every tick, not in minute-sized steps                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Precision
//! Unlike cash register money, the meter never rounds internally. The
//! breakdown is recomputed from the raw counters on every event, so there
//! is no running sum to drift; rounding happens once, at display time.
//!
//! ## Usage
//! ```rust
//! use taxi_core::fare::{accumulate, elapsed_minutes};
//! use taxi_core::{RateParameters, RateSet};
//!
//! let params = RateParameters {
//!     rates: RateSet::new(30.0, 10.0, 2.0),
//!     is_night_rate: false,
//! };
//!
//! let fare = accumulate(0.5, elapsed_minutes(1), &params);
//! assert_eq!(fare.distance_fare, 5.0);
//! assert!((fare.total_fare - 35.0333).abs() < 1e-3);
//! ```

use crate::types::{FareBreakdown, RateParameters};

/// Seconds per minute, as a float divisor.
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Converts whole elapsed seconds into fractional minutes.
#[inline]
pub fn elapsed_minutes(elapsed_seconds: u64) -> f64 {
    elapsed_seconds as f64 / SECONDS_PER_MINUTE
}

/// Computes the fare breakdown. Pure and deterministic.
pub fn accumulate(distance_km: f64, elapsed_minutes: f64, params: &RateParameters) -> FareBreakdown {
    let rates = &params.rates;

    let start_fare = rates.start_fare;
    let distance_fare = distance_km * rates.per_km_rate;
    let time_fare = elapsed_minutes * rates.per_minute_rate;

    FareBreakdown {
        start_fare,
        distance_fare,
        time_fare,
        total_fare: start_fare + distance_fare + time_fare,
        is_night_rate: params.is_night_rate,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
