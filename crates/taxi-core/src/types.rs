//! # Domain Types
//!
//! Core domain types used throughout the taxi meter.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  RateSchedule   │   │ RateParameters  │   │  FareBreakdown  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  day: RateSet   │──►│  rates: RateSet │──►│  start_fare     │       │
//! │  │  night: RateSet │   │  is_night_rate  │   │  distance_fare  │       │
//! │  │  night window   │   └─────────────────┘   │  time_fare      │       │
//! │  │  currency       │     resolve(time)       │  total_fare     │       │
//! │  └─────────────────┘                         │  is_night_rate  │       │
//! │                                              └────────┬────────┘       │
//! │                                                       │                 │
//! │                                              ┌────────▼────────┐       │
//! │                                              │    TripState    │       │
//! │                                              │  ─────────────  │       │
//! │                                              │  running        │       │
//! │                                              │  elapsed_seconds│       │
//! │                                              │  distance_km    │       │
//! │                                              │  fare_breakdown │       │
//! │                                              │  rate_info_text │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Precision
//! Every amount here is an `f64` kept at full precision. Rounding to two
//! decimals happens only when a presentation layer renders the value.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Default Tariff
// =============================================================================

/// Default night window start (17:00).
pub const DEFAULT_NIGHT_START_HOUR: u8 = 17;

/// Default night window end (06:00, exclusive).
pub const DEFAULT_NIGHT_END_HOUR: u8 = 6;

/// Default currency label used in the rate description.
pub const DEFAULT_CURRENCY: &str = "kr";

// =============================================================================
// Rate Set
// =============================================================================

/// One set of fare parameters (day or night).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSet {
    /// Flat fare charged as soon as the trip exists.
    pub start_fare: f64,

    /// Price per kilometre travelled.
    pub per_km_rate: f64,

    /// Price per minute of elapsed trip time.
    pub per_minute_rate: f64,
}

impl RateSet {
    /// Creates a rate set.
    pub const fn new(start_fare: f64, per_km_rate: f64, per_minute_rate: f64) -> Self {
        RateSet {
            start_fare,
            per_km_rate,
            per_minute_rate,
        }
    }

    /// Default daytime tariff.
    pub const fn default_day() -> Self {
        RateSet::new(39.0, 11.0, 6.0)
    }

    /// Default night tariff.
    pub const fn default_night() -> Self {
        RateSet::new(49.0, 14.0, 7.5)
    }
}

// =============================================================================
// Rate Schedule
// =============================================================================

/// The full tariff: day rates, night rates and the night window.
///
/// ## Night Window
/// Hours are local hour-of-day (0-23). The window is `[night_start_hour,
/// night_end_hour)` and may wrap past midnight:
///
/// ```text
///   night_start=17, night_end=6 (wraps)
///
///   00 01 02 03 04 05 06 07 ... 15 16 17 18 ... 22 23
///   ─N──N──N──N──N──N──D──D─────D──D──N──N──────N──N─
///
///   night_start=22, night_end=23 (no wrap)
///
///   ... 20 21 22 23
///   ────D──D──N──D─
/// ```
///
/// Equal start and end hours mean an empty night window (day rate always).
/// Resolution lives in [`crate::schedule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// First hour (inclusive) of the night window.
    #[serde(default = "default_night_start")]
    pub night_start_hour: u8,

    /// Hour (exclusive) at which the night window ends.
    #[serde(default = "default_night_end")]
    pub night_end_hour: u8,

    /// Currency label used in the human-readable rate description.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Daytime rates.
    #[serde(default = "RateSet::default_day")]
    pub day: RateSet,

    /// Night rates.
    #[serde(default = "RateSet::default_night")]
    pub night: RateSet,
}

fn default_night_start() -> u8 {
    DEFAULT_NIGHT_START_HOUR
}

fn default_night_end() -> u8 {
    DEFAULT_NIGHT_END_HOUR
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for RateSchedule {
    fn default() -> Self {
        RateSchedule {
            day: RateSet::default_day(),
            night: RateSet::default_night(),
            night_start_hour: DEFAULT_NIGHT_START_HOUR,
            night_end_hour: DEFAULT_NIGHT_END_HOUR,
            currency: default_currency(),
        }
    }
}

// =============================================================================
// Rate Parameters
// =============================================================================

/// The rate set that applies at one particular moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateParameters {
    /// The applicable rates.
    pub rates: RateSet,

    /// True when `rates` is the night set.
    pub is_night_rate: bool,
}

// =============================================================================
// Fare Breakdown
// =============================================================================

/// Decomposition of the current fare. Derived, never stored.
///
/// Invariant: `total_fare == start_fare + distance_fare + time_fare`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FareBreakdown {
    pub start_fare: f64,
    pub distance_fare: f64,
    pub time_fare: f64,
    pub total_fare: f64,

    /// Reflects the rate set used for this computation.
    pub is_night_rate: bool,
}

// =============================================================================
// Trip State
// =============================================================================

/// Complete mutable record of the meter's current run.
///
/// Only the meter state machine mutates this; everybody else gets clones.
///
/// ## Lifecycle
/// ```text
/// construction ──► zero state (fare_breakdown = None)
///      │
///      ▼
/// tick / distance ──► counters grow, fare_breakdown = Some(..)
///      │
///      ▼
/// reset ──► zero counters, fare_breakdown = Some(start fare only)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TripState {
    /// True while the clock and distance streams are live.
    pub running: bool,

    /// Whole ticks counted since the last reset.
    #[ts(type = "number")]
    pub elapsed_seconds: u64,

    /// Cumulative kilometres reported by the distance source.
    pub distance_km: f64,

    /// Latest computed fare; `None` until the first computation.
    pub fare_breakdown: Option<FareBreakdown>,

    /// Description of the rate set currently in force.
    pub rate_info_text: String,
}

impl TripState {
    /// Creates the zero state with the given rate description.
    pub fn new(rate_info_text: impl Into<String>) -> Self {
        TripState {
            running: false,
            elapsed_seconds: 0,
            distance_km: 0.0,
            fare_breakdown: None,
            rate_info_text: rate_info_text.into(),
        }
    }

    /// Elapsed time as fractional minutes.
    pub fn elapsed_minutes(&self) -> f64 {
        crate::fare::elapsed_minutes(self.elapsed_seconds)
    }

    /// Zeroes the counters and stops the run. The breakdown is left for the
    /// caller to recompute.
    pub fn clear_counters(&mut self) {
        self.running = false;
        self.elapsed_seconds = 0;
        self.distance_km = 0.0;
    }

    /// Current total, or zero before the first computation.
    pub fn total_fare(&self) -> f64 {
        self.fare_breakdown.map(|f| f.total_fare).unwrap_or(0.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
