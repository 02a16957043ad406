//! # Distance Accumulation
//!
//! Great-circle math for turning a stream of position fixes into the
//! cumulative trip distance the meter charges for.
//!
//! ## Accumulation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fix ──► accuracy worse than max_accuracy_m? ──► ignored                │
//! │   │                                                                     │
//! │   ▼                                                                     │
//! │  no anchor yet? ──► becomes anchor, adds nothing                        │
//! │   │                                                                     │
//! │   ▼                                                                     │
//! │  step = haversine(anchor, fix)                                          │
//! │  step < min_step_m? ──► ignored, anchor stays (parked-car jitter)       │
//! │   │                                                                     │
//! │   ▼                                                                     │
//! │  total += step, anchor = fix                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keeping the anchor on short steps means slow, steady movement still adds
//! up once it crosses the threshold, while stationary noise never does.

use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG), kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Default minimum step counted as movement, metres.
pub const DEFAULT_MIN_STEP_M: f64 = 5.0;

/// Default worst horizontal accuracy accepted, metres.
pub const DEFAULT_MAX_ACCURACY_M: f64 = 50.0;

// =============================================================================
// Position Types
// =============================================================================

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Point reached by moving `distance_km` along `bearing_deg` (0 = north).
    pub fn destination(&self, bearing_deg: f64, distance_km: f64) -> GeoPoint {
        let delta = distance_km / EARTH_RADIUS_KM;
        let theta = bearing_deg.to_radians();
        let phi1 = self.lat.to_radians();
        let lambda1 = self.lon.to_radians();

        let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

        GeoPoint::new(phi2.to_degrees(), lambda2.to_degrees())
    }

    /// Returns true if both coordinates are finite and in range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// One reading from the positioning sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub point: GeoPoint,

    /// Reported horizontal accuracy radius in metres, if known.
    pub accuracy_m: Option<f64>,
}

impl PositionFix {
    pub const fn new(lat: f64, lon: f64) -> Self {
        PositionFix {
            point: GeoPoint::new(lat, lon),
            accuracy_m: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }
}

// =============================================================================
// Distance Accumulator
// =============================================================================

/// Running total of distance travelled between accepted fixes.
#[derive(Debug, Clone)]
pub struct DistanceAccumulator {
    anchor: Option<GeoPoint>,
    total_km: f64,
    min_step_km: f64,
    max_accuracy_m: f64,
}

impl Default for DistanceAccumulator {
    fn default() -> Self {
        DistanceAccumulator::new(DEFAULT_MIN_STEP_M, DEFAULT_MAX_ACCURACY_M)
    }
}

impl DistanceAccumulator {
    /// Creates an empty accumulator with the given jitter thresholds.
    pub fn new(min_step_m: f64, max_accuracy_m: f64) -> Self {
        DistanceAccumulator {
            anchor: None,
            total_km: 0.0,
            min_step_km: min_step_m / 1000.0,
            max_accuracy_m,
        }
    }

    /// Cumulative kilometres since creation or the last [`reset`](Self::reset).
    pub fn total_km(&self) -> f64 {
        self.total_km
    }

    /// Feeds one fix. Returns the new total if the fix added distance.
    pub fn push(&mut self, fix: &PositionFix) -> Option<f64> {
        if !fix.point.is_valid() {
            return None;
        }

        if let Some(accuracy) = fix.accuracy_m {
            if !accuracy.is_finite() || accuracy > self.max_accuracy_m {
                return None;
            }
        }

        let Some(anchor) = self.anchor else {
            self.anchor = Some(fix.point);
            return None;
        };

        let step_km = anchor.haversine_km(&fix.point);
        if step_km < self.min_step_km {
            return None;
        }

        self.total_km += step_km;
        self.anchor = Some(fix.point);
        Some(self.total_km)
    }

    /// Forgets the anchor but keeps the total, so the next fix re-anchors
    /// without counting the gap (used when tracking pauses).
    pub fn detach(&mut self) {
        self.anchor = None;
    }

    /// Clears both the total and the anchor.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.total_km = 0.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
