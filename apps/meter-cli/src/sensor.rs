//! # Simulated Positioning Sensor
//!
//! Stands in for a GPS receiver: drives along a fixed bearing at constant
//! speed and publishes a fix every period, whether or not anyone is tracking.
//!
//! ```text
//!   start ──► fix ──► fix ──► fix ──► ...     (every `period`)
//!             │ step = speed_kmh * period / 3600 s
//!             ▼
//!        PositionFeed ──► PositionDistanceSource (only while the meter runs)
//! ```

use std::time::Duration;

use taxi_core::{GeoPoint, PositionFix};
use taxi_meter::PositionFeed;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Default simulated speed.
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// Copenhagen City Hall Square.
pub const DEFAULT_ORIGIN: GeoPoint = GeoPoint::new(55.6761, 12.5683);

/// Reported horizontal accuracy of simulated fixes.
const SIMULATED_ACCURACY_M: f64 = 8.0;

/// A positioning sensor that moves in a straight line.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    origin: GeoPoint,
    bearing_deg: f64,
    speed_kmh: f64,
    period: Duration,
}

impl SimulatedSensor {
    /// Creates a sensor heading east from the default origin.
    pub fn new(speed_kmh: f64, period: Duration) -> Self {
        SimulatedSensor {
            origin: DEFAULT_ORIGIN,
            bearing_deg: 90.0,
            speed_kmh,
            period,
        }
    }

    /// Reads `TAXIMETER_SIM_SPEED_KMH`, falling back to 30 km/h.
    pub fn speed_from_env() -> f64 {
        std::env::var("TAXIMETER_SIM_SPEED_KMH")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_SPEED_KMH)
    }

    /// Kilometres covered between two fixes.
    pub fn step_km(&self) -> f64 {
        self.speed_kmh * self.period.as_secs_f64() / 3600.0
    }

    /// Position after `n` steps.
    pub fn position_at(&self, n: u64) -> GeoPoint {
        self.origin.destination(self.bearing_deg, self.step_km() * n as f64)
    }

    /// Starts publishing fixes into `feed`.
    pub fn spawn(self, feed: PositionFeed) -> JoinHandle<()> {
        info!(speed_kmh = self.speed_kmh, "Simulated positioning sensor started");

        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut n = 0u64;
            loop {
                ticker.tick().await;
                let point = self.position_at(n);
                feed.publish(PositionFix::new(point.lat, point.lon).with_accuracy(SIMULATED_ACCURACY_M));
                n += 1;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_length() {
        let sensor = SimulatedSensor::new(36.0, Duration::from_secs(1));
        assert!((sensor.step_km() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_positions_are_evenly_spaced() {
        let sensor = SimulatedSensor::new(36.0, Duration::from_secs(1));
        let start = sensor.position_at(0);
        let hundred = sensor.position_at(100);

        assert!(start.haversine_km(&DEFAULT_ORIGIN) < 1e-9);
        assert!((start.haversine_km(&hundred) - 1.0).abs() < 1e-6);
    }
}
