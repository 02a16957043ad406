//! # Rate Schedule Resolver
//!
//! Decides which rate set (day or night) applies at a given moment.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WRAPPING WINDOW (night_start > night_end), e.g. 17 → 6                 │
//! │    night  ⇔  hour >= 17  OR  hour < 6                                   │
//! │                                                                         │
//! │  PLAIN WINDOW (night_start <= night_end), e.g. 1 → 5                    │
//! │    night  ⇔  1 <= hour < 5                                              │
//! │                                                                         │
//! │  Every hour lands in exactly one bucket; there is no error path.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::NaiveTime;
//! use taxi_core::RateSchedule;
//!
//! let schedule = RateSchedule::default(); // night 17:00-06:00
//! let at = NaiveTime::from_hms_opt(23, 15, 0).unwrap();
//! assert!(schedule.resolve(&at).is_night_rate);
//! ```

use chrono::Timelike;

use crate::types::{RateParameters, RateSchedule};

impl RateSchedule {
    /// Returns true if `hour` (0-23) falls inside the night window.
    pub fn is_night_hour(&self, hour: u32) -> bool {
        let start = u32::from(self.night_start_hour);
        let end = u32::from(self.night_end_hour);

        if start > end {
            hour >= start || hour < end
        } else {
            start <= hour && hour < end
        }
    }

    /// Resolves the rate parameters for a local timestamp.
    ///
    /// Accepts anything with an hour-of-day (`NaiveDateTime`, `NaiveTime`,
    /// `DateTime<Local>`, ...). Only the hour is consulted.
    pub fn resolve<T: Timelike>(&self, at: &T) -> RateParameters {
        let is_night_rate = self.is_night_hour(at.hour());
        let rates = if is_night_rate { self.night } else { self.day };

        RateParameters {
            rates,
            is_night_rate,
        }
    }

    /// Renders the human-readable description of a resolved rate set.
    ///
    /// ## Example Output
    /// ```text
    /// Night rate (17:00-06:00): start 49.00 kr, 14.00 kr/km, 7.50 kr/min
    /// Day rate (06:00-17:00): start 39.00 kr, 11.00 kr/km, 6.00 kr/min
    /// ```
    pub fn describe(&self, params: &RateParameters) -> String {
        let (label, from, to) = if params.is_night_rate {
            ("Night rate", self.night_start_hour, self.night_end_hour)
        } else {
            ("Day rate", self.night_end_hour, self.night_start_hour)
        };

        let rates = &params.rates;
        let currency = &self.currency;

        if self.night_start_hour == self.night_end_hour {
            // Empty night window: the day rate covers the whole clock
            return format!(
                "{label} (all day): start {:.2} {currency}, {:.2} {currency}/km, {:.2} {currency}/min",
                rates.start_fare, rates.per_km_rate, rates.per_minute_rate
            );
        }

        format!(
            "{label} ({from:02}:00-{to:02}:00): start {:.2} {currency}, {:.2} {currency}/km, {:.2} {currency}/min",
            rates.start_fare, rates.per_km_rate, rates.per_minute_rate
        )
    }

    /// Convenience: resolve and describe in one call.
    pub fn describe_at<T: Timelike>(&self, at: &T) -> String {
        self.describe(&self.resolve(at))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
