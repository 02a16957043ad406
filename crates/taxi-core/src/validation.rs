//! # Validation Module
//!
//! Input validation for values that cross into the meter from outside:
//! distance readings from the positioning stack and tariffs from config.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  meter.toml ──► validate_schedule() ──► refuse to start with bad rates  │
//! │                                                                         │
//! │  Distance Source ──► validate_distance() ──► reading ignored, previous  │
//! │                                              distance kept (silent)     │
//! │                                                                         │
//! │  Fare math never sees NaN, infinity or negative inputs.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use taxi_core::validation::validate_distance;
//!
//! assert!(validate_distance(1.5).is_ok());
//! assert!(validate_distance(-0.1).is_err());
//! assert!(validate_distance(f64::NAN).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{RateSchedule, RateSet};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Hours in a day; valid hour values are `0..HOURS_PER_DAY`.
const HOURS_PER_DAY: u8 = 24;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that a value is finite and not negative.
pub fn validate_non_negative(field: &str, value: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(value)
}

/// Validates a cumulative distance reading (kilometres).
pub fn validate_distance(distance_km: f64) -> ValidationResult<f64> {
    validate_non_negative("distance_km", distance_km)
}

/// Validates an hour-of-day (0-23).
pub fn validate_hour(field: &str, hour: u8) -> ValidationResult<u8> {
    if hour >= HOURS_PER_DAY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(HOURS_PER_DAY - 1),
        });
    }
    Ok(hour)
}

// =============================================================================
// Schedule Validators
// =============================================================================

/// Validates every amount in a rate set.
pub fn validate_rate_set(prefix: &str, rates: &RateSet) -> ValidationResult<()> {
    validate_non_negative(&format!("{prefix}.start_fare"), rates.start_fare)?;
    validate_non_negative(&format!("{prefix}.per_km_rate"), rates.per_km_rate)?;
    validate_non_negative(&format!("{prefix}.per_minute_rate"), rates.per_minute_rate)?;
    Ok(())
}

/// Validates a full rate schedule.
///
/// ## Rules
/// - All fares and rates finite and non-negative
/// - Night window hours within 0-23
/// - Currency label not blank
pub fn validate_schedule(schedule: &RateSchedule) -> CoreResult<()> {
    validate_rate_set("day", &schedule.day)?;
    validate_rate_set("night", &schedule.night)?;
    validate_hour("night_start_hour", schedule.night_start_hour)?;
    validate_hour("night_end_hour", schedule.night_end_hour)?;

    if schedule.currency.trim().is_empty() {
        return Err(CoreError::InvalidSchedule(
            "currency label must not be empty".into(),
        ));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_distance() {
        assert_eq!(validate_distance(0.0), Ok(0.0));
        assert_eq!(validate_distance(12.5), Ok(12.5));

        assert!(matches!(
            validate_distance(-1.0),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            validate_distance(f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
        assert!(matches!(
            validate_distance(f64::INFINITY),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_validate_hour() {
        assert!(validate_hour("h", 0).is_ok());
        assert!(validate_hour("h", 23).is_ok());
        assert!(validate_hour("h", 24).is_err());
    }

    #[test]
    fn test_validate_default_schedule() {
        assert!(validate_schedule(&RateSchedule::default()).is_ok());
    }

    #[test]
    fn test_validate_schedule_rejects_bad_rates() {
        let mut schedule = RateSchedule::default();
        schedule.night.per_km_rate = -3.0;

        let err = validate_schedule(&schedule).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: night.per_km_rate must not be negative"
        );
    }

    #[test]
    fn test_validate_schedule_rejects_bad_hours() {
        let mut schedule = RateSchedule::default();
        schedule.night_end_hour = 30;
        assert!(validate_schedule(&schedule).is_err());
    }

    #[test]
    fn test_validate_schedule_rejects_blank_currency() {
        let mut schedule = RateSchedule::default();
        schedule.currency = "  ".into();
        assert!(matches!(
            validate_schedule(&schedule),
            Err(CoreError::InvalidSchedule(_))
        ));
    }
}
