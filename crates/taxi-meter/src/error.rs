//! # Meter Error Types
//!
//! Error types for meter operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Meter Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Runtime     │  │        Domain           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  RunEnded       │  │  Core (CoreError)       │ │
//! │  │  ConfigLoad...  │  │  ShuttingDown   │  │   └─ schedule invalid   │ │
//! │  │  ConfigSave...  │  │                 │  │   └─ validation         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing on the fare path returns these. A bad distance reading is
//! dropped inside the actor and only logged.

use taxi_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for meter operations.
pub type MeterResult<T> = Result<T, MeterError>;

/// Meter error type.
#[derive(Debug, Error)]
pub enum MeterError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid meter configuration.
    #[error("Invalid meter configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Rejected by taxi-core (schedule or input validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Runtime Errors
    // =========================================================================
    /// The run an event belonged to has been stopped or reset; the event
    /// was discarded.
    #[error("Meter run has ended, event discarded")]
    RunEnded,

    /// The meter actor is no longer running.
    #[error("Meter is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for MeterError {
    fn from(err: ValidationError) -> Self {
        MeterError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for MeterError {
    fn from(err: std::io::Error) -> Self {
        MeterError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for MeterError {
    fn from(err: toml::de::Error) -> Self {
        MeterError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for MeterError {
    fn from(err: toml::ser::Error) -> Self {
        MeterError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl MeterError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            MeterError::InvalidConfig(_)
                | MeterError::ConfigLoadFailed(_)
                | MeterError::ConfigSaveFailed(_)
                | MeterError::Core(_)
        )
    }

    /// Returns true if the meter (or the current run) is gone and the
    /// caller should stop producing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MeterError::RunEnded | MeterError::ShuttingDown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors() {
        assert!(MeterError::InvalidConfig("bad".into()).is_config_error());
        assert!(MeterError::ConfigLoadFailed("missing".into()).is_config_error());
        assert!(!MeterError::ShuttingDown.is_config_error());
    }

    #[test]
    fn test_validation_error_is_core_error() {
        let err: MeterError = ValidationError::Negative {
            field: "per_km_rate".into(),
        }
        .into();
        assert!(matches!(err, MeterError::Core(CoreError::Validation(_))));
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "Validation error: per_km_rate must not be negative");
    }

    #[test]
    fn test_terminal_errors() {
        assert!(MeterError::RunEnded.is_terminal());
        assert!(MeterError::ShuttingDown.is_terminal());
        assert!(!MeterError::InvalidConfig("x".into()).is_terminal());
    }
}
