//! # Error Types
//!
//! Domain-specific error types for taxi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  taxi-core errors (this file)                                          │
//! │  ├── CoreError        - Schedule / domain errors                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  taxi-meter errors (separate crate)                                    │
//! │  └── MeterError       - Config, channel, shutdown failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → MeterError → CLI                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that the fare math itself never fails. These errors come from
//! validating configuration and collaborator input before it reaches the
//! math.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The rate schedule is unusable as configured.
    #[error("Invalid rate schedule: {0}")]
    InvalidSchedule(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be a finite number (not NaN or infinity).
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
