//! # CLI Error Type
//!
//! Wraps the failures the terminal front end can hit.

use taxi_meter::MeterError;
use thiserror::Error;

/// Error type for the terminal front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Meter construction or command failure.
    #[error(transparent)]
    Meter(#[from] MeterError),

    /// stdin/stdout failure.
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failure.
    #[error("Failed to render state as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Operator typed something we don't understand.
    #[error("Unknown command: '{0}'")]
    UnknownCommand(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
