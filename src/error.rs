//! Error types for double-pendulum.
//!
//! Construction and I/O failures are reported through `Result<T, SimError>`.
//! Numeric degeneracy during integration is not an error: it shows up as
//! non-finite values in the state, which the guard can turn into one.

use thiserror::Error;

/// Result type alias for double-pendulum operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all double-pendulum operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Construction Errors =====
    /// Physical parameter is not strictly positive and finite.
    #[error("Invalid parameter '{name}': {value} (must be positive and finite)")]
    InvalidParameter {
        /// Parameter name (e.g. "m1").
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    // ===== Guard Violations =====
    /// Numerical instability detected (NaN or Inf).
    #[error("Guard: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    /// Energy drift beyond tolerance.
    #[error("Guard: energy drift {drift:.6e} exceeds tolerance {tolerance:.6e}")]
    EnergyDrift {
        /// Relative energy drift from initial state.
        drift: f64,
        /// Configured tolerance threshold.
        tolerance: f64,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create an I/O error with a message (wraps in `std::io::Error`).
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }

    /// Check if this error was raised by the guard (requires the run to halt).
    #[must_use]
    pub const fn is_guard_violation(&self) -> bool {
        matches!(self, Self::NonFiniteValue { .. } | Self::EnergyDrift { .. })
    }
}
