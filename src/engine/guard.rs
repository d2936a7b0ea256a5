//! Stop-on-anomaly guard.
//!
//! The integrator never fails: singular configurations simply produce NaN or
//! infinite values. A driver that wants to halt on such runs calls
//! [`Guard::check`] after each step (or frame).
//!
//! # Checks
//!
//! 1. **Non-finite values**: NaN or Inf in any of the four state values
//! 2. **Energy drift**: relative deviation of total energy from the value
//!    seen on the first check exceeds the configured tolerance
//!
//! Chaotic runs with the semi-implicit scheme show energy excursions of tens
//! of percent, so the energy check is off by default.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::energy::{relative_drift, total_energy};
use super::state::{DynamicState, PhysicalParameters};
use crate::error::{SimError, SimResult};

/// Severity of a drift measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Within tolerance.
    Acceptable,
    /// Approaching the tolerance boundary.
    Warning,
    /// Tolerance exceeded, stop the run.
    Critical,
    /// Drift is NaN or infinite.
    Fatal,
}

/// Non-fatal finding reported by [`Guard::check_with_warnings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuardWarning {
    /// Energy drift approaching tolerance.
    EnergyDriftApproaching {
        /// Current drift value.
        drift: f64,
        /// Tolerance threshold.
        tolerance: f64,
    },
}

/// Guard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Halt on NaN or Inf.
    pub check_finite: bool,
    /// Halt when energy drift exceeds `energy_tolerance`.
    pub check_energy: bool,
    /// Maximum allowed relative energy drift.
    pub energy_tolerance: f64,
    /// Warn once drift passes this fraction of the tolerance.
    pub warning_fraction: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            check_energy: false,
            energy_tolerance: 0.5,
            warning_fraction: 0.8,
        }
    }
}

impl GuardConfig {
    /// Classify a drift value against this configuration.
    #[must_use]
    pub fn classify_energy_drift(&self, drift: f64) -> ViolationSeverity {
        if drift.is_nan() || drift.is_infinite() {
            ViolationSeverity::Fatal
        } else if drift > self.energy_tolerance {
            ViolationSeverity::Critical
        } else if drift > self.energy_tolerance * self.warning_fraction {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }
}

/// Anomaly guard for one simulation run.
///
/// # Example
///
/// ```rust
/// use double_pendulum::engine::guard::{Guard, GuardConfig};
/// use double_pendulum::engine::state::{DynamicState, PhysicalParameters};
///
/// let mut guard = Guard::new(GuardConfig::default());
/// let params = PhysicalParameters::default();
///
/// assert!(guard.check(&DynamicState::at_rest(), &params).is_ok());
/// assert!(guard.check(&DynamicState::new(f64::NAN, 0.0, 0.0, 0.0), &params).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Guard {
    config: GuardConfig,
    initial_energy: Option<f64>,
}

impl Guard {
    /// Create a new guard.
    #[must_use]
    pub const fn new(config: GuardConfig) -> Self {
        Self {
            config,
            initial_energy: None,
        }
    }

    /// Inspect `state`.
    ///
    /// # Errors
    ///
    /// - `NonFiniteValue` if any state value is NaN or infinite
    /// - `EnergyDrift` if energy checking is enabled and drift exceeds tolerance
    pub fn check(&mut self, state: &DynamicState, params: &PhysicalParameters) -> SimResult<()> {
        self.check_with_warnings(state, params).map(|_| ())
    }

    /// Inspect `state`, returning warnings for drift near the tolerance.
    ///
    /// # Errors
    ///
    /// Same as [`Guard::check`].
    pub fn check_with_warnings(
        &mut self,
        state: &DynamicState,
        params: &PhysicalParameters,
    ) -> SimResult<Vec<GuardWarning>> {
        let mut warnings = Vec::new();

        if self.config.check_finite {
            if let Some((location, value)) = state.first_non_finite() {
                warn!(location, value, "non-finite state value");
                return Err(SimError::NonFiniteValue {
                    location: location.to_string(),
                });
            }
        }

        if self.config.check_energy {
            let current = total_energy(state, params);
            let Some(initial) = self.initial_energy else {
                self.initial_energy = Some(current);
                return Ok(warnings);
            };

            let drift = relative_drift(current, initial);
            let tolerance = self.config.energy_tolerance;
            match self.config.classify_energy_drift(drift) {
                ViolationSeverity::Acceptable => {}
                ViolationSeverity::Warning => {
                    warnings.push(GuardWarning::EnergyDriftApproaching { drift, tolerance });
                }
                ViolationSeverity::Critical | ViolationSeverity::Fatal => {
                    warn!(drift, tolerance, "energy drift beyond tolerance");
                    return Err(SimError::EnergyDrift { drift, tolerance });
                }
            }
        }

        Ok(warnings)
    }

    /// Forget the reference energy.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset(&mut self) {
        self.initial_energy = None;
    }

    /// Reference energy recorded on the first energy check.
    #[must_use]
    pub const fn initial_energy(&self) -> Option<f64> {
        self.initial_energy
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &GuardConfig {
        &self.config
    }
}
