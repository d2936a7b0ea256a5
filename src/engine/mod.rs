//! Core simulation engine.
//!
//! Implements the double pendulum with:
//! - Pure equations of motion and fixed-step integrators
//! - Cartesian sampling of the bob positions
//! - Energy bookkeeping
//! - An optional stop-on-anomaly guard
//! - Deterministic RNG (PCG with partitioned seeds)

pub mod energy;
pub mod guard;
pub mod integrator;
pub mod rng;
pub mod sampler;
pub mod state;

use std::fmt;

use tracing::{debug, trace};

pub use guard::{Guard, GuardConfig};
pub use integrator::{Integrator, IntegratorType};
pub use rng::SimRng;
pub use sampler::{Axis, Bob};
pub use state::{DynamicState, PhysicalParameters, TimeSeries, Vec3};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};

/// Draw masses and lengths uniformly from (0, 1), keeping gravity `g`.
///
/// The draw order is m1, m2, l1, l2.
///
/// # Errors
///
/// Returns `InvalidParameter` if `g` is not positive and finite.
pub fn sample_parameters(rng: &mut SimRng, g: f64) -> SimResult<PhysicalParameters> {
    let m1 = rng.gen_positive_unit();
    let m2 = rng.gen_positive_unit();
    let l1 = rng.gen_positive_unit();
    let l2 = rng.gen_positive_unit();
    PhysicalParameters::new(g, m1, m2, l1, l2)
}

/// One double pendulum run.
///
/// Owns the parameters, the current state, the history of every step and the
/// configuration it was built from. The core never fails on numeric
/// degeneracy; drivers that care call [`PendulumSim::run_frames`] with a
/// [`Guard`].
///
/// # Example
///
/// ```rust
/// use double_pendulum::prelude::*;
///
/// let mut sim = PendulumSim::new(SimConfig::default()).unwrap();
/// sim.advance_frame();
///
/// assert_eq!(sim.step_count(), 32);
/// assert_eq!(sim.coordinate_series(Bob::Lower, Axis::X).len(), 32);
/// ```
pub struct PendulumSim {
    params: PhysicalParameters,
    initial_state: DynamicState,
    state: DynamicState,
    series: TimeSeries,
    step_count: u64,
    dt: f64,
    integrator: Box<dyn Integrator + Send + Sync>,
    config: SimConfig,
}

impl fmt::Debug for PendulumSim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendulumSim")
            .field("params", &self.params)
            .field("state", &self.state)
            .field("step_count", &self.step_count)
            .field("dt", &self.dt)
            .field("integrator", &self.integrator.name())
            .finish_non_exhaustive()
    }
}

impl PendulumSim {
    /// Create a simulation from configuration.
    ///
    /// When `randomize_initial_conditions` is set, masses and lengths are
    /// drawn from a generator seeded with `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns error if configuration validation fails.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        let mut rng = SimRng::new(config.seed);
        Self::with_rng(config, &mut rng)
    }

    /// Create a simulation, drawing random parameters from `rng`.
    ///
    /// # Errors
    ///
    /// Returns error if configuration validation fails.
    pub fn with_rng(config: SimConfig, rng: &mut SimRng) -> SimResult<Self> {
        let params = if config.randomize_initial_conditions {
            sample_parameters(rng, config.parameters.g())?
        } else {
            config.parameters
        };
        let initial = config.initial_state;
        Self::from_parts(params, initial, config)
    }

    /// Create a simulation with explicit parameters and initial state.
    ///
    /// `config` supplies timing, the integrator and the rest; its own
    /// `parameters` and `initial_state` are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if configuration validation fails or `initial` holds a
    /// non-finite value.
    pub fn from_parts(
        params: PhysicalParameters,
        initial: DynamicState,
        config: SimConfig,
    ) -> SimResult<Self> {
        config.check()?;
        if let Some((name, value)) = initial.first_non_finite() {
            return Err(SimError::config(format!(
                "initial {name} must be finite, got {value}"
            )));
        }

        let dt = config.delta_t();
        debug!(
            fingerprint = %params.fingerprint(),
            dt,
            steps_per_frame = config.steps_per_frame,
            integrator = ?config.integrator,
            "pendulum created"
        );

        Ok(Self {
            params,
            initial_state: initial,
            state: initial,
            series: TimeSeries::with_capacity(config.steps_per_frame),
            step_count: 0,
            dt,
            integrator: config.integrator.build(),
            config,
        })
    }

    /// Advance by one `delta_t`, record the new state and return it.
    pub fn advance_one_step(&mut self) -> DynamicState {
        let next = self.integrator.step(&self.state, &self.params, self.dt);
        self.state = next;
        self.series.push(next);
        self.step_count += 1;
        next
    }

    /// Advance by `steps_per_frame` sub-steps and return the final state.
    pub fn advance_frame(&mut self) -> DynamicState {
        for _ in 0..self.config.steps_per_frame {
            self.advance_one_step();
        }
        trace!(
            step = self.step_count,
            theta1 = self.state.theta1,
            theta2 = self.state.theta2,
            "frame"
        );
        self.state
    }

    /// Advance `frames` frames, checking `guard` after each one.
    ///
    /// Returns the number of frames completed.
    ///
    /// # Errors
    ///
    /// Returns the guard violation that halted the run. The offending state
    /// stays recorded in the time series.
    pub fn run_frames(&mut self, frames: usize, guard: &mut Guard) -> SimResult<usize> {
        guard.check(&self.state, &self.params)?;
        for _ in 0..frames {
            self.advance_frame();
            guard.check(&self.state, &self.params)?;
        }
        debug!(frames, steps = self.step_count, "run complete");
        Ok(frames)
    }

    /// One coordinate of one bob for every recorded step.
    #[must_use]
    pub fn coordinate_series(&self, bob: Bob, axis: Axis) -> Vec<f64> {
        sampler::coordinate_series(bob, axis, &self.series, &self.params)
    }

    /// Bob positions for the current state, upper first.
    #[must_use]
    pub fn latest_positions(&self) -> [Vec3; 2] {
        sampler::bob_positions(&self.state, &self.params)
    }

    /// Arm segments for the current state.
    #[must_use]
    pub fn bar_segments(&self) -> [(Vec3, Vec3); 2] {
        sampler::bar_segments(&self.state, &self.params)
    }

    /// Total mechanical energy of the current state.
    #[must_use]
    pub fn energy(&self) -> f64 {
        energy::total_energy(&self.state, &self.params)
    }

    /// Relative energy drift since construction.
    #[must_use]
    pub fn energy_drift(&self) -> f64 {
        energy::relative_drift(
            self.energy(),
            energy::total_energy(&self.initial_state, &self.params),
        )
    }

    /// Physical parameters.
    #[must_use]
    pub const fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &DynamicState {
        &self.state
    }

    /// State at construction.
    #[must_use]
    pub const fn initial_state(&self) -> &DynamicState {
        &self.initial_state
    }

    /// Every state produced so far, one per step.
    #[must_use]
    pub const fn time_series(&self) -> &TimeSeries {
        &self.series
    }

    /// Number of steps taken.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Integration step (s).
    #[must_use]
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated time since construction (s).
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.step_count as f64 * self.dt
    }

    /// Configuration this run was built from.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }
}
