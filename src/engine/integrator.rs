//! Equations of motion and fixed-step integration.
//!
//! The angular accelerations come from the Lagrangian of two point masses on
//! rigid massless arms. Both functions are pure: they read the full state and
//! the parameters and nothing else.
//!
//! # Semi-implicit Euler
//!
//! ```text
//! a1 = θ̈1(θ1, θ2, ω1, ω2)        a2 = θ̈2(θ1, θ2, ω1, ω2)
//! ω1' = ω1 + a1·Δt               ω2' = ω2 + a2·Δt
//! θ1' = θ1 + ω1'·Δt              θ2' = θ2 + ω2'·Δt
//! ```
//!
//! Both accelerations are evaluated on the pre-step state; the positions
//! advance with the already-updated velocities. Swapping that order gives
//! explicit Euler, whose energy error grows steadily instead of oscillating.
//!
//! Near-zero denominators produce huge or non-finite accelerations. They are
//! not trapped here and propagate into the state.

use serde::{Deserialize, Serialize};

use super::state::{DynamicState, PhysicalParameters};

/// Second time-derivative of `theta1`.
#[must_use]
pub fn angular_acceleration_1(state: &DynamicState, params: &PhysicalParameters) -> f64 {
    let DynamicState {
        theta1,
        theta2,
        omega1,
        omega2,
    } = *state;
    let (g, m2, l1, l2) = (params.g(), params.m2(), params.l1(), params.l2());
    let m = params.total_mass();
    let d = state.angle_difference();

    let num = -m2 * l1 * omega1.powi(2) * d.sin() * d.cos() + m2 * g * theta2.sin() * d.cos()
        - m2 * l2 * omega2.powi(2) * d.sin()
        - m * g * theta1.sin();
    let den = m * l1 - m2 * l1 * d.cos().powi(2);

    num / den
}

/// Second time-derivative of `theta2`.
#[must_use]
pub fn angular_acceleration_2(state: &DynamicState, params: &PhysicalParameters) -> f64 {
    let DynamicState {
        theta1,
        theta2,
        omega1,
        omega2,
    } = *state;
    let (g, m2, l1, l2) = (params.g(), params.m2(), params.l1(), params.l2());
    let m = params.total_mass();
    let d = state.angle_difference();

    let num = m2 * l2 * omega2.powi(2) * d.sin() * d.cos()
        + m * g * theta1.sin() * d.cos()
        + l1 * omega1.powi(2) * d.sin() * m
        - g * theta2.sin() * m;
    let den = l1 * m - m2 * l2 * d.cos().powi(2);

    num / den
}

/// Both angular accelerations at `state`, `(θ̈1, θ̈2)`.
#[must_use]
pub fn angular_accelerations(state: &DynamicState, params: &PhysicalParameters) -> (f64, f64) {
    (
        angular_acceleration_1(state, params),
        angular_acceleration_2(state, params),
    )
}

/// Advance `state` by one semi-implicit Euler step of length `dt`.
#[must_use]
pub fn advance_one_step(state: &DynamicState, params: &PhysicalParameters, dt: f64) -> DynamicState {
    SymplecticEuler.step(state, params, dt)
}

/// Fixed-step integrator for the double pendulum.
pub trait Integrator {
    /// Return the state one step of length `dt` after `state`.
    fn step(&self, state: &DynamicState, params: &PhysicalParameters, dt: f64) -> DynamicState;

    /// Global error order of the method.
    fn error_order(&self) -> u32;

    /// Whether the method is symplectic.
    fn is_symplectic(&self) -> bool;

    /// Short human-readable name.
    fn name(&self) -> &'static str;
}

/// Semi-implicit (symplectic) Euler.
///
/// First order, one acceleration evaluation per step. Velocity first, then
/// position with the new velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymplecticEuler;

impl Integrator for SymplecticEuler {
    fn step(&self, state: &DynamicState, params: &PhysicalParameters, dt: f64) -> DynamicState {
        let (a1, a2) = angular_accelerations(state, params);

        let omega1 = state.omega1 + a1 * dt;
        let omega2 = state.omega2 + a2 * dt;

        DynamicState {
            theta1: state.theta1 + omega1 * dt,
            theta2: state.theta2 + omega2 * dt,
            omega1,
            omega2,
        }
    }

    fn error_order(&self) -> u32 {
        1
    }

    fn is_symplectic(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "symplectic-euler"
    }
}

/// Explicit (forward) Euler.
///
/// Positions advance with the pre-step velocities. Kept as a non-symplectic
/// reference: its energy error grows without bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn step(&self, state: &DynamicState, params: &PhysicalParameters, dt: f64) -> DynamicState {
        let (a1, a2) = angular_accelerations(state, params);

        DynamicState {
            theta1: state.theta1 + state.omega1 * dt,
            theta2: state.theta2 + state.omega2 * dt,
            omega1: state.omega1 + a1 * dt,
            omega2: state.omega2 + a2 * dt,
        }
    }

    fn error_order(&self) -> u32 {
        1
    }

    fn is_symplectic(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "explicit-euler"
    }
}

/// Integrator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegratorType {
    /// Semi-implicit Euler.
    #[default]
    SymplecticEuler,
    /// Forward Euler.
    ExplicitEuler,
}

impl IntegratorType {
    /// Instantiate the selected integrator.
    #[must_use]
    pub fn build(self) -> Box<dyn Integrator + Send + Sync> {
        match self {
            Self::SymplecticEuler => Box::new(SymplecticEuler),
            Self::ExplicitEuler => Box::new(ExplicitEuler),
        }
    }
}
