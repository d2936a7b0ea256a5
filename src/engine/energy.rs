//! Mechanical energy of the double pendulum.
//!
//! ```text
//! T = ½(m1+m2)·l1²·ω1² + ½·m2·l2²·ω2² + m2·l1·l2·ω1·ω2·cos(θ1−θ2)
//! V = −(m1+m2)·g·l1·cos(θ1) − m2·g·l2·cos(θ2)
//! ```
//!
//! The potential is measured from the pivot, so the hanging rest state has
//! energy `−g·((m1+m2)·l1 + m2·l2)`.

use super::state::{DynamicState, PhysicalParameters};

/// Kinetic energy (J).
#[must_use]
pub fn kinetic_energy(state: &DynamicState, params: &PhysicalParameters) -> f64 {
    let (m1, m2, l1, l2) = (params.m1(), params.m2(), params.l1(), params.l2());
    let DynamicState {
        theta1,
        theta2,
        omega1,
        omega2,
    } = *state;

    0.5 * (m1 + m2) * l1 * l1 * omega1 * omega1
        + 0.5 * m2 * l2 * l2 * omega2 * omega2
        + m2 * l1 * l2 * omega1 * omega2 * (theta1 - theta2).cos()
}

/// Potential energy relative to the pivot height (J).
#[must_use]
pub fn potential_energy(state: &DynamicState, params: &PhysicalParameters) -> f64 {
    let (g, m1, m2, l1, l2) = (params.g(), params.m1(), params.m2(), params.l1(), params.l2());

    -(m1 + m2) * g * l1 * state.theta1.cos() - m2 * g * l2 * state.theta2.cos()
}

/// Total mechanical energy (J).
#[must_use]
pub fn total_energy(state: &DynamicState, params: &PhysicalParameters) -> f64 {
    kinetic_energy(state, params) + potential_energy(state, params)
}

/// Relative deviation of `current` from `initial`.
///
/// Falls back to the absolute deviation when `initial` is zero.
#[must_use]
pub fn relative_drift(current: f64, initial: f64) -> f64 {
    let scale = if initial.abs() < f64::EPSILON {
        1.0
    } else {
        initial.abs()
    };
    (current - initial).abs() / scale
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_energy() {
        let params = PhysicalParameters::new(9.81, 1.0, 2.0, 0.5, 0.25).unwrap();
        let state = DynamicState::at_rest();

        assert!(kinetic_energy(&state, &params).abs() < f64::EPSILON);
        let expected = -9.81 * (3.0 * 0.5 + 2.0 * 0.25);
        assert!((potential_energy(&state, &params) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_energy() {
        let params = PhysicalParameters::new(9.81, 1.0, 1.0, 1.0, 1.0).unwrap();
        let pi = std::f64::consts::PI;
        let state = DynamicState::new(pi, pi, 0.0, 0.0);

        assert!((potential_energy(&state, &params) - 9.81 * 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_kinetic_rigid_rotation() {
        // Arms aligned and spinning together: the whole body rotates rigidly,
        // T = ½·ω²·(m1·l1² + m2·(l1+l2)²).
        let params = PhysicalParameters::new(9.81, 1.0, 1.0, 1.0, 1.0).unwrap();
        let state = DynamicState::new(0.0, 0.0, 2.0, 2.0);

        let expected = 0.5 * 4.0 * (1.0 + 4.0);
        assert!((kinetic_energy(&state, &params) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_relative_drift() {
        assert!((relative_drift(11.0, 10.0) - 0.1).abs() < 1e-12);
        assert!((relative_drift(-9.0, -10.0) - 0.1).abs() < 1e-12);
        assert!((relative_drift(0.5, 0.0) - 0.5).abs() < 1e-12);
        assert!(relative_drift(f64::NAN, 1.0).is_nan());
    }
}
