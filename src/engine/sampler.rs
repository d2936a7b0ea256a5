//! Cartesian sampling of bob positions.
//!
//! The pivot sits at the origin, `y` points up and the motion stays in the
//! `z = 0` plane:
//!
//! ```text
//! upper: x0 = l1·sin θ1          y0 = −l1·cos θ1
//! lower: x1 = x0 + l2·sin θ2     y1 = y0 − l2·cos θ2
//! ```

use serde::{Deserialize, Serialize};

use super::state::{DynamicState, PhysicalParameters, TimeSeries, Vec3};
use crate::error::SimError;

/// Which bob to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bob {
    /// Bob at the end of the first arm (index 0).
    Upper,
    /// End mass at the tip of the second arm (index 1).
    Lower,
}

impl Bob {
    /// Both bobs, pivot side first.
    pub const ALL: [Self; 2] = [Self::Upper, Self::Lower];

    /// Numeric index, 0 for the upper bob and 1 for the lower one.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Upper => 0,
            Self::Lower => 1,
        }
    }
}

impl TryFrom<usize> for Bob {
    type Error = SimError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::Upper),
            1 => Ok(Self::Lower),
            other => Err(SimError::config(format!("bob index must be 0 or 1, got {other}"))),
        }
    }
}

/// Cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
    /// Depth axis, always zero for planar motion.
    Z,
}

impl Axis {
    /// All three axes in order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component of `v` along this axis.
    #[must_use]
    pub const fn component(self, v: Vec3) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = SimError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::Z),
            other => Err(SimError::config(format!("axis index must be 0, 1 or 2, got {other}"))),
        }
    }
}

/// Position of `bob` for `state`.
#[must_use]
pub fn bob_position(bob: Bob, state: &DynamicState, params: &PhysicalParameters) -> Vec3 {
    let upper = Vec3::new(
        params.l1() * state.theta1.sin(),
        -params.l1() * state.theta1.cos(),
        0.0,
    );

    match bob {
        Bob::Upper => upper,
        Bob::Lower => Vec3::new(
            upper.x + params.l2() * state.theta2.sin(),
            upper.y - params.l2() * state.theta2.cos(),
            0.0,
        ),
    }
}

/// Both bob positions for `state`, upper first.
#[must_use]
pub fn bob_positions(state: &DynamicState, params: &PhysicalParameters) -> [Vec3; 2] {
    [
        bob_position(Bob::Upper, state, params),
        bob_position(Bob::Lower, state, params),
    ]
}

/// The two arm segments as `(start, end)` pairs: pivot to upper bob, then
/// upper bob to lower bob.
#[must_use]
pub fn bar_segments(state: &DynamicState, params: &PhysicalParameters) -> [(Vec3, Vec3); 2] {
    let [upper, lower] = bob_positions(state, params);
    [(Vec3::zero(), upper), (upper, lower)]
}

/// One coordinate of one bob for every snapshot of `series`, in step order.
#[must_use]
pub fn coordinate_series(
    bob: Bob,
    axis: Axis,
    series: &TimeSeries,
    params: &PhysicalParameters,
) -> Vec<f64> {
    series
        .iter()
        .map(|state| axis.component(bob_position(bob, state, params)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params() -> PhysicalParameters {
        PhysicalParameters::new(9.81, 0.1, 0.1, 0.3, 0.5).unwrap()
    }

    #[test]
    fn test_bob_positions_at_rest_exact() {
        let p = params();
        let rest = DynamicState::at_rest();

        assert_eq!(bob_position(Bob::Upper, &rest, &p), Vec3::new(0.0, -0.3, 0.0));
        assert_eq!(bob_position(Bob::Lower, &rest, &p), Vec3::new(0.0, -0.3 - 0.5, 0.0));
    }

    #[test]
    fn test_bob_positions_horizontal() {
        let p = params();
        let half_pi = std::f64::consts::FRAC_PI_2;
        let state = DynamicState::new(half_pi, -half_pi, 0.0, 0.0);

        let upper = bob_position(Bob::Upper, &state, &p);
        let lower = bob_position(Bob::Lower, &state, &p);

        assert!((upper.x - 0.3).abs() < 1e-12);
        assert!(upper.y.abs() < 1e-12);
        assert!((lower.x - (0.3 - 0.5)).abs() < 1e-12);
        assert!(lower.y.abs() < 1e-12);
    }

    #[test]
    fn test_arm_lengths_preserved() {
        let p = params();
        let state = DynamicState::new(2.1, -0.7, 0.0, 0.0);
        let [(pivot, upper), (joint, lower)] = bar_segments(&state, &p);

        assert_eq!(pivot, Vec3::zero());
        assert_eq!(upper, joint);
        assert!(((upper - pivot).magnitude() - 0.3).abs() < 1e-12);
        assert!(((lower - joint).magnitude() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_coordinate_series_empty() {
        let series = TimeSeries::new();
        for bob in Bob::ALL {
            for axis in Axis::ALL {
                assert!(coordinate_series(bob, axis, &series, &params()).is_empty());
            }
        }
    }

    #[test]
    fn test_coordinate_series_order_and_length() {
        let p = params();
        let mut series = TimeSeries::new();
        let angles = [0.0, 0.5, 1.0, 1.5];
        for theta in angles {
            series.push(DynamicState::new(theta, 0.0, 0.0, 0.0));
        }

        let xs = coordinate_series(Bob::Upper, Axis::X, &series, &p);
        assert_eq!(xs.len(), angles.len());
        for (x, theta) in xs.iter().zip(angles) {
            assert!((x - 0.3 * theta.sin()).abs() < 1e-12);
        }

        let zs = coordinate_series(Bob::Lower, Axis::Z, &series, &p);
        assert_eq!(zs, vec![0.0; angles.len()]);

        let ys = coordinate_series(Bob::Lower, Axis::Y, &series, &p);
        for (state, y) in series.iter().zip(&ys) {
            assert_eq!(bob_position(Bob::Lower, state, &p).y.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_index_conversions() {
        assert_eq!(Bob::try_from(0).unwrap(), Bob::Upper);
        assert_eq!(Bob::try_from(1).unwrap(), Bob::Lower);
        assert!(Bob::try_from(2).is_err());
        assert_eq!(Bob::Lower.index(), 1);

        assert_eq!(Axis::try_from(2).unwrap(), Axis::Z);
        assert!(Axis::try_from(3).is_err());
    }

    #[test]
    fn test_bob_axis_serde() {
        let bob: Bob = serde_yaml::from_str("lower").unwrap();
        assert_eq!(bob, Bob::Lower);
        let axis: Axis = serde_yaml::from_str("y").unwrap();
        assert_eq!(axis, Axis::Y);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The lower bob is never farther from the pivot than the full reach.
        #[test]
        fn prop_lower_bob_within_reach(
            theta1 in -10.0f64..10.0, theta2 in -10.0f64..10.0,
        ) {
            let params = PhysicalParameters::default();
            let state = DynamicState::new(theta1, theta2, 0.0, 0.0);
            let lower = bob_position(Bob::Lower, &state, &params);

            prop_assert!(lower.magnitude() <= params.reach() + 1e-12);
            prop_assert!(lower.z == 0.0);
        }
    }
}
