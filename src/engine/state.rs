//! Simulation state.
//!
//! - [`PhysicalParameters`]: gravity, masses and arm lengths, fixed per run
//! - [`DynamicState`]: the four degrees of freedom at one instant
//! - [`TimeSeries`]: append-only history of states, one per step
//! - [`Vec3`]: Cartesian point handed to the rendering side

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// 3D vector for bob positions.
///
/// Motion is planar, so `z` is always zero for sampled positions; the third
/// axis exists for 3D rendering surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Magnitude (length).
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Check if all components are finite.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // is_finite not const
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// Physical parameters of a double pendulum.
///
/// All five values are strictly positive and finite; this is checked once in
/// [`PhysicalParameters::new`] and the struct is immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterValues", into = "ParameterValues")]
pub struct PhysicalParameters {
    g: f64,
    m1: f64,
    m2: f64,
    l1: f64,
    l2: f64,
}

/// Unchecked serialized form of [`PhysicalParameters`].
///
/// `g` defaults to [`STANDARD_GRAVITY`] when omitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterValues {
    /// Gravitational acceleration.
    #[serde(default = "default_gravity")]
    pub g: f64,
    /// Upper bob mass.
    pub m1: f64,
    /// Lower bob mass.
    pub m2: f64,
    /// Upper arm length.
    pub l1: f64,
    /// Lower arm length.
    pub l2: f64,
}

const fn default_gravity() -> f64 {
    STANDARD_GRAVITY
}

impl TryFrom<ParameterValues> for PhysicalParameters {
    type Error = SimError;

    fn try_from(v: ParameterValues) -> SimResult<Self> {
        Self::new(v.g, v.m1, v.m2, v.l1, v.l2)
    }
}

impl From<PhysicalParameters> for ParameterValues {
    fn from(p: PhysicalParameters) -> Self {
        Self {
            g: p.g,
            m1: p.m1,
            m2: p.m2,
            l1: p.l1,
            l2: p.l2,
        }
    }
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            g: STANDARD_GRAVITY,
            m1: 0.1,
            m2: 0.1,
            l1: 0.3,
            l2: 0.3,
        }
    }
}

impl PhysicalParameters {
    /// Create a validated parameter set.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` naming the first value that is
    /// zero, negative, NaN or infinite.
    pub fn new(g: f64, m1: f64, m2: f64, l1: f64, l2: f64) -> SimResult<Self> {
        for (name, value) in [("g", g), ("m1", m1), ("m2", m2), ("l1", l1), ("l2", l2)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidParameter { name, value });
            }
        }
        Ok(Self { g, m1, m2, l1, l2 })
    }

    /// Gravitational acceleration (m/s²).
    #[must_use]
    pub const fn g(&self) -> f64 {
        self.g
    }

    /// Mass of the upper bob (kg).
    #[must_use]
    pub const fn m1(&self) -> f64 {
        self.m1
    }

    /// Mass of the lower bob (kg).
    #[must_use]
    pub const fn m2(&self) -> f64 {
        self.m2
    }

    /// Length of the upper arm (m).
    #[must_use]
    pub const fn l1(&self) -> f64 {
        self.l1
    }

    /// Length of the lower arm (m).
    #[must_use]
    pub const fn l2(&self) -> f64 {
        self.l2
    }

    /// Combined mass `m1 + m2`.
    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.m1 + self.m2
    }

    /// Full reach of the pendulum, `l1 + l2`.
    #[must_use]
    pub fn reach(&self) -> f64 {
        self.l1 + self.l2
    }

    /// Stable hex fingerprint of the mass and length set.
    ///
    /// Gravity is excluded so runs differing only in their bodies get
    /// distinct names while the same bodies always map to the same name.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut bytes = Vec::with_capacity(32);
        for value in [self.m1, self.m2, self.l1, self.l2] {
            bytes.extend_from_slice(&value.to_bits().to_le_bytes());
        }
        blake3::hash(&bytes).to_hex().to_string()
    }
}

/// Instantaneous configuration of the pendulum.
///
/// Angles are measured from the downward vertical in radians, angular
/// velocities in radians per second. Snapshots are plain `Copy` values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DynamicState {
    /// Angle of the upper arm.
    pub theta1: f64,
    /// Angle of the lower arm.
    pub theta2: f64,
    /// Angular velocity of the upper arm.
    pub omega1: f64,
    /// Angular velocity of the lower arm.
    pub omega2: f64,
}

impl DynamicState {
    /// Create a new state.
    #[must_use]
    pub const fn new(theta1: f64, theta2: f64, omega1: f64, omega2: f64) -> Self {
        Self {
            theta1,
            theta2,
            omega1,
            omega2,
        }
    }

    /// Hanging straight down, at rest.
    #[must_use]
    pub const fn at_rest() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Difference of the arm angles, `theta1 - theta2`.
    #[must_use]
    pub fn angle_difference(&self) -> f64 {
        self.theta1 - self.theta2
    }

    /// Check if all four values are finite.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Name and value of the first non-finite component, if any.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        [
            ("theta1", self.theta1),
            ("theta2", self.theta2),
            ("omega1", self.omega1),
            ("omega2", self.omega2),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    }
}

/// Append-only history of states, one snapshot per integration step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    snapshots: Vec<DynamicState>,
}

impl TimeSeries {
    /// Create an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series with room for `capacity` snapshots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(capacity),
        }
    }

    /// Append a snapshot.
    pub fn push(&mut self, state: DynamicState) {
        self.snapshots.push(state);
    }

    /// Number of snapshots.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot has been taken yet.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DynamicState> {
        self.snapshots.get(index)
    }

    /// Most recent snapshot.
    #[must_use]
    pub fn last(&self) -> Option<&DynamicState> {
        self.snapshots.last()
    }

    /// All snapshots in step order.
    #[must_use]
    pub fn snapshots(&self) -> &[DynamicState] {
        &self.snapshots
    }

    /// Iterate snapshots in step order.
    pub fn iter(&self) -> std::slice::Iter<'_, DynamicState> {
        self.snapshots.iter()
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a DynamicState;
    type IntoIter = std::slice::Iter<'a, DynamicState>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_default() {
        let p = PhysicalParameters::default();
        assert!((p.g() - 9.81).abs() < f64::EPSILON);
        assert!((p.m1() - 0.1).abs() < f64::EPSILON);
        assert!((p.m2() - 0.1).abs() < f64::EPSILON);
        assert!((p.l1() - 0.3).abs() < f64::EPSILON);
        assert!((p.l2() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parameters_reject_non_positive() {
        let err = PhysicalParameters::new(9.81, 0.0, 0.1, 0.3, 0.3).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { name: "m1", .. }));

        let err = PhysicalParameters::new(9.81, 0.1, 0.1, 0.3, -1.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { name: "l2", .. }));

        let err = PhysicalParameters::new(0.0, 0.1, 0.1, 0.3, 0.3).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { name: "g", .. }));
    }

    #[test]
    fn test_parameters_reject_non_finite() {
        assert!(PhysicalParameters::new(9.81, f64::NAN, 0.1, 0.3, 0.3).is_err());
        assert!(PhysicalParameters::new(9.81, 0.1, f64::INFINITY, 0.3, 0.3).is_err());
    }

    #[test]
    fn test_parameters_total_mass_and_reach() {
        let p = PhysicalParameters::new(STANDARD_GRAVITY, 1.0, 2.0, 0.5, 0.25).unwrap();
        assert!((p.g() - STANDARD_GRAVITY).abs() < f64::EPSILON);
        assert!((p.total_mass() - 3.0).abs() < f64::EPSILON);
        assert!((p.reach() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parameters_deserialize_validates() {
        let ok: PhysicalParameters =
            serde_yaml::from_str("m1: 0.3\nm2: 0.1\nl1: 0.3\nl2: 0.3\n").unwrap();
        assert!((ok.g() - STANDARD_GRAVITY).abs() < f64::EPSILON);
        assert!((ok.m1() - 0.3).abs() < f64::EPSILON);

        let bad: Result<PhysicalParameters, _> =
            serde_yaml::from_str("m1: -0.3\nm2: 0.1\nl1: 0.3\nl2: 0.3\n");
        assert!(bad.is_err());
    }

    #[test]
    fn test_parameters_serde_roundtrip() {
        let p = PhysicalParameters::new(9.0, 0.2, 0.4, 0.6, 0.8).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: PhysicalParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn test_fingerprint_stable_and_distinct() {
        let a = PhysicalParameters::default();
        let b = PhysicalParameters::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let c = PhysicalParameters::new(9.81, 0.3, 0.1, 0.3, 0.3).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_gravity() {
        let earth = PhysicalParameters::new(9.81, 0.1, 0.1, 0.3, 0.3).unwrap();
        let moon = PhysicalParameters::new(1.62, 0.1, 0.1, 0.3, 0.3).unwrap();
        assert_eq!(earth.fingerprint(), moon.fingerprint());
    }

    #[test]
    fn test_state_first_non_finite() {
        let state = DynamicState::new(0.0, 1.0, f64::NAN, f64::INFINITY);
        assert_eq!(state.first_non_finite().map(|(name, _)| name), Some("omega1"));
        assert!(!state.is_finite());
        assert!(DynamicState::at_rest().is_finite());
    }

    #[test]
    fn test_time_series_append_only_order() {
        let mut series = TimeSeries::new();
        assert!(series.is_empty());
        assert!(series.last().is_none());

        for i in 0..5 {
            series.push(DynamicState::new(f64::from(i), 0.0, 0.0, 0.0));
        }

        assert_eq!(series.len(), 5);
        let thetas: Vec<f64> = series.iter().map(|s| s.theta1).collect();
        assert_eq!(thetas, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!((series.last().unwrap().theta1 - 4.0).abs() < f64::EPSILON);
        assert!((series.get(2).unwrap().theta1 - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_is_value_copy() {
        let mut series = TimeSeries::new();
        let mut state = DynamicState::new(1.0, 2.0, 3.0, 4.0);
        series.push(state);
        state.theta1 = 99.0;
        series.push(state);

        assert!((series.snapshots()[0].theta1 - 1.0).abs() < f64::EPSILON);
        assert!((series.snapshots()[1].theta1 - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_vec3_ops() {
        let a = Vec3::new(1.0, 2.0, 0.0);
        let b = Vec3::new(0.5, -1.0, 0.0);
        assert_eq!(a + b, Vec3::new(1.5, 1.0, 0.0));
        assert_eq!(a - b, Vec3::new(0.5, 3.0, 0.0));
        assert!((Vec3::new(3.0, 4.0, 0.0).magnitude() - 5.0).abs() < f64::EPSILON);
        assert!(!Vec3::new(f64::NAN, 0.0, 0.0).is_finite());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any strictly positive finite set is accepted unchanged.
        #[test]
        fn prop_positive_parameters_accepted(
            g in 0.1f64..100.0,
            m1 in 1e-3f64..10.0, m2 in 1e-3f64..10.0,
            l1 in 1e-3f64..10.0, l2 in 1e-3f64..10.0,
        ) {
            let p = PhysicalParameters::new(g, m1, m2, l1, l2);
            prop_assert!(p.is_ok());
            let p = p.unwrap_or_default();
            prop_assert_eq!(p.m1().to_bits(), m1.to_bits());
            prop_assert_eq!(p.l2().to_bits(), l2.to_bits());
        }

        /// Any non-positive mass is rejected.
        #[test]
        fn prop_non_positive_mass_rejected(m1 in -10.0f64..=0.0) {
            prop_assert!(PhysicalParameters::new(9.81, m1, 0.1, 0.3, 0.3).is_err());
        }
    }
}
