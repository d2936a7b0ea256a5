//! # double-pendulum
//!
//! Planar double pendulum integrated with semi-implicit (symplectic) Euler.
//!
//! - Pure equations of motion and a fixed-step integrator
//! - Cartesian sampling of both bobs for rendering
//! - YAML configuration with two presets (fixed bodies, random gallery)
//! - Reproducible random parameter sets and batch generation
//! - Trajectory export named after a parameter fingerprint
//!
//! ## Example
//!
//! ```rust
//! use double_pendulum::prelude::*;
//!
//! let config = SimConfig::builder().seed(42).steps_per_frame(16).build();
//! let mut sim = PendulumSim::new(config).unwrap();
//!
//! sim.advance_frame();
//! let xs = sim.coordinate_series(Bob::Lower, Axis::X);
//! assert_eq!(xs.len(), 16);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Formulas are kept in their textbook form
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::many_single_char_names,
)]

pub mod batch;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod visualization;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchGenerator, BatchReport};
    pub use crate::config::{ColorScheme, SimConfig, SimConfigBuilder};
    pub use crate::engine::guard::{Guard, GuardConfig};
    pub use crate::engine::integrator::{Integrator, IntegratorType};
    pub use crate::engine::rng::SimRng;
    pub use crate::engine::sampler::{Axis, Bob};
    pub use crate::engine::state::{DynamicState, PhysicalParameters, TimeSeries, Vec3};
    pub use crate::engine::PendulumSim;
    pub use crate::error::{SimError, SimResult};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
