//! Configuration system with YAML schema and validation.
//!
//! One [`SimConfig`] describes a run: frame timing, physical parameters,
//! initial state, whether to randomize the bodies, integrator choice, guard
//! settings and the colors the rendering side should use.
//!
//! Validation happens in two passes: field ranges through `validator`, then
//! semantic checks that span several fields.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::engine::guard::GuardConfig;
use crate::engine::integrator::IntegratorType;
use crate::engine::state::{DynamicState, PhysicalParameters};
use crate::error::{SimError, SimResult};

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Free-form run name.
    #[serde(default)]
    pub name: String,

    /// Master seed for parameter sampling.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Integration sub-steps per displayed frame.
    #[validate(range(min = 1, max = 100_000))]
    #[serde(default = "default_steps_per_frame")]
    pub steps_per_frame: usize,

    /// Delay between displayed frames (ms).
    #[validate(range(min = 1, max = 60_000))]
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u32,

    /// Integration step (s). When absent, the frame delay is split evenly
    /// across the sub-steps.
    #[serde(default)]
    pub delta_t: Option<f64>,

    /// Number of frames a driver should produce.
    #[validate(range(min = 1))]
    #[serde(default = "default_frames")]
    pub frames: usize,

    /// Replace masses and lengths with uniform draws from (0, 1).
    #[serde(default)]
    pub randomize_initial_conditions: bool,

    /// Physical parameters (masses and lengths are ignored when randomizing).
    #[serde(default)]
    pub parameters: PhysicalParameters,

    /// State at t = 0.
    #[serde(default = "default_initial_state")]
    pub initial_state: DynamicState,

    /// Stepping scheme.
    #[serde(default)]
    pub integrator: IntegratorType,

    /// Colors for the rendering side.
    #[serde(default)]
    pub colors: ColorScheme,

    /// Anomaly guard settings.
    #[serde(default)]
    pub guard: GuardConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

const fn default_seed() -> u64 {
    42
}

const fn default_steps_per_frame() -> usize {
    32
}

const fn default_frame_delay_ms() -> u32 {
    20
}

const fn default_frames() -> usize {
    750
}

const fn default_initial_state() -> DynamicState {
    DynamicState::new(2.1, 2.0, 2.0, 2.0)
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            name: "double-pendulum".to_string(),
            seed: default_seed(),
            steps_per_frame: default_steps_per_frame(),
            frame_delay_ms: default_frame_delay_ms(),
            delta_t: None,
            frames: default_frames(),
            randomize_initial_conditions: false,
            parameters: PhysicalParameters::default(),
            initial_state: default_initial_state(),
            integrator: IntegratorType::default(),
            colors: ColorScheme::default(),
            guard: GuardConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails (including non-positive parameters)
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Run field and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// The randomized gallery preset: 75 ms frames of 16 sub-steps, 100
    /// frames, bodies drawn at random, light trace on a dark background.
    #[must_use]
    pub fn random_gallery() -> Self {
        Self {
            name: "random-gallery".to_string(),
            steps_per_frame: 16,
            frame_delay_ms: 75,
            frames: 100,
            randomize_initial_conditions: true,
            parameters: PhysicalParameters::new(9.81, 0.3, 0.1, 0.3, 0.3)
                .unwrap_or_default(),
            initial_state: DynamicState::new(2.0, 2.0, 2.0, 2.0),
            colors: ColorScheme::night(),
            ..Self::default()
        }
    }

    /// Integration step in seconds.
    #[must_use]
    pub fn delta_t(&self) -> f64 {
        self.delta_t.unwrap_or_else(|| {
            f64::from(self.frame_delay_ms) * 0.001 / self.steps_per_frame.max(1) as f64
        })
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> SimResult<()> {
        let dt = self.delta_t();
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::config(format!("delta_t must be positive, got {dt}")));
        }
        if dt > 1.0 {
            return Err(SimError::config("delta_t should not exceed 1 second"));
        }

        if !self.initial_state.is_finite() {
            return Err(SimError::config("initial_state must be finite"));
        }

        self.colors.validate_channels()?;

        if self.guard.check_energy && self.guard.energy_tolerance <= 0.0 {
            return Err(SimError::config("guard.energy_tolerance must be positive"));
        }

        Ok(())
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SimConfigBuilder {
    seed: Option<u64>,
    steps_per_frame: Option<usize>,
    frame_delay_ms: Option<u32>,
    delta_t: Option<f64>,
    frames: Option<usize>,
    randomize: Option<bool>,
    parameters: Option<PhysicalParameters>,
    initial_state: Option<DynamicState>,
    integrator: Option<IntegratorType>,
    guard: Option<GuardConfig>,
}

impl SimConfigBuilder {
    /// Set the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of sub-steps per frame.
    #[must_use]
    pub const fn steps_per_frame(mut self, steps: usize) -> Self {
        self.steps_per_frame = Some(steps);
        self
    }

    /// Set the frame delay in milliseconds.
    #[must_use]
    pub const fn frame_delay_ms(mut self, delay: u32) -> Self {
        self.frame_delay_ms = Some(delay);
        self
    }

    /// Set an explicit integration step in seconds.
    #[must_use]
    pub const fn delta_t(mut self, dt: f64) -> Self {
        self.delta_t = Some(dt);
        self
    }

    /// Set the number of frames.
    #[must_use]
    pub const fn frames(mut self, frames: usize) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Enable or disable random masses and lengths.
    #[must_use]
    pub const fn randomize(mut self, randomize: bool) -> Self {
        self.randomize = Some(randomize);
        self
    }

    /// Set the physical parameters.
    #[must_use]
    pub const fn parameters(mut self, parameters: PhysicalParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Set the initial state.
    #[must_use]
    pub const fn initial_state(mut self, state: DynamicState) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the integrator.
    #[must_use]
    pub const fn integrator(mut self, integrator: IntegratorType) -> Self {
        self.integrator = Some(integrator);
        self
    }

    /// Set guard configuration.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // GuardConfig isn't Copy
    pub fn guard(mut self, guard: GuardConfig) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SimConfig {
        let defaults = SimConfig::default();

        SimConfig {
            seed: self.seed.unwrap_or(defaults.seed),
            steps_per_frame: self.steps_per_frame.unwrap_or(defaults.steps_per_frame),
            frame_delay_ms: self.frame_delay_ms.unwrap_or(defaults.frame_delay_ms),
            delta_t: self.delta_t.or(defaults.delta_t),
            frames: self.frames.unwrap_or(defaults.frames),
            randomize_initial_conditions: self
                .randomize
                .unwrap_or(defaults.randomize_initial_conditions),
            parameters: self.parameters.unwrap_or(defaults.parameters),
            initial_state: self.initial_state.unwrap_or(defaults.initial_state),
            integrator: self.integrator.unwrap_or(defaults.integrator),
            guard: self.guard.unwrap_or(defaults.guard),
            ..defaults
        }
    }
}

/// RGB color with channels in [0, 1].
pub type Rgb = [f64; 3];

/// Colors handed to the rendering side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Figure background.
    pub background: Rgb,
    /// Trace of the upper bob.
    pub upper_trace: Rgb,
    /// Trace of the lower bob.
    pub lower_trace: Rgb,
    /// Arm bars.
    pub bar: Rgb,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: [1.0, 1.0, 1.0],
            upper_trace: [0.0, 0.0, 1.0],
            lower_trace: [1.0, 0.0, 0.0],
            bar: [0.0, 0.0, 0.0],
        }
    }
}

impl ColorScheme {
    /// Light lines on a black background.
    #[must_use]
    pub fn night() -> Self {
        Self {
            background: [0.0, 0.0, 0.0],
            upper_trace: [0.0, 0.0, 1.0],
            lower_trace: [1.0, 1.0, 1.0],
            bar: [1.0, 1.0, 1.0],
        }
    }

    fn validate_channels(&self) -> SimResult<()> {
        let named = [
            ("background", self.background),
            ("upper_trace", self.upper_trace),
            ("lower_trace", self.lower_trace),
            ("bar", self.bar),
        ];
        for (name, rgb) in named {
            if rgb.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(SimError::config(format!(
                    "colors.{name} channels must lie in [0, 1], got {rgb:?}"
                )));
            }
        }
        Ok(())
    }
}
