//! Trajectory export and trace buffers for the rendering side.
//!
//! The engine only produces states. This module turns them into what a
//! renderer or an offline tool consumes:
//! - [`TraceBuffer`]: bounded history of bob positions for on-screen traces
//! - [`Trajectory`]: per-step frames with positions and energy
//! - [`Exporter`]: JSON Lines, CSV and bincode output, named after the
//!   parameter fingerprint
//!
//! # Example
//!
//! ```rust
//! use double_pendulum::prelude::*;
//! use double_pendulum::visualization::{output_file_name, ExportFormat};
//!
//! let params = PhysicalParameters::default();
//! let name = output_file_name(&params, ExportFormat::Csv);
//! assert!(name.starts_with("double_pendulum_"));
//! assert!(name.ends_with(".csv"));
//! ```

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{self, BufWriter, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::energy::total_energy;
use crate::engine::integrator::IntegratorType;
use crate::engine::sampler::bob_positions;
use crate::engine::state::{DynamicState, PhysicalParameters, Vec3};
use crate::engine::PendulumSim;
use crate::error::{SimError, SimResult};

// ============================================================================
// Trace Buffer
// ============================================================================

/// Bounded history of both bob positions.
///
/// Oldest samples are dropped once `capacity` is reached. A capacity of
/// zero keeps everything.
#[derive(Debug, Clone, Default)]
pub struct TraceBuffer {
    upper: VecDeque<Vec3>,
    lower: VecDeque<Vec3>,
    capacity: usize,
}

impl TraceBuffer {
    /// Create a buffer holding at most `capacity` samples per bob.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            upper: VecDeque::with_capacity(capacity),
            lower: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one pair of positions.
    pub fn push(&mut self, [upper, lower]: [Vec3; 2]) {
        if self.capacity > 0 && self.upper.len() >= self.capacity {
            self.upper.pop_front();
            self.lower.pop_front();
        }
        self.upper.push_back(upper);
        self.lower.push_back(lower);
    }

    /// Append the current positions of `sim`.
    pub fn record(&mut self, sim: &PendulumSim) {
        self.push(sim.latest_positions());
    }

    /// Upper bob samples, oldest first.
    #[must_use]
    pub const fn upper(&self) -> &VecDeque<Vec3> {
        &self.upper
    }

    /// Lower bob samples, oldest first.
    #[must_use]
    pub const fn lower(&self) -> &VecDeque<Vec3> {
        &self.lower
    }

    /// Number of samples per bob.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upper.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.upper.clear();
        self.lower.clear();
    }

    /// Bounding box `(min, max)` of every finite sample in the x-y plane.
    #[must_use]
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        self.upper
            .iter()
            .chain(&self.lower)
            .filter(|p| p.is_finite())
            .fold(None, |acc, p| {
                let ((min_x, min_y), (max_x, max_y)) =
                    acc.unwrap_or(((p.x, p.y), (p.x, p.y)));
                Some((
                    (min_x.min(p.x), min_y.min(p.y)),
                    (max_x.max(p.x), max_y.max(p.y)),
                ))
            })
    }
}

// ============================================================================
// Trajectory Frame
// ============================================================================

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryFrame {
    /// Step number, starting at 1 for the first step.
    pub index: u64,
    /// Simulated time (s).
    pub time: f64,
    /// Angles and angular velocities.
    pub state: DynamicState,
    /// Bob positions, upper first.
    pub positions: [Vec3; 2],
    /// Total mechanical energy.
    pub energy: f64,
}

impl TrajectoryFrame {
    /// Create frame from a state.
    #[must_use]
    pub fn from_state(state: &DynamicState, params: &PhysicalParameters, index: u64, dt: f64) -> Self {
        Self {
            index,
            time: index as f64 * dt,
            state: *state,
            positions: bob_positions(state, params),
            energy: total_energy(state, params),
        }
    }
}

/// Metadata for a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryMetadata {
    /// Run name.
    pub name: String,
    /// Parameter fingerprint.
    pub fingerprint: String,
    /// Physical parameters.
    pub params: PhysicalParameters,
    /// Integration step (s).
    pub dt: f64,
    /// Sub-steps per frame.
    pub steps_per_frame: usize,
    /// RNG seed.
    pub seed: u64,
    /// Stepping scheme.
    pub integrator: IntegratorType,
}

/// Recorded steps of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Run metadata.
    pub metadata: TrajectoryMetadata,
    /// Frames in step order.
    pub frames: Vec<TrajectoryFrame>,
}

impl Trajectory {
    /// Capture every `decimation`-th step of `sim`, always including the
    /// first step.
    #[must_use]
    pub fn from_sim(sim: &PendulumSim, decimation: usize) -> Self {
        let params = sim.params();
        let config = sim.config();
        let frames = sim
            .time_series()
            .iter()
            .enumerate()
            .step_by(decimation.max(1))
            .map(|(i, state)| TrajectoryFrame::from_state(state, params, i as u64 + 1, sim.dt()))
            .collect();

        Self {
            metadata: TrajectoryMetadata {
                name: config.name.clone(),
                fingerprint: params.fingerprint(),
                params: *params,
                dt: sim.dt(),
                steps_per_frame: config.steps_per_frame,
                seed: config.seed,
                integrator: config.integrator,
            },
            frames,
        }
    }

    /// Get number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Time span covered (s).
    #[must_use]
    pub fn duration(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }
}

// ============================================================================
// Export Pipeline
// ============================================================================

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// JSON Lines, one frame per line.
    #[default]
    JsonLines,
    /// CSV with a header row.
    Csv,
    /// Binary format (bincode), trajectory with metadata.
    Binary,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::JsonLines => "jsonl",
            Self::Csv => "csv",
            Self::Binary => "bin",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jsonl" | "json-lines" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            "bin" | "binary" => Ok(Self::Binary),
            other => Err(SimError::config(format!(
                "unknown export format '{other}' (expected jsonl, csv or bin)"
            ))),
        }
    }
}

/// Output file name for a parameter set: `double_pendulum_<fingerprint>.<ext>`.
#[must_use]
pub fn output_file_name(params: &PhysicalParameters, format: ExportFormat) -> String {
    format!("double_pendulum_{}.{}", params.fingerprint(), format.extension())
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,
    /// Decimation factor (1 = every step, 2 = every other, etc.).
    pub decimation: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::JsonLines,
            decimation: 1,
        }
    }
}

/// Exporter for trajectories.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create new exporter with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config.
    #[must_use]
    pub const fn with_config(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export trajectory to JSON Lines format.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn to_json_lines(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        let mut writer = create(path)?;

        for frame in self.selected(trajectory) {
            let json = serde_json::to_string(frame)
                .map_err(|e| SimError::serialization(format!("JSON serialization failed: {e}")))?;
            writeln!(writer, "{json}").map_err(|e| SimError::io(format!("Write failed: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| SimError::io(format!("Flush failed: {e}")))
    }

    /// Export trajectory to CSV format.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn to_csv(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        let mut writer = create(path)?;

        writeln!(
            writer,
            "index,time,theta1,theta2,omega1,omega2,x0,y0,z0,x1,y1,z1,energy"
        )
        .map_err(|e| SimError::io(format!("Write header failed: {e}")))?;

        for frame in self.selected(trajectory) {
            let s = &frame.state;
            let mut line = format!(
                "{},{},{},{},{},{}",
                frame.index, frame.time, s.theta1, s.theta2, s.omega1, s.omega2
            );
            for p in &frame.positions {
                let _ = write!(line, ",{},{},{}", p.x, p.y, p.z);
            }
            let _ = write!(line, ",{}", frame.energy);

            writeln!(writer, "{line}")
                .map_err(|e| SimError::io(format!("Write data failed: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| SimError::io(format!("Flush failed: {e}")))
    }

    /// Export trajectory to binary format (bincode).
    ///
    /// Decimation is applied to the frames; metadata is kept whole.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn to_binary(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        let writer = create(path)?;
        let selected = Trajectory {
            metadata: trajectory.metadata.clone(),
            frames: self.selected(trajectory).cloned().collect(),
        };

        bincode::serialize_into(writer, &selected)
            .map_err(|e| SimError::serialization(format!("Binary serialization failed: {e}")))
    }

    /// Load trajectory from binary format.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn from_binary(path: &Path) -> SimResult<Trajectory> {
        let file =
            File::open(path).map_err(|e| SimError::io(format!("Failed to open file: {e}")))?;
        let reader = io::BufReader::new(file);

        bincode::deserialize_from(reader)
            .map_err(|e| SimError::serialization(format!("Binary deserialization failed: {e}")))
    }

    /// Export using configured format.
    ///
    /// # Errors
    ///
    /// Returns error if export fails.
    pub fn export(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        match self.config.format {
            ExportFormat::JsonLines => self.to_json_lines(trajectory, path),
            ExportFormat::Csv => self.to_csv(trajectory, path),
            ExportFormat::Binary => self.to_binary(trajectory, path),
        }
    }

    /// Export into `dir` under the fingerprint-derived file name.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or export fails.
    pub fn export_to_dir(&self, trajectory: &Trajectory, dir: &Path) -> SimResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(output_file_name(&trajectory.metadata.params, self.config.format));
        self.export(trajectory, &path)?;
        info!(path = %path.display(), frames = trajectory.len(), "trajectory exported");
        Ok(path)
    }

    fn selected<'a>(&self, trajectory: &'a Trajectory) -> impl Iterator<Item = &'a TrajectoryFrame> {
        trajectory.frames.iter().step_by(self.config.decimation.max(1))
    }
}

fn create(path: &Path) -> SimResult<BufWriter<File>> {
    let file =
        File::create(path).map_err(|e| SimError::io(format!("Failed to create file: {e}")))?;
    Ok(BufWriter::new(file))
}

// ============================================================================
// Tests
// ============================================================================
