//! Batch generation of randomly parameterised pendulums.
//!
//! Each run draws its own masses and lengths from an independent RNG stream
//! partitioned off the master seed, so a batch is reproducible from
//! `(seed, count)` alone and no two runs share generator state. A guard halt
//! ends that run only; the batch carries on.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::engine::guard::Guard;
use crate::engine::rng::SimRng;
use crate::engine::state::{DynamicState, PhysicalParameters};
use crate::engine::PendulumSim;
use crate::error::{SimError, SimResult};

/// How a single run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// All frames ran.
    Completed,
    /// The guard stopped the run.
    Halted {
        /// Guard message.
        reason: String,
    },
}

/// Summary of one run in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Position in the batch.
    pub index: usize,
    /// RNG stream the parameters were drawn from.
    pub stream: u64,
    /// Sampled parameters.
    pub params: PhysicalParameters,
    /// Parameter fingerprint.
    pub fingerprint: String,
    /// Frames completed before the run ended.
    pub frames_completed: usize,
    /// Last state reached.
    pub final_state: DynamicState,
    /// Relative energy drift at the last state.
    pub energy_drift: f64,
    /// How the run ended.
    pub outcome: RunOutcome,
}

impl BatchEntry {
    /// Check whether the run completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

/// Result of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Master seed.
    pub seed: u64,
    /// One entry per run, in batch order.
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Number of runs that completed.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.entries.iter().filter(|e| e.is_completed()).count()
    }

    /// Number of runs the guard halted.
    #[must_use]
    pub fn halted(&self) -> usize {
        self.entries.len() - self.completed()
    }
}

/// Generator for batches of random runs.
#[derive(Debug, Clone)]
pub struct BatchGenerator {
    config: SimConfig,
    count: usize,
}

impl BatchGenerator {
    /// Create a generator for `count` runs.
    ///
    /// `randomize_initial_conditions` is forced on.
    ///
    /// # Errors
    ///
    /// Returns error if `count` is zero or the configuration is invalid.
    pub fn new(mut config: SimConfig, count: usize) -> SimResult<Self> {
        if count == 0 {
            return Err(SimError::config("batch count must be at least 1"));
        }
        config.randomize_initial_conditions = true;
        config.check()?;
        Ok(Self { config, count })
    }

    /// Number of runs.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Configuration shared by every run.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run the batch.
    ///
    /// # Errors
    ///
    /// Returns error if a run cannot be constructed.
    pub fn run(&self) -> SimResult<BatchReport> {
        self.run_each(|_, _| Ok(()))
    }

    /// Run the batch, handing each finished simulation to `visit`.
    ///
    /// # Errors
    ///
    /// Returns error if a run cannot be constructed or `visit` fails.
    pub fn run_each<F>(&self, mut visit: F) -> SimResult<BatchReport>
    where
        F: FnMut(&PendulumSim, &BatchEntry) -> SimResult<()>,
    {
        let mut master = SimRng::new(self.config.seed);
        let streams = master.partition(self.count);
        let mut entries = Vec::with_capacity(self.count);

        for (index, mut rng) in streams.into_iter().enumerate() {
            let stream = rng.stream();
            let mut sim = PendulumSim::with_rng(self.config.clone(), &mut rng)?;
            let mut guard = Guard::new(self.config.guard.clone());

            let (frames_completed, outcome) =
                match sim.run_frames(self.config.frames, &mut guard) {
                    Ok(frames) => (frames, RunOutcome::Completed),
                    Err(err) if err.is_guard_violation() => {
                        let frames = frames_run(&sim);
                        (frames, RunOutcome::Halted {
                            reason: err.to_string(),
                        })
                    }
                    Err(err) => return Err(err),
                };

            let entry = BatchEntry {
                index,
                stream,
                params: *sim.params(),
                fingerprint: sim.params().fingerprint(),
                frames_completed,
                final_state: *sim.state(),
                energy_drift: sim.energy_drift(),
                outcome,
            };
            debug!(index, fingerprint = %entry.fingerprint, outcome = ?entry.outcome, "batch run");

            visit(&sim, &entry)?;
            entries.push(entry);
        }

        let report = BatchReport {
            seed: self.config.seed,
            entries,
        };
        info!(
            runs = report.entries.len(),
            completed = report.completed(),
            halted = report.halted(),
            "batch complete"
        );
        Ok(report)
    }
}

/// Whole frames finished before a halt. The halting frame itself counts as
/// not completed.
fn frames_run(sim: &PendulumSim) -> usize {
    let per_frame = sim.config().steps_per_frame.max(1) as u64;
    let frames = sim.step_count() / per_frame;
    usize::try_from(frames.saturating_sub(1)).unwrap_or(usize::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> SimConfig {
        SimConfig::builder().seed(seed).frames(5).steps_per_frame(4).build()
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(BatchGenerator::new(small_config(1), 0).is_err());
    }

    #[test]
    fn test_randomize_forced_on() {
        let generator = BatchGenerator::new(small_config(1), 2).unwrap();
        assert!(generator.config().randomize_initial_conditions);
        assert_eq!(generator.count(), 2);
    }

    #[test]
    fn test_batch_runs_every_entry() {
        let report = BatchGenerator::new(small_config(42), 6).unwrap().run().unwrap();

        assert_eq!(report.seed, 42);
        assert_eq!(report.entries.len(), 6);
        assert_eq!(report.completed() + report.halted(), 6);
        for (i, entry) in report.entries.iter().enumerate() {
            assert_eq!(entry.index, i);
            assert_eq!(entry.stream, i as u64);
            assert_eq!(entry.fingerprint, entry.params.fingerprint());
        }
    }

    #[test]
    fn test_batch_parameters_distinct() {
        let report = BatchGenerator::new(small_config(42), 4).unwrap().run().unwrap();
        let fingerprints: std::collections::HashSet<_> =
            report.entries.iter().map(|e| e.fingerprint.clone()).collect();
        assert_eq!(fingerprints.len(), 4);
    }

    #[test]
    fn test_batch_reproducible() {
        let a = BatchGenerator::new(small_config(7), 3).unwrap().run().unwrap();
        let b = BatchGenerator::new(small_config(7), 3).unwrap().run().unwrap();

        for (x, y) in a.entries.iter().zip(&b.entries) {
            assert_eq!(x.params, y.params);
            assert_eq!(x.final_state.theta1.to_bits(), y.final_state.theta1.to_bits());
        }
    }

    #[test]
    fn test_batch_prefix_stable() {
        // A longer batch with the same seed starts with the same runs.
        let short = BatchGenerator::new(small_config(9), 2).unwrap().run().unwrap();
        let long = BatchGenerator::new(small_config(9), 5).unwrap().run().unwrap();

        assert_eq!(short.entries[0].params, long.entries[0].params);
        assert_eq!(short.entries[1].params, long.entries[1].params);
    }

    #[test]
    fn test_run_each_visits_in_order() {
        let generator = BatchGenerator::new(small_config(3), 3).unwrap();
        let mut seen = Vec::new();

        generator
            .run_each(|sim, entry| {
                seen.push(entry.index);
                assert_eq!(sim.params(), &entry.params);
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_run_each_propagates_visitor_error() {
        let generator = BatchGenerator::new(small_config(3), 3).unwrap();
        let result = generator.run_each(|_, _| Err(SimError::config("stop")));
        assert!(result.is_err());
    }

    #[test]
    fn test_report_serializes() {
        let report = BatchGenerator::new(small_config(5), 2).unwrap().run().unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\""));
        assert!(json.contains(&report.entries[0].fingerprint));
    }
}
