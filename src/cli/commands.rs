//! CLI command handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use crate::batch::{BatchGenerator, BatchReport};
use crate::config::SimConfig;
use crate::engine::guard::Guard;
use crate::engine::state::{DynamicState, PhysicalParameters};
use crate::engine::PendulumSim;
use crate::error::SimResult;
use crate::visualization::{ExportConfig, Exporter, TraceBuffer, Trajectory};

use super::args::RunOptions;
use super::output::{print_batch_report, print_help, print_run_summary, print_version};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run(options) => run_simulation(&options),
        Command::Batch { options, count } => run_batch(&options, count),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Outcome of `run`, for printing.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Parameter fingerprint.
    pub fingerprint: String,
    /// Seed used.
    pub seed: u64,
    /// Parameters used.
    pub params: PhysicalParameters,
    /// Integrator name.
    pub integrator: &'static str,
    /// Frames completed.
    pub frames: usize,
    /// Steps taken.
    pub steps: u64,
    /// Simulated time (s).
    pub elapsed: f64,
    /// State at t = 0.
    pub initial_state: DynamicState,
    /// Last state reached.
    pub final_state: DynamicState,
    /// Relative energy drift at the end.
    pub energy_drift: f64,
    /// Extent of the bob traces.
    pub trace_bounds: Option<((f64, f64), (f64, f64))>,
    /// Exported file, if any.
    pub export_path: Option<PathBuf>,
    /// Guard message when the run was halted.
    pub halted: Option<String>,
}

/// Build the configuration for `options`: file or preset, then overrides.
///
/// # Errors
///
/// Returns error if the file cannot be loaded or the result is invalid.
pub fn resolve_config(options: &RunOptions) -> SimResult<SimConfig> {
    let mut config = match options.config_path {
        Some(ref path) => SimConfig::load(path)?,
        None if options.gallery => SimConfig::random_gallery(),
        None => SimConfig::default(),
    };

    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    if let Some(frames) = options.frames {
        config.frames = frames;
    }
    if options.randomize {
        config.randomize_initial_conditions = true;
    }

    config.check()?;
    Ok(config)
}

/// Run one pendulum for the configured number of frames.
///
/// # Errors
///
/// Returns error on invalid configuration or failed export. A guard halt is
/// reported in the summary, not as an error.
pub fn execute_run(options: &RunOptions) -> SimResult<RunSummary> {
    let config = resolve_config(options)?;
    let frames = config.frames;
    let mut guard = Guard::new(config.guard.clone());
    let mut sim = PendulumSim::new(config)?;
    let mut trace = TraceBuffer::new(0);

    info!(fingerprint = %sim.params().fingerprint(), frames, "run started");

    let mut completed = 0;
    let mut halted = guard
        .check(sim.state(), sim.params())
        .err()
        .map(|e| e.to_string());
    let remaining = if halted.is_some() { 0 } else { frames };
    for _ in 0..remaining {
        sim.advance_frame();
        trace.record(&sim);
        if let Err(e) = guard.check(sim.state(), sim.params()) {
            halted = Some(e.to_string());
            break;
        }
        completed += 1;
    }

    let export_path = match options.export_dir {
        Some(ref dir) => {
            let exporter = Exporter::with_config(ExportConfig {
                format: options.format,
                ..ExportConfig::default()
            });
            Some(exporter.export_to_dir(&Trajectory::from_sim(&sim, 1), dir)?)
        }
        None => None,
    };

    Ok(RunSummary {
        fingerprint: sim.params().fingerprint(),
        seed: sim.config().seed,
        params: *sim.params(),
        integrator: sim.config().integrator.build().name(),
        frames: completed,
        steps: sim.step_count(),
        elapsed: sim.elapsed(),
        initial_state: *sim.initial_state(),
        final_state: *sim.state(),
        energy_drift: sim.energy_drift(),
        trace_bounds: trace.bounds(),
        export_path,
        halted,
    })
}

/// Run several random pendulums, exporting each when asked.
///
/// # Errors
///
/// Returns error on invalid configuration or failed export.
pub fn execute_batch(options: &RunOptions, count: usize) -> SimResult<BatchReport> {
    let config = resolve_config(options)?;
    let generator = BatchGenerator::new(config, count)?;
    let exporter = Exporter::with_config(ExportConfig {
        format: options.format,
        ..ExportConfig::default()
    });

    generator.run_each(|sim, _| {
        if let Some(ref dir) = options.export_dir {
            exporter.export_to_dir(&Trajectory::from_sim(sim, 1), dir)?;
        }
        Ok(())
    })
}

fn run_simulation(options: &RunOptions) -> ExitCode {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║           double-pendulum - Simulation Runner                 ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    match execute_run(options) {
        Ok(summary) => {
            print_run_summary(&summary);
            if summary.halted.is_some() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_batch(options: &RunOptions, count: usize) -> ExitCode {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║           double-pendulum - Batch Generator                   ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    match execute_batch(options, count) {
        Ok(report) => {
            print_batch_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "batch failed");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
