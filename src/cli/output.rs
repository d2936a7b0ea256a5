//! CLI output formatting.

use crate::batch::{BatchReport, RunOutcome};
use crate::engine::state::{DynamicState, PhysicalParameters};

use super::commands::RunSummary;

/// Print version information.
pub fn print_version() {
    println!(
        "double-pendulum {} ({})",
        env!("DOUBLE_PENDULUM_VERSION"),
        env!("GIT_HASH")
    );
}

/// Print help message.
pub fn print_help() {
    println!(
        r"double-pendulum - Double pendulum simulation with semi-implicit Euler

USAGE:
    double-pendulum <COMMAND> [OPTIONS]

COMMANDS:
    run [config.yaml]           Run one pendulum
        --gallery               Start from the random-gallery preset
        --frames <N>            Override the number of frames
        --seed <N>              Override the seed
        --randomize             Draw masses and lengths at random
        --export <DIR>          Write the trajectory into DIR
        --format <F>            Export format: jsonl (default), csv, bin

    batch [config.yaml]         Run several random pendulums
        --count <N>             Number of runs (default: 8)
        (accepts the run options above)

    help                        Show this help message
    version                     Show version information

GLOBAL OPTIONS:
    -v, --verbose               Debug logging

EXAMPLES:
    double-pendulum run
    double-pendulum run --gallery --seed 7 --export out --format csv
    double-pendulum batch --count 20 --frames 100
"
    );
}

fn print_parameters(params: &PhysicalParameters) {
    println!(
        "  g = {:.4}  m1 = {:.4}  m2 = {:.4}  l1 = {:.4}  l2 = {:.4}",
        params.g(),
        params.m1(),
        params.m2(),
        params.l1(),
        params.l2()
    );
}

fn print_state(label: &str, state: &DynamicState) {
    println!(
        "  {label}: θ1 = {:+.6}  θ2 = {:+.6}  ω1 = {:+.6}  ω2 = {:+.6}",
        state.theta1, state.theta2, state.omega1, state.omega2
    );
}

/// Print the result of a single run.
pub fn print_run_summary(summary: &RunSummary) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Fingerprint: {}", summary.fingerprint);
    println!("Seed: {}", summary.seed);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("Parameters:");
    print_parameters(&summary.params);

    println!("\nIntegration:");
    println!("  Integrator: {}", summary.integrator);
    println!("  Frames:     {}", summary.frames);
    println!("  Steps:      {}", summary.steps);
    println!("  Elapsed:    {:.4} s", summary.elapsed);

    println!("\nState:");
    print_state("initial", &summary.initial_state);
    print_state("final  ", &summary.final_state);
    println!("  Energy drift: {:.6e}", summary.energy_drift);

    if let Some(((min_x, min_y), (max_x, max_y))) = summary.trace_bounds {
        println!("  Trace extent: x ∈ [{min_x:.4}, {max_x:.4}], y ∈ [{min_y:.4}, {max_y:.4}]");
    }

    if let Some(ref path) = summary.export_path {
        println!("\nExported: {}", path.display());
    }

    match summary.halted {
        Some(ref reason) => println!("\n✗ Halted: {reason}"),
        None => println!("\n✓ Completed"),
    }
}

/// Print a batch report, one line per run.
pub fn print_batch_report(report: &BatchReport) {
    println!("Seed: {}\n", report.seed);
    println!(
        "  {:>3}  {:<16}  {:>7} {:>7} {:>7} {:>7}  {:>6}  status",
        "#", "fingerprint", "m1", "m2", "l1", "l2", "frames"
    );

    for entry in &report.entries {
        let status = match entry.outcome {
            RunOutcome::Completed => "✓".to_string(),
            RunOutcome::Halted { ref reason } => format!("✗ {reason}"),
        };
        let short: String = entry.fingerprint.chars().take(16).collect();
        println!(
            "  {:>3}  {:<16}  {:>7.4} {:>7.4} {:>7.4} {:>7.4}  {:>6}  {status}",
            entry.index,
            short,
            entry.params.m1(),
            entry.params.m2(),
            entry.params.l1(),
            entry.params.l2(),
            entry.frames_completed
        );
    }

    println!(
        "\n{} runs: {} completed, {} halted",
        report.entries.len(),
        report.completed(),
        report.halted()
    );
}
