//! double-pendulum CLI
//!
//! Command-line interface for running pendulum simulations.

use std::process::ExitCode;

use double_pendulum::cli::{run_cli, Args};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging disabled: {e}");
    }

    run_cli(args)
}
