//! CLI module for double-pendulum.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested. The
//! entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, RunOptions, DEFAULT_BATCH_COUNT};
pub use commands::{execute_batch, execute_run, resolve_config, run_cli, RunSummary};
pub use output::{print_batch_report, print_help, print_run_summary, print_version};
