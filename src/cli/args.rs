//! CLI argument parsing.
//!
//! Hand-rolled parser over any iterator of strings, so every path is
//! testable without touching the process environment.

use std::path::PathBuf;

use crate::visualization::ExportFormat;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
    /// Debug-level logging.
    pub verbose: bool,
}

/// Options shared by `run` and `batch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// YAML configuration; falls back to a preset when absent.
    pub config_path: Option<PathBuf>,
    /// Start from the random-gallery preset instead of the default one.
    pub gallery: bool,
    /// Override the number of frames.
    pub frames: Option<usize>,
    /// Override the seed.
    pub seed: Option<u64>,
    /// Force random masses and lengths.
    pub randomize: bool,
    /// Directory to export trajectories into.
    pub export_dir: Option<PathBuf>,
    /// Export format.
    pub format: ExportFormat,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a single pendulum
    Run(RunOptions),
    /// Run several random pendulums
    Batch {
        /// Shared options.
        options: RunOptions,
        /// Number of runs.
        count: usize,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Default number of runs for `batch`.
pub const DEFAULT_BATCH_COUNT: usize = 8;

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        let verbose = args.iter().skip(1).any(|a| a == "-v" || a == "--verbose");

        let Some(first) = args.get(1) else {
            return Self {
                command: Command::Help,
                verbose,
            };
        };

        let command = match first.as_str() {
            "run" => Command::Run(Self::parse_run_options(&args[2..])),
            "batch" => Self::parse_batch_command(&args[2..]),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command, verbose }
    }

    fn parse_batch_command(rest: &[String]) -> Command {
        let count = rest
            .iter()
            .position(|a| a == "--count")
            .and_then(|i| rest.get(i + 1))
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BATCH_COUNT);

        Command::Batch {
            options: Self::parse_run_options(rest),
            count,
        }
    }

    /// Parse options after the command name. Unknown flags are skipped and
    /// unparsable values keep their defaults.
    fn parse_run_options(rest: &[String]) -> RunOptions {
        let mut options = RunOptions::default();

        let mut i = 0;
        while i < rest.len() {
            let value = rest.get(i + 1);
            match rest[i].as_str() {
                "--frames" => {
                    options.frames = value.and_then(|v| v.parse().ok());
                    i += 2;
                }
                "--seed" => {
                    options.seed = value.and_then(|v| v.parse().ok());
                    i += 2;
                }
                "--export" => {
                    options.export_dir = value.map(PathBuf::from);
                    i += 2;
                }
                "--format" => {
                    match value.map(|v| v.parse::<ExportFormat>()) {
                        Some(Ok(format)) => options.format = format,
                        Some(Err(e)) => eprintln!("Warning: {e}"),
                        None => {}
                    }
                    i += 2;
                }
                "--count" => i += 2,
                "--gallery" => {
                    options.gallery = true;
                    i += 1;
                }
                "--randomize" => {
                    options.randomize = true;
                    i += 1;
                }
                arg if !arg.starts_with('-') && options.config_path.is_none() => {
                    options.config_path = Some(PathBuf::from(arg));
                    i += 1;
                }
                _ => i += 1,
            }
        }

        options
    }
}
