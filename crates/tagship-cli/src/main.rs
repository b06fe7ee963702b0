//! tagship CLI - Cross-platform release pipeline
//!
//! Commands:
//! - `tagship run` - Build every target and, for a tag push, publish the release
//! - `tagship targets` - Print the build matrix
//! - `tagship check` - Validate a tagship.toml configuration
//! - `tagship init` - Write a starter tagship.toml

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tagship_core::{LogLevel, PipelineError};

mod check;
mod init;
mod run;
mod targets;

#[derive(Parser)]
#[command(name = "tagship")]
#[command(author, version, about = "Build, collect, and publish release binaries", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the release pipeline
    Run {
        /// Version tag that triggered the run (e.g. v1.2.0 or refs/tags/v1.2.0)
        #[arg(long, required_unless_present = "manual", conflicts_with = "manual")]
        tag: Option<String>,

        /// Operator-initiated run: build and stage, never publish
        #[arg(long)]
        manual: bool,

        /// Path to tagship.toml (default: ./tagship.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the build matrix
    Targets {
        /// Path to tagship.toml (default: ./tagship.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a tagship.toml configuration
    Check {
        /// Path to tagship.toml (default: ./tagship.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a starter tagship.toml
    Init {
        /// Project name (default: name of the directory)
        #[arg(short, long)]
        name: Option<String>,

        /// Directory to write into (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

impl Cli {
    /// Level picked by `-v`/`-q`, if either was given
    fn flag_level(&self) -> Option<LogLevel> {
        match (self.quiet, self.verbose) {
            (true, _) => Some(LogLevel::Warn),
            (false, 0) => None,
            (false, 1) => Some(LogLevel::Debug),
            (false, _) => Some(LogLevel::Trace),
        }
    }

    fn log_level(&self) -> LogLevel {
        self.flag_level().unwrap_or(LogLevel::Info)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let events = tagship_logging::init_logging(cli.log_level());
    let flag_level = cli.flag_level();

    let result = match cli.command {
        Commands::Run {
            tag,
            manual: _,
            config,
            json,
        } => run::run(tag, config, json, flag_level, &events),
        Commands::Targets { config } => targets::run(config),
        Commands::Check { config } => check::run(config),
        Commands::Init { name, path } => init::run(name, path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Pipeline errors keep their own exit code through any added context
fn exit_code(error: &anyhow::Error) -> u8 {
    error
        .downcast_ref::<PipelineError>()
        .map(|e| u8::try_from(e.exit_code()).unwrap_or(1))
        .unwrap_or(1)
}

/// Resolve `--config`, defaulting to `./tagship.toml`
fn config_path(config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(|| PathBuf::from(tagship_core::CONFIG_FILE))
}
