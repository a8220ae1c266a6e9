//! Command line arguments

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// Deterministic event loop simulator
#[derive(Debug, Parser)]
#[command(name = "evloop", version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of `evloop`
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the available scenarios
    List,

    /// Run a scenario and print its console output and execution trace
    Run {
        /// Scenario name
        scenario: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Stop after this many task executions
        #[arg(long, value_name = "N")]
        step_limit: Option<u64>,

        /// JSON file with loop configuration
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Maximum tracing level selected by `-v` flags.
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
