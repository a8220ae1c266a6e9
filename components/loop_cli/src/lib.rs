//! Event loop simulator CLI library
//!
//! Provides the demo scenarios, their runner, and the argument parser for
//! the `evloop` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod report;
pub mod scenarios;

pub use cli::{Cli, Command};
pub use config::load_config;
pub use console::Console;
pub use error::{CliError, CliResult};
pub use report::{run_scenario, with_quiet_panics, ScenarioReport};
pub use scenarios::{find_scenario, Scenario, SCENARIOS};
