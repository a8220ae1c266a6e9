//! Event loop simulator CLI
//!
//! Entry point for the `evloop` binary. Parses CLI arguments, sets up
//! logging, and runs the requested scenario.

use clap::Parser as ClapParser;
use loop_cli::{
    find_scenario, load_config, run_scenario, with_quiet_panics, Cli, CliResult, Command, SCENARIOS,
};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(command: Command) -> CliResult<()> {
    match command {
        Command::List => {
            for scenario in SCENARIOS {
                println!("{:<24} {}", scenario.name, scenario.summary);
            }
        }
        Command::Run {
            scenario,
            json,
            step_limit,
            config,
        } => {
            let scenario = find_scenario(&scenario)?;
            let config = load_config(config.as_deref(), step_limit)?;
            // Uncaught panics must still reach the default hook.
            let report = if config.catch_panics {
                with_quiet_panics(|| run_scenario(scenario, config))
            } else {
                run_scenario(scenario, config)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
    }
    Ok(())
}
