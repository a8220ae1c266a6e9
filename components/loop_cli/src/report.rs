//! Running scenarios and rendering their reports

use crate::console::Console;
use crate::scenarios::Scenario;
use async_runtime::{EventLoop, HaltReason, LoopConfig, Outcome, RunLog};
use serde::Serialize;
use std::fmt::Write;
use std::panic;

/// Everything a scenario run produced.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: &'static str,
    /// Lines logged by the scenario, in order
    pub console: Vec<String>,
    /// Execution trace
    pub run: RunLog,
}

/// Runs a scenario on a fresh event loop.
///
/// The scenario's own step limit applies when `config` does not set one.
///
/// # Example
/// ```
/// use async_runtime::LoopConfig;
/// use loop_cli::{find_scenario, run_scenario};
///
/// let scenario = find_scenario("microtask-chain").unwrap();
/// let report = run_scenario(scenario, LoopConfig::default());
/// assert_eq!(report.console, vec!["A", "B", "M"]);
/// ```
pub fn run_scenario(scenario: &Scenario, mut config: LoopConfig) -> ScenarioReport {
    if config.step_limit.is_none() {
        config.step_limit = scenario.default_step_limit;
    }

    tracing::info!(scenario = scenario.name, ?config, "running scenario");
    let console = Console::new();
    let mut event_loop = EventLoop::with_config(config);
    let run = event_loop.run_script(|el| (scenario.script)(el, &console));

    ScenarioReport {
        scenario: scenario.name,
        console: console.lines(),
        run,
    }
}

/// Runs `f` with the panic hook replaced by a `tracing` event, then puts the
/// previous hook back.
///
/// Task panics caught by the loop would otherwise be printed by the default
/// hook in the middle of the report.
pub fn with_quiet_panics<T>(f: impl FnOnce() -> T) -> T {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "panic captured by the event loop");
    }));
    let result = f();
    panic::set_hook(previous);
    result
}

impl ScenarioReport {
    /// Human readable rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "scenario: {}", self.scenario);

        let _ = writeln!(out, "\nconsole:");
        for line in &self.console {
            let _ = writeln!(out, "  {}", line);
        }

        let _ = writeln!(out, "\ntrace:");
        if let Some(error) = &self.run.script_error {
            let _ = writeln!(out, "  script      {}", error);
        }
        for entry in &self.run.entries {
            let status = match &entry.outcome {
                Outcome::Completed => "ok".to_string(),
                Outcome::Failed(error) => format!("FAILED {}", error),
            };
            let _ = writeln!(
                out,
                "  {:<5} {:<9} {:<8} {}",
                entry.id.to_string(),
                entry.kind.to_string(),
                entry.started_at.to_string(),
                status
            );
        }

        match self.run.halted {
            Some(HaltReason::StepLimit { limit }) => {
                let _ = writeln!(out, "\nhalted: step limit of {} reached", limit);
            }
            None => {
                let _ = writeln!(out, "\nfinished at {}", self.run.finished_at);
            }
        }
        out
    }
}
