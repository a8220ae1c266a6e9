//! Event loop configuration.

use serde::{Deserialize, Serialize};

/// Tunables for an [`EventLoop`](crate::EventLoop).
///
/// The defaults give the unbounded drain semantics; a step limit only exists
/// so that a starving workload can be stopped and inspected.
///
/// # Examples
///
/// ```
/// use async_runtime::LoopConfig;
///
/// let config = LoopConfig::default().with_step_limit(Some(100));
/// assert_eq!(config.step_limit, Some(100));
/// assert!(config.catch_panics);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    /// Maximum task executions per run, `None` for no bound
    pub step_limit: Option<u64>,
    /// Record a panicking action as a failed task instead of unwinding.
    ///
    /// Capture does not touch the process panic hook, so the default hook
    /// still prints each caught panic to stderr; callers that want silence
    /// install their own hook around the run.
    pub catch_panics: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            catch_panics: true,
        }
    }
}

impl LoopConfig {
    /// Sets the step limit.
    pub fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.step_limit = limit;
        self
    }

    /// Enables or disables panic capture.
    pub fn with_catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }
}
