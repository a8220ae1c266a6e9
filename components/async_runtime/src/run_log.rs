//! Ordered record of what a run executed.

use core_types::{TaskError, TaskId, TaskKind, Ticks};
use serde::Serialize;

/// How a single task execution ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The action returned normally
    Completed,
    /// The action raised; the loop carried on
    Failed(TaskError),
}

impl Outcome {
    /// Returns true for [`Outcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// One executed task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunEntry {
    /// The task that ran
    pub id: TaskId,
    /// Its queue class
    pub kind: TaskKind,
    /// Logical time at which it started
    pub started_at: Ticks,
    /// How it ended
    pub outcome: Outcome,
}

/// Why a run stopped before the queues were empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum HaltReason {
    /// The configured step limit was reached
    StepLimit {
        /// The limit in effect
        limit: u64,
    },
}

/// The ordered execution log returned by a run.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
///
/// let mut event_loop = EventLoop::new();
/// let id = event_loop.submit_microtask(|_| Ok(()));
/// let log = event_loop.run();
/// assert_eq!(log.ids(), vec![id]);
/// assert!(log.failures().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunLog {
    /// Executed tasks in execution order
    pub entries: Vec<RunEntry>,
    /// Failure raised by the entry script, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_error: Option<TaskError>,
    /// Set when the run stopped with tasks still queued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted: Option<HaltReason>,
    /// Logical time when the run ended
    pub finished_at: Ticks,
}

impl RunLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: RunEntry) {
        self.entries.push(entry);
    }

    /// Ids of executed tasks, in execution order.
    pub fn ids(&self) -> Vec<TaskId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Entries whose action raised.
    pub fn failures(&self) -> Vec<&RunEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.outcome.is_failed())
            .collect()
    }

    /// Looks up the entry for a task.
    pub fn entry(&self, id: TaskId) -> Option<&RunEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Returns true if `id` was executed during this run.
    pub fn executed(&self, id: TaskId) -> bool {
        self.entry(id).is_some()
    }

    /// Number of executed tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing ran.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
