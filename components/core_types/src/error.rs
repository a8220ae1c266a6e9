//! Task failure and submission error types.
//!
//! Execution-time failures ([`TaskError`]) are captured per task and never
//! stop the loop. Submission-time failures ([`SubmissionError`]) are returned
//! synchronously to the caller and leave the loop untouched.

use serde::Serialize;
use thiserror::Error;

/// How a task's action failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskErrorKind {
    /// The action returned an error (a thrown exception)
    Thrown,
    /// The action panicked while running
    Panicked,
    /// A promise settled as rejected without a handler
    Rejected,
}

impl std::fmt::Display for TaskErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskErrorKind::Thrown => write!(f, "Uncaught"),
            TaskErrorKind::Panicked => write!(f, "Panicked"),
            TaskErrorKind::Rejected => write!(f, "Uncaught (in promise)"),
        }
    }
}

/// A failure raised by a task's action.
///
/// # Examples
///
/// ```
/// use core_types::{TaskError, TaskErrorKind};
///
/// let error = TaskError::thrown("undefined is not a function");
/// assert_eq!(error.kind, TaskErrorKind::Thrown);
/// assert_eq!(error.to_string(), "Uncaught: undefined is not a function");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct TaskError {
    /// The type of failure
    pub kind: TaskErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl TaskError {
    /// Creates a new error of the given kind.
    pub fn new(kind: TaskErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// An error returned from an action.
    pub fn thrown(message: impl Into<String>) -> Self {
        Self::new(TaskErrorKind::Thrown, message)
    }

    /// An action that panicked.
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::new(TaskErrorKind::Panicked, message)
    }

    /// A rejection nobody handled.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(TaskErrorKind::Rejected, message)
    }
}

/// Result type returned by task actions.
pub type TaskResult = Result<(), TaskError>;

/// A submission rejected before it reached any queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The requested delay was negative
    #[error("invalid submission: negative delay {0}")]
    NegativeDelay(i64),
    /// No action was supplied
    #[error("invalid submission: missing action")]
    MissingAction,
}

/// A submission rejected from inside a running action surfaces as a thrown
/// error of that action.
impl From<SubmissionError> for TaskError {
    fn from(err: SubmissionError) -> Self {
        TaskError::thrown(err.to_string())
    }
}
