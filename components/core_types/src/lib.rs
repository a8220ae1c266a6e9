//! Core types shared by the event loop simulator.
//!
//! This crate provides the foundational vocabulary of the simulator: task
//! identity and classification, logical time, the values carried by promises,
//! and the error types raised at submission and execution time.
//!
//! # Overview
//!
//! - [`TaskId`] - Unique ordinal assigned to every submitted task
//! - [`TaskKind`] - Macrotask or microtask queue class
//! - [`Ticks`] - A point on the logical clock
//! - [`Value`] - Script-level values passed through promises
//! - [`TaskError`] - Failure raised by a task's action
//! - [`SubmissionError`] - Rejection of a malformed submission
//!
//! # Examples
//!
//! ```
//! use core_types::{TaskError, TaskErrorKind, TaskKind, Ticks, Value};
//!
//! let deadline = Ticks(10) + 5;
//! assert_eq!(deadline, Ticks(15));
//! assert!(TaskKind::Microtask.is_micro());
//!
//! let error = TaskError::thrown("boom");
//! assert_eq!(error.kind, TaskErrorKind::Thrown);
//! assert_eq!(Value::from("ok").to_string(), "ok");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod task;
mod value;

pub use error::{SubmissionError, TaskError, TaskErrorKind, TaskResult};
pub use task::{TaskId, TaskKind, Ticks};
pub use value::Value;
