//! Task identity, queue classes and logical time.

use serde::Serialize;
use std::fmt;
use std::ops::Add;

/// Unique ordinal assigned to a task when it is submitted.
///
/// Ids are handed out in submission order and never reused within one
/// event loop, so they double as a debugging handle and a cancellation key.
///
/// # Examples
///
/// ```
/// use core_types::TaskId;
///
/// let id = TaskId(7);
/// assert_eq!(id.to_string(), "#7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The queue class of a task.
///
/// The class is fixed at creation. A ready microtask always runs before a
/// ready macrotask, whatever their timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Deferred work drawn one at a time between full microtask drains
    /// (timers, I/O callbacks, UI events).
    Macrotask,
    /// Deferred work drained to exhaustion before the next macrotask
    /// (promise reactions, `queueMicrotask`).
    Microtask,
}

impl TaskKind {
    /// Returns true for [`TaskKind::Microtask`].
    pub fn is_micro(self) -> bool {
        matches!(self, TaskKind::Microtask)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Macrotask => write!(f, "macrotask"),
            TaskKind::Microtask => write!(f, "microtask"),
        }
    }
}

/// A point on the logical clock.
///
/// Ticks carry no wall-clock meaning; the loop only ever compares them and
/// fast-forwards across idle gaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Ticks(pub u64);

impl Ticks {
    /// The origin of the logical clock.
    pub const ZERO: Ticks = Ticks(0);

    /// Ticks elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn since(self, earlier: Ticks) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for Ticks {
    type Output = Ticks;

    fn add(self, delay: u64) -> Ticks {
        Ticks(self.0.saturating_add(delay))
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
