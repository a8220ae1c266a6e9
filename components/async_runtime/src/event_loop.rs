//! Event loop implementation.
//!
//! This module provides the loop driver that coordinates task and microtask
//! execution following the single-threaded event loop model.

use crate::clock::VirtualClock;
use crate::config::LoopConfig;
use crate::run_log::{HaltReason, Outcome, RunEntry, RunLog};
use crate::task_queue::{Action, QueuePair, Task};
use core_types::{SubmissionError, TaskError, TaskId, TaskKind, TaskResult, Ticks};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// The event loop.
///
/// Each pass of the loop:
/// 1. Drains every ready microtask, including microtasks queued while draining
/// 2. Runs exactly one ready macrotask (smallest `ready_at`, then FIFO)
/// 3. Fast-forwards the logical clock when nothing is ready yet
/// 4. Repeats until both queues are empty
///
/// A failing task is recorded in the [`RunLog`] and never stops the loop.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
///
/// let mut event_loop = EventLoop::new();
/// let timeout = event_loop.submit_macrotask(0, |_| Ok(())).unwrap();
/// let microtask = event_loop.submit_microtask(|_| Ok(()));
///
/// let log = event_loop.run();
/// assert_eq!(log.ids(), vec![microtask, timeout]);
/// ```
#[derive(Debug)]
pub struct EventLoop {
    config: LoopConfig,
    queues: QueuePair,
    clock: VirtualClock,
    next_id: u64,
    next_seq: u64,
    current: Option<TaskId>,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues and the default config.
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    /// Creates a new EventLoop with the given config.
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            config,
            queues: QueuePair::new(),
            clock: VirtualClock::new(),
            next_id: 1,
            next_seq: 0,
            current: None,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Current logical time.
    pub fn now(&self) -> Ticks {
        self.clock.now()
    }

    /// The task currently executing, if any.
    pub fn current_task(&self) -> Option<TaskId> {
        self.current
    }

    /// Number of tasks waiting in either queue.
    pub fn pending(&self) -> usize {
        self.queues.len()
    }

    /// Number of tasks waiting in the queue for `kind`.
    pub fn pending_of(&self, kind: TaskKind) -> usize {
        self.queues.queue(kind).len()
    }

    /// Returns true if there is nothing left to run.
    pub fn is_idle(&self) -> bool {
        self.queues.is_empty()
    }

    /// Submits a task.
    ///
    /// Macrotasks become ready `delay` ticks from now; microtasks are ready
    /// immediately and ignore the delay once it has been validated.
    ///
    /// # Errors
    ///
    /// [`SubmissionError::MissingAction`] when `action` is `None`, and
    /// [`SubmissionError::NegativeDelay`] when `delay < 0`. A rejected
    /// submission does not touch the queues or consume an id.
    pub fn submit(
        &mut self,
        kind: TaskKind,
        delay: i64,
        action: Option<Action>,
    ) -> Result<TaskId, SubmissionError> {
        let action = action.ok_or(SubmissionError::MissingAction)?;
        let delay = u64::try_from(delay).map_err(|_| SubmissionError::NegativeDelay(delay))?;

        Ok(self.enqueue(kind, delay, action))
    }

    /// Schedules a macrotask to run `delay` ticks from now (`setTimeout`).
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::NegativeDelay`] for a negative delay.
    pub fn submit_macrotask<F>(&mut self, delay: i64, action: F) -> Result<TaskId, SubmissionError>
    where
        F: FnOnce(&mut EventLoop) -> TaskResult + 'static,
    {
        self.submit(TaskKind::Macrotask, delay, Some(Box::new(action)))
    }

    /// Schedules a microtask (`queueMicrotask`).
    pub fn submit_microtask<F>(&mut self, action: F) -> TaskId
    where
        F: FnOnce(&mut EventLoop) -> TaskResult + 'static,
    {
        self.enqueue(TaskKind::Microtask, 0, Box::new(action))
    }

    fn enqueue(&mut self, kind: TaskKind, delay: u64, action: Action) -> TaskId {
        let now = self.clock.now();
        let ready_at = match kind {
            TaskKind::Microtask => now,
            TaskKind::Macrotask => now + delay,
        };

        let id = TaskId(self.next_id);
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;

        tracing::trace!(task = %id, %kind, %ready_at, "task submitted");
        self.queues.enqueue(Task::new(id, kind, ready_at, seq, action));
        id
    }

    /// Removes a task that has not started yet.
    ///
    /// Returns false if the task already ran, is running, or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let removed = self.queues.remove(id).is_some();
        if removed {
            tracing::debug!(task = %id, "task cancelled");
        }
        removed
    }

    /// Runs the queued tasks until both queues are empty.
    pub fn run(&mut self) -> RunLog {
        let mut log = RunLog::new();
        self.drive(&mut log);
        log.finished_at = self.clock.now();
        log
    }

    /// Runs `script` synchronously as the entry script, then drives the loop.
    ///
    /// An error raised by the script is recorded in
    /// [`RunLog::script_error`]; tasks it queued before raising still run.
    pub fn run_script<F>(&mut self, script: F) -> RunLog
    where
        F: FnOnce(&mut EventLoop) -> TaskResult,
    {
        let mut log = RunLog::new();

        tracing::debug!(at = %self.clock.now(), "running entry script");
        if let Err(error) = self.invoke(script) {
            tracing::warn!(%error, "entry script raised");
            log.script_error = Some(error);
        }

        self.drive(&mut log);
        log.finished_at = self.clock.now();
        log
    }

    fn drive(&mut self, log: &mut RunLog) {
        while !self.queues.is_empty() {
            // Checked before any fast-forward so a halted run reports the
            // time of its last executed task.
            if let Some(limit) = self.config.step_limit {
                if log.len() as u64 >= limit {
                    tracing::warn!(limit, pending = self.queues.len(), "step limit reached");
                    log.halted = Some(HaltReason::StepLimit { limit });
                    return;
                }
            }

            let now = self.clock.now();
            // A ready microtask always wins; otherwise exactly one macrotask runs
            // before the microtask queue is checked again.
            let kind = if self.queues.peek_ready(TaskKind::Microtask, now).is_some() {
                TaskKind::Microtask
            } else if self.queues.peek_ready(TaskKind::Macrotask, now).is_some() {
                TaskKind::Macrotask
            } else {
                match self.queues.next_ready_at() {
                    Some(next) => {
                        self.clock.advance_to(next);
                        tracing::trace!(from = %now, to = %next, "clock advanced");
                        continue;
                    }
                    None => break,
                }
            };

            if let Some(task) = self.queues.dequeue_ready(kind, now) {
                self.execute(task, log);
            }
        }

        tracing::debug!(at = %self.clock.now(), executed = log.len(), "event loop idle");
    }

    fn execute(&mut self, task: Task, log: &mut RunLog) {
        let id = task.id();
        let kind = task.kind();
        let started_at = self.clock.now();

        tracing::debug!(task = %id, %kind, at = %started_at, "running task");
        self.current = Some(id);
        let result = self.invoke(|event_loop| task.run(event_loop));
        self.current = None;

        let outcome = match result {
            Ok(()) => Outcome::Completed,
            Err(error) => {
                tracing::warn!(task = %id, %kind, %error, "task failed");
                Outcome::Failed(error)
            }
        };

        log.push(RunEntry {
            id,
            kind,
            started_at,
            outcome,
        });
    }

    fn invoke<F>(&mut self, f: F) -> TaskResult
    where
        F: FnOnce(&mut EventLoop) -> TaskResult,
    {
        if !self.config.catch_panics {
            return f(self);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(result) => result,
            Err(payload) => Err(TaskError::panicked(panic_message(payload.as_ref()))),
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
