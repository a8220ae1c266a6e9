//! Task and queue management.
//!
//! This module provides the task record and the pair of queues the event loop
//! draws from: one for macrotasks and one for microtasks. Queues never run
//! anything themselves; they only store tasks and answer "which task is ready
//! next".

use crate::EventLoop;
use core_types::{TaskId, TaskKind, TaskResult, Ticks};
use std::collections::VecDeque;

/// The work carried by a task.
///
/// The action receives the event loop so it can enqueue further tasks of
/// either kind. Returning an error counts as raising.
pub type Action = Box<dyn FnOnce(&mut EventLoop) -> TaskResult>;

/// A unit of deferred work.
///
/// Tasks are immutable once built; the event loop assigns the id, readiness
/// and submission sequence at submission time.
pub struct Task {
    id: TaskId,
    kind: TaskKind,
    ready_at: Ticks,
    enqueue_seq: u64,
    action: Action,
}

impl Task {
    /// Creates a new task.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique ordinal of the task
    /// * `kind` - Queue class
    /// * `ready_at` - Earliest logical time the task may run
    /// * `enqueue_seq` - Submission sequence, the FIFO tie-break
    /// * `action` - The work to perform
    pub fn new(id: TaskId, kind: TaskKind, ready_at: Ticks, enqueue_seq: u64, action: Action) -> Self {
        Self {
            id,
            kind,
            ready_at,
            enqueue_seq,
            action,
        }
    }

    /// The task's id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The task's queue class.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Earliest logical time the task may run.
    pub fn ready_at(&self) -> Ticks {
        self.ready_at
    }

    /// Submission sequence number.
    pub fn enqueue_seq(&self) -> u64 {
        self.enqueue_seq
    }

    /// Returns true if the task may run at `now`.
    pub fn is_ready(&self, now: Ticks) -> bool {
        self.ready_at <= now
    }

    /// Executes the task, consuming it.
    pub fn run(self, event_loop: &mut EventLoop) -> TaskResult {
        (self.action)(event_loop)
    }

    fn order_key(&self) -> (Ticks, u64) {
        (self.ready_at, self.enqueue_seq)
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("ready_at", &self.ready_at)
            .field("enqueue_seq", &self.enqueue_seq)
            .finish_non_exhaustive()
    }
}

/// A queue holding tasks of one class.
///
/// Tasks are appended in submission order. Selection picks the ready task
/// with the smallest `(ready_at, enqueue_seq)`; for microtasks, whose
/// readiness is their submission time, that is always the front.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    /// Creates a new empty TaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a task to the end of the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Returns the next ready task without removing it.
    pub fn peek_ready(&self, now: Ticks) -> Option<&Task> {
        self.ready_index(now).and_then(|index| self.queue.get(index))
    }

    /// Removes and returns the task [`peek_ready`](Self::peek_ready) reports.
    pub fn dequeue_ready(&mut self, now: Ticks) -> Option<Task> {
        self.ready_index(now).and_then(|index| self.queue.remove(index))
    }

    /// Removes a task by id, if it is still queued.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.queue.iter().position(|task| task.id == id)?;
        self.queue.remove(index)
    }

    /// Returns the earliest `ready_at` among queued tasks.
    pub fn next_ready_at(&self) -> Option<Ticks> {
        self.queue.iter().map(Task::ready_at).min()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    fn ready_index(&self, now: Ticks) -> Option<usize> {
        self.queue
            .iter()
            .enumerate()
            .filter(|(_, task)| task.is_ready(now))
            .min_by_key(|(_, task)| task.order_key())
            .map(|(index, _)| index)
    }
}

/// The macrotask and microtask queues, routed by task kind.
#[derive(Debug, Default)]
pub struct QueuePair {
    macrotasks: TaskQueue,
    microtasks: TaskQueue,
}

impl QueuePair {
    /// Creates an empty pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task to the queue matching its kind.
    pub fn enqueue(&mut self, task: Task) {
        self.queue_mut(task.kind()).enqueue(task);
    }

    /// Returns the next ready task of `kind` without removing it.
    pub fn peek_ready(&self, kind: TaskKind, now: Ticks) -> Option<&Task> {
        self.queue(kind).peek_ready(now)
    }

    /// Removes and returns the next ready task of `kind`.
    pub fn dequeue_ready(&mut self, kind: TaskKind, now: Ticks) -> Option<Task> {
        self.queue_mut(kind).dequeue_ready(now)
    }

    /// Removes a task from whichever queue holds it.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        self.microtasks
            .remove(id)
            .or_else(|| self.macrotasks.remove(id))
    }

    /// Returns the earliest `ready_at` across both queues.
    pub fn next_ready_at(&self) -> Option<Ticks> {
        match (self.microtasks.next_ready_at(), self.macrotasks.next_ready_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Returns the queue for `kind`.
    pub fn queue(&self, kind: TaskKind) -> &TaskQueue {
        match kind {
            TaskKind::Macrotask => &self.macrotasks,
            TaskKind::Microtask => &self.microtasks,
        }
    }

    fn queue_mut(&mut self, kind: TaskKind) -> &mut TaskQueue {
        match kind {
            TaskKind::Macrotask => &mut self.macrotasks,
            TaskKind::Microtask => &mut self.microtasks,
        }
    }

    /// Total number of queued tasks.
    pub fn len(&self) -> usize {
        self.macrotasks.len() + self.microtasks.len()
    }

    /// Returns true if both queues are empty.
    pub fn is_empty(&self) -> bool {
        self.macrotasks.is_empty() && self.microtasks.is_empty()
    }
}
