//! Debounce and throttle on logical time.
//!
//! Both helpers wrap a callback and decide, per trigger, whether and when it
//! runs. The debouncer leans on [`EventLoop::cancel`] to reset its timer.

use crate::EventLoop;
use core_types::{SubmissionError, TaskId, TaskResult, Ticks};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Callback = Rc<RefCell<dyn FnMut(&mut EventLoop) -> TaskResult>>;

/// Postpones a callback until `delay` ticks have passed since the last
/// trigger.
///
/// # Examples
///
/// ```
/// use async_runtime::{Debouncer, EventLoop};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let mut event_loop = EventLoop::new();
/// let calls = Rc::new(Cell::new(0));
/// let counter = calls.clone();
/// let search = Debouncer::new(300, move |_| {
///     counter.set(counter.get() + 1);
///     Ok(())
/// })
/// .unwrap();
///
/// search.trigger(&mut event_loop).unwrap();
/// search.trigger(&mut event_loop).unwrap();
/// event_loop.run();
/// assert_eq!(calls.get(), 1);
/// ```
pub struct Debouncer {
    delay: i64,
    callback: Callback,
    pending: Rc<Cell<Option<TaskId>>>,
}

impl Debouncer {
    /// Wraps `callback` with a debounce window of `delay` ticks.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::NegativeDelay`] for a negative delay.
    pub fn new<F>(delay: i64, callback: F) -> Result<Self, SubmissionError>
    where
        F: FnMut(&mut EventLoop) -> TaskResult + 'static,
    {
        if delay < 0 {
            return Err(SubmissionError::NegativeDelay(delay));
        }
        Ok(Self {
            delay,
            callback: Rc::new(RefCell::new(callback)),
            pending: Rc::new(Cell::new(None)),
        })
    }

    /// Restarts the window: any pending call is cancelled and a new one is
    /// scheduled `delay` ticks from now.
    pub fn trigger(&self, event_loop: &mut EventLoop) -> Result<TaskId, SubmissionError> {
        if let Some(previous) = self.pending.take() {
            event_loop.cancel(previous);
        }

        let callback = self.callback.clone();
        let pending = self.pending.clone();
        let id = event_loop.submit_macrotask(self.delay, move |el| {
            pending.set(None);
            let mut callback = callback.borrow_mut();
            (*callback)(el)
        })?;

        tracing::trace!(timer = %id, delay = self.delay, "debounce timer reset");
        self.pending.set(Some(id));
        Ok(id)
    }

    /// Drops the pending call, if any. Returns true if one was cancelled.
    pub fn cancel(&self, event_loop: &mut EventLoop) -> bool {
        self.pending
            .take()
            .map(|id| event_loop.cancel(id))
            .unwrap_or(false)
    }

    /// Returns true while a call is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

/// Runs a callback at most once per `interval` ticks, dropping triggers that
/// arrive inside the window.
pub struct Throttler {
    interval: u64,
    callback: RefCell<Box<dyn FnMut(&mut EventLoop) -> TaskResult>>,
    last_run: Cell<Option<Ticks>>,
}

impl Throttler {
    /// Wraps `callback` with a throttle window of `interval` ticks.
    pub fn new<F>(interval: u64, callback: F) -> Self
    where
        F: FnMut(&mut EventLoop) -> TaskResult + 'static,
    {
        Self {
            interval,
            callback: RefCell::new(Box::new(callback)),
            last_run: Cell::new(None),
        }
    }

    /// Runs the callback synchronously if the window has elapsed.
    ///
    /// Returns `Ok(true)` when the trigger was accepted, `Ok(false)` when it
    /// was dropped.
    ///
    /// # Errors
    ///
    /// Propagates the callback's error; the trigger still counts as accepted.
    pub fn trigger(&self, event_loop: &mut EventLoop) -> Result<bool, core_types::TaskError> {
        let now = event_loop.now();
        if let Some(last) = self.last_run.get() {
            if now.since(last) < self.interval {
                tracing::trace!(at = %now, "throttled trigger dropped");
                return Ok(false);
            }
        }

        self.last_run.set(Some(now));
        let mut callback = self.callback.borrow_mut();
        (*callback)(event_loop)?;
        Ok(true)
    }

    /// Logical time of the last accepted trigger.
    pub fn last_run(&self) -> Option<Ticks> {
        self.last_run.get()
    }
}
