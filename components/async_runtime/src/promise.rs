//! Promise implementation on top of the event loop.
//!
//! Settling a promise never runs its handlers inline: every reaction is
//! queued as a microtask, which is what makes `.then` callbacks run after the
//! current script or task but before the next timer.

use crate::EventLoop;
use core_types::{TaskError, TaskResult, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been resolved with a value.
    Fulfilled(Value),
    /// The promise has been rejected with a reason.
    Rejected(Value),
}

/// The result a promise settles with: `Ok` fulfils, `Err` rejects.
pub type Settlement = Result<Value, Value>;

/// What a promise is resolved with: a plain value fulfils it, another
/// promise makes it follow that promise's eventual settlement.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Fulfil with this value
    Value(Value),
    /// Adopt the state of this promise once it settles
    Promise(Promise),
}

impl From<Value> for Resolution {
    fn from(value: Value) -> Self {
        Resolution::Value(value)
    }
}

impl From<Promise> for Resolution {
    fn from(promise: Promise) -> Self {
        Resolution::Promise(promise)
    }
}

/// Result of a `.then`/`.catch` handler.
///
/// `Ok` resolves the derived promise (possibly with another promise), `Err`
/// rejects it (a thrown exception inside the handler).
pub type HandlerResult = Result<Resolution, Value>;

/// A `.then`/`.catch` handler. It runs inside a microtask and may use the
/// loop, e.g. to start the next asynchronous step.
pub type Handler = Box<dyn FnOnce(&mut EventLoop, Value) -> HandlerResult>;

/// Low-level reaction run as a microtask with the settlement.
pub(crate) type Reaction = Box<dyn FnOnce(&mut EventLoop, Settlement) -> TaskResult>;

struct PromiseInner {
    state: PromiseState,
    reactions: Vec<Reaction>,
    handled: bool,
    // Resolved with another promise and waiting on it.
    following: bool,
}

/// A single-threaded promise.
///
/// Cloning a `Promise` yields another handle to the same promise.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Promise, PromiseState};
/// use core_types::Value;
///
/// let mut event_loop = EventLoop::new();
/// let promise = Promise::new();
/// let doubled = promise.then(&mut event_loop, |v| match v {
///     Value::Smi(n) => Ok(Value::Smi(n * 2)),
///     other => Err(other),
/// });
///
/// promise.resolve(&mut event_loop, Value::Smi(21));
/// assert_eq!(doubled.state(), PromiseState::Pending);
///
/// event_loop.run();
/// assert_eq!(doubled.state(), PromiseState::Fulfilled(Value::Smi(42)));
/// ```
#[derive(Clone)]
pub struct Promise {
    inner: Rc<RefCell<PromiseInner>>,
}

impl Promise {
    /// Creates a new pending Promise.
    pub fn new() -> Self {
        Self::with_state(PromiseState::Pending)
    }

    /// Creates an already-fulfilled promise (`Promise.resolve(value)`).
    pub fn resolved(value: Value) -> Self {
        Self::with_state(PromiseState::Fulfilled(value))
    }

    /// Creates an already-rejected promise (`Promise.reject(reason)`).
    ///
    /// The rejection is treated as handled; it is not reported even if no
    /// reaction is ever attached.
    pub fn rejected(reason: Value) -> Self {
        let promise = Self::with_state(PromiseState::Rejected(reason));
        promise.inner.borrow_mut().handled = true;
        promise
    }

    fn with_state(state: PromiseState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PromiseInner {
                state,
                reactions: Vec::new(),
                handled: false,
                following: false,
            })),
        }
    }

    /// Creates a promise settled by a macrotask `delay` ticks from now.
    ///
    /// This is `new Promise((resolve, reject) => setTimeout(..., delay))`.
    ///
    /// # Errors
    ///
    /// Fails like [`EventLoop::submit_macrotask`] for a negative delay.
    pub fn delayed(
        event_loop: &mut EventLoop,
        delay: i64,
        settlement: Settlement,
    ) -> Result<Self, core_types::SubmissionError> {
        let promise = Promise::new();
        let target = promise.clone();
        event_loop.submit_macrotask(delay, move |el| {
            target.settle(el, settlement);
            Ok(())
        })?;
        Ok(promise)
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> PromiseState {
        self.inner.borrow().state.clone()
    }

    /// Returns true while the promise is neither fulfilled nor rejected.
    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().state, PromiseState::Pending)
    }

    /// Returns true once any reaction has been attached.
    pub fn is_handled(&self) -> bool {
        self.inner.borrow().handled
    }

    /// Resolves the promise with a value or another promise.
    ///
    /// A value fulfils it at once. A promise is adopted: this promise settles
    /// the same way, in a microtask after the adopted one settles. Returns
    /// false if the promise was already settled or already following
    /// another promise.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_runtime::{EventLoop, Promise, PromiseState};
    /// use core_types::Value;
    ///
    /// let mut event_loop = EventLoop::new();
    /// let outer = Promise::new();
    /// let inner = Promise::delayed(&mut event_loop, 50, Ok(Value::Smi(1))).unwrap();
    ///
    /// assert!(outer.resolve(&mut event_loop, inner));
    /// assert!(!outer.resolve(&mut event_loop, Value::Smi(2)));
    ///
    /// event_loop.run();
    /// assert_eq!(outer.state(), PromiseState::Fulfilled(Value::Smi(1)));
    /// ```
    pub fn resolve(&self, event_loop: &mut EventLoop, resolution: impl Into<Resolution>) -> bool {
        match resolution.into() {
            Resolution::Value(value) => self.settle(event_loop, Ok(value)),
            Resolution::Promise(source) => self.follow(event_loop, source),
        }
    }

    /// Rejects the promise. Returns false if it was already settled.
    pub fn reject(&self, event_loop: &mut EventLoop, reason: Value) -> bool {
        self.settle(event_loop, Err(reason))
    }

    /// Settles the promise and queues one microtask per registered reaction.
    ///
    /// A rejection with no reactions also queues a check that reports the
    /// rejection as a failed task if nothing has handled it by the time the
    /// check runs.
    pub fn settle(&self, event_loop: &mut EventLoop, settlement: Settlement) -> bool {
        if self.inner.borrow().following {
            return false;
        }
        self.transition(event_loop, settlement)
    }

    fn follow(&self, event_loop: &mut EventLoop, source: Promise) -> bool {
        if Rc::ptr_eq(&self.inner, &source.inner) {
            let cycle = Value::object([
                ("name", Value::from("TypeError")),
                ("message", Value::from("Chaining cycle detected for promise")),
            ]);
            return self.reject(event_loop, cycle);
        }

        {
            let mut inner = self.inner.borrow_mut();
            if inner.following || !matches!(inner.state, PromiseState::Pending) {
                return false;
            }
            inner.following = true;
        }

        let target = self.clone();
        source.subscribe(
            event_loop,
            Box::new(move |el, settlement| {
                target.transition(el, settlement);
                Ok(())
            }),
        );
        true
    }

    fn transition(&self, event_loop: &mut EventLoop, settlement: Settlement) -> bool {
        let reactions = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, PromiseState::Pending) {
                return false;
            }
            inner.following = false;
            inner.state = match &settlement {
                Ok(value) => PromiseState::Fulfilled(value.clone()),
                Err(reason) => PromiseState::Rejected(reason.clone()),
            };
            std::mem::take(&mut inner.reactions)
        };

        if let Err(reason) = &settlement {
            if reactions.is_empty() {
                let promise = self.clone();
                let reason = reason.clone();
                event_loop.submit_microtask(move |_| {
                    if promise.is_handled() {
                        Ok(())
                    } else {
                        Err(TaskError::rejected(reason.to_string()))
                    }
                });
            }
        }

        for reaction in reactions {
            let settlement = settlement.clone();
            event_loop.submit_microtask(move |el| reaction(el, settlement));
        }
        true
    }

    /// Registers a raw reaction, queueing it at once if already settled.
    pub(crate) fn subscribe(&self, event_loop: &mut EventLoop, reaction: Reaction) {
        let mut inner = self.inner.borrow_mut();
        inner.handled = true;
        let settled = match &inner.state {
            PromiseState::Pending => None,
            PromiseState::Fulfilled(value) => Some(Ok(value.clone())),
            PromiseState::Rejected(reason) => Some(Err(reason.clone())),
        };

        match settled {
            None => inner.reactions.push(reaction),
            Some(settled) => {
                drop(inner);
                event_loop.submit_microtask(move |el| reaction(el, settled));
            }
        }
    }

    /// Attaches optional fulfilment and rejection handlers.
    ///
    /// A missing handler passes the settlement through to the derived
    /// promise unchanged.
    pub fn then_with(
        &self,
        event_loop: &mut EventLoop,
        on_fulfilled: Option<Handler>,
        on_rejected: Option<Handler>,
    ) -> Promise {
        let derived = Promise::new();
        let target = derived.clone();

        self.subscribe(
            event_loop,
            Box::new(move |el, settlement| {
                let next = match settlement {
                    Ok(value) => match on_fulfilled {
                        Some(handler) => handler(el, value),
                        None => Ok(Resolution::Value(value)),
                    },
                    Err(reason) => match on_rejected {
                        Some(handler) => handler(el, reason),
                        None => Err(reason),
                    },
                };
                match next {
                    Ok(resolution) => target.resolve(el, resolution),
                    Err(reason) => target.reject(el, reason),
                };
                Ok(())
            }),
        );

        derived
    }

    /// Attaches a fulfilment handler (`.then(f)`).
    ///
    /// The handler may return `Ok` with a value or with another promise; a
    /// returned promise is adopted by the derived promise.
    pub fn then<F, R>(&self, event_loop: &mut EventLoop, on_fulfilled: F) -> Promise
    where
        F: FnOnce(Value) -> Result<R, Value> + 'static,
        R: Into<Resolution>,
    {
        let handler: Handler = Box::new(move |_, value| -> HandlerResult {
            on_fulfilled(value).map(Into::into)
        });
        self.then_with(event_loop, Some(handler), None)
    }

    /// Like [`then`](Self::then), but the handler also gets the loop so it can
    /// start the next asynchronous step and return its promise.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_runtime::{EventLoop, Promise, PromiseState};
    /// use core_types::Value;
    ///
    /// let mut event_loop = EventLoop::new();
    /// let order = Promise::delayed(&mut event_loop, 500, Ok(Value::from("ORD-1"))).unwrap();
    /// let paid = order.and_then(&mut event_loop, |el, id| {
    ///     Promise::delayed(el, 300, Ok(Value::from(format!("{} paid", id))))
    ///         .map_err(|e| Value::from(e.to_string()))
    /// });
    ///
    /// let log = event_loop.run();
    /// assert_eq!(paid.state(), PromiseState::Fulfilled(Value::from("ORD-1 paid")));
    /// assert_eq!(log.finished_at.0, 800);
    /// ```
    pub fn and_then<F, R>(&self, event_loop: &mut EventLoop, on_fulfilled: F) -> Promise
    where
        F: FnOnce(&mut EventLoop, Value) -> Result<R, Value> + 'static,
        R: Into<Resolution>,
    {
        let handler: Handler = Box::new(move |el, value| -> HandlerResult {
            on_fulfilled(el, value).map(Into::into)
        });
        self.then_with(event_loop, Some(handler), None)
    }

    /// Attaches a rejection handler (`.catch(f)`).
    pub fn catch<F, R>(&self, event_loop: &mut EventLoop, on_rejected: F) -> Promise
    where
        F: FnOnce(Value) -> Result<R, Value> + 'static,
        R: Into<Resolution>,
    {
        let handler: Handler = Box::new(move |_, reason| -> HandlerResult {
            on_rejected(reason).map(Into::into)
        });
        self.then_with(event_loop, None, Some(handler))
    }

    /// Runs `callback` on either outcome and passes the settlement through
    /// (`.finally(f)`).
    pub fn finally<F>(&self, event_loop: &mut EventLoop, callback: F) -> Promise
    where
        F: FnOnce() + 'static,
    {
        let derived = Promise::new();
        let target = derived.clone();

        self.subscribe(
            event_loop,
            Box::new(move |el, settlement| {
                callback();
                target.settle(el, settlement);
                Ok(())
            }),
        );

        derived
    }
}

impl Default for Promise {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("state", &inner.state)
            .field("reactions", &inner.reactions.len())
            .field("handled", &inner.handled)
            .field("following", &inner.following)
            .finish()
    }
}
