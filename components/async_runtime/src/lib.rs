//! Deterministic event loop simulator.
//!
//! This crate provides the scheduling model of a single-threaded, event-driven
//! scripting runtime:
//! - Event loop with a macrotask queue and a microtask queue
//! - Logical clock that fast-forwards across idle gaps
//! - Promises whose reactions run as microtasks, with the usual combinators
//! - Debounce and throttle helpers on logical time
//!
//! # Overview
//!
//! - [`EventLoop`] - Loop driver: drain microtasks, run one macrotask, repeat
//! - [`RunLog`] - Ordered record of what a run executed
//! - [`Promise`] - Promise settled through the microtask queue
//! - [`all`], [`all_settled`], [`race`], [`any`] - Promise combinators
//! - [`Debouncer`], [`Throttler`] - Rate limiting on logical time
//!
//! # Examples
//!
//! ## Event Loop Usage
//!
//! ```
//! use async_runtime::EventLoop;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut event_loop = EventLoop::new();
//! let out = Rc::new(RefCell::new(Vec::new()));
//!
//! let log = event_loop.run_script(|el| {
//!     let o = out.clone();
//!     el.submit_macrotask(0, move |_| {
//!         o.borrow_mut().push("timeout");
//!         Ok(())
//!     })
//!     .unwrap();
//!
//!     let o = out.clone();
//!     el.submit_microtask(move |_| {
//!         o.borrow_mut().push("microtask");
//!         Ok(())
//!     });
//!
//!     out.borrow_mut().push("script");
//!     Ok(())
//! });
//!
//! assert_eq!(*out.borrow(), vec!["script", "microtask", "timeout"]);
//! assert_eq!(log.len(), 2);
//! ```
//!
//! ## Promise Usage
//!
//! ```
//! use async_runtime::{race, EventLoop, Promise, PromiseState};
//! use core_types::Value;
//!
//! let mut event_loop = EventLoop::new();
//! let p1 = Promise::delayed(&mut event_loop, 3000, Ok(Value::from("raceP1 success."))).unwrap();
//! let p2 = Promise::delayed(&mut event_loop, 2000, Ok(Value::from("raceP2 success."))).unwrap();
//!
//! let winner = race(&mut event_loop, &[p1, p2]);
//! event_loop.run();
//! assert_eq!(winner.state(), PromiseState::Fulfilled(Value::from("raceP2 success.")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod combinators;
pub mod config;
pub mod event_loop;
pub mod promise;
pub mod run_log;
pub mod task_queue;
pub mod timers;

// Re-export main types at crate root
pub use clock::VirtualClock;
pub use combinators::{aggregate_error, all, all_settled, any, race};
pub use config::LoopConfig;
pub use event_loop::EventLoop;
pub use promise::{Handler, HandlerResult, Promise, PromiseState, Resolution, Settlement};
pub use run_log::{HaltReason, Outcome, RunEntry, RunLog};
pub use task_queue::{Action, QueuePair, Task, TaskQueue};
pub use timers::{Debouncer, Throttler};
