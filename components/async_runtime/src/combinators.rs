//! Promise combinators: `all`, `all_settled`, `race` and `any`.
//!
//! Each combinator subscribes to every input promise and settles a fresh
//! result promise from those reactions, so all of their work happens in
//! microtasks.

use crate::promise::{Promise, Settlement};
use crate::EventLoop;
use core_types::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Collects one slot per input, in input order.
struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> Gather<T> {
    fn new(len: usize) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            slots: (0..len).map(|_| None).collect(),
            remaining: len,
        }))
    }

    /// Fills a slot; returns every slot once the last one arrives.
    fn fill(&mut self, index: usize, item: T) -> Option<Vec<T>> {
        if self.slots[index].is_none() {
            self.slots[index] = Some(item);
            self.remaining -= 1;
        }
        if self.remaining == 0 {
            Some(self.slots.iter_mut().filter_map(Option::take).collect())
        } else {
            None
        }
    }
}

/// `Promise.all`: fulfils with every value in input order, or rejects with
/// the first rejection reason.
///
/// # Examples
///
/// ```
/// use async_runtime::{all, EventLoop, Promise, PromiseState};
/// use core_types::Value;
///
/// let mut event_loop = EventLoop::new();
/// let slow = Promise::delayed(&mut event_loop, 300, Ok(Value::from("slow"))).unwrap();
/// let fast = Promise::delayed(&mut event_loop, 100, Ok(Value::from("fast"))).unwrap();
///
/// let both = all(&mut event_loop, &[slow, fast]);
/// event_loop.run();
/// assert_eq!(
///     both.state(),
///     PromiseState::Fulfilled(Value::List(vec![Value::from("slow"), Value::from("fast")]))
/// );
/// ```
pub fn all(event_loop: &mut EventLoop, promises: &[Promise]) -> Promise {
    let result = Promise::new();
    if promises.is_empty() {
        result.resolve(event_loop, Value::List(Vec::new()));
        return result;
    }

    let gather = Gather::new(promises.len());
    for (index, promise) in promises.iter().enumerate() {
        let result = result.clone();
        let gather = gather.clone();
        promise.subscribe(
            event_loop,
            Box::new(move |el, settlement| {
                match settlement {
                    Ok(value) => {
                        let done = gather.borrow_mut().fill(index, value);
                        if let Some(values) = done {
                            result.resolve(el, Value::List(values));
                        }
                    }
                    Err(reason) => {
                        result.reject(el, reason);
                    }
                }
                Ok(())
            }),
        );
    }
    result
}

/// `Promise.allSettled`: fulfils once every input settles, with one
/// `{ status, value }` or `{ status, reason }` object per input.
pub fn all_settled(event_loop: &mut EventLoop, promises: &[Promise]) -> Promise {
    let result = Promise::new();
    if promises.is_empty() {
        result.resolve(event_loop, Value::List(Vec::new()));
        return result;
    }

    let gather = Gather::new(promises.len());
    for (index, promise) in promises.iter().enumerate() {
        let result = result.clone();
        let gather = gather.clone();
        promise.subscribe(
            event_loop,
            Box::new(move |el, settlement| {
                let done = gather.borrow_mut().fill(index, settled_record(settlement));
                if let Some(records) = done {
                    result.resolve(el, Value::List(records));
                }
                Ok(())
            }),
        );
    }
    result
}

/// `Promise.race`: settles like the first input to settle.
///
/// With no inputs the result stays pending forever.
pub fn race(event_loop: &mut EventLoop, promises: &[Promise]) -> Promise {
    let result = Promise::new();
    for promise in promises {
        let result = result.clone();
        promise.subscribe(
            event_loop,
            Box::new(move |el, settlement| {
                result.settle(el, settlement);
                Ok(())
            }),
        );
    }
    result
}

/// `Promise.any`: fulfils with the first fulfilment; rejects with an
/// `AggregateError` object listing every reason in input order when all
/// inputs reject.
pub fn any(event_loop: &mut EventLoop, promises: &[Promise]) -> Promise {
    let result = Promise::new();
    if promises.is_empty() {
        result.reject(event_loop, aggregate_error(Vec::new()));
        return result;
    }

    let gather = Gather::new(promises.len());
    for (index, promise) in promises.iter().enumerate() {
        let result = result.clone();
        let gather = gather.clone();
        promise.subscribe(
            event_loop,
            Box::new(move |el, settlement| {
                match settlement {
                    Ok(value) => {
                        result.resolve(el, value);
                    }
                    Err(reason) => {
                        let done = gather.borrow_mut().fill(index, reason);
                        if let Some(errors) = done {
                            result.reject(el, aggregate_error(errors));
                        }
                    }
                }
                Ok(())
            }),
        );
    }
    result
}

fn settled_record(settlement: Settlement) -> Value {
    match settlement {
        Ok(value) => Value::object([
            ("status", Value::from("fulfilled")),
            ("value", value),
        ]),
        Err(reason) => Value::object([
            ("status", Value::from("rejected")),
            ("reason", reason),
        ]),
    }
}

/// The rejection reason of [`any`] when every input rejected.
pub fn aggregate_error(errors: Vec<Value>) -> Value {
    Value::object([
        ("name", Value::from("AggregateError")),
        ("message", Value::from("All promises were rejected")),
        ("errors", Value::List(errors)),
    ])
}
