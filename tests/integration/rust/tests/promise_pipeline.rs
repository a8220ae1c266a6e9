//! Promise Pipeline Integration Tests
//!
//! Exercises promises, combinators and timers together on one loop.

use async_runtime::{all, any, race, Debouncer, EventLoop, Promise, PromiseState, Throttler};
use core_types::{TaskErrorKind, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Test: A chain of then/catch/finally across timer-settled promises
#[test]
fn test_chain_through_timers() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut el = EventLoop::new();

    let source = Promise::delayed(&mut el, 100, Ok(Value::Smi(20))).unwrap();
    let s = seen.clone();
    let done = source
        .then(&mut el, |v| match v {
            Value::Smi(n) => Ok(Value::Smi(n * 2)),
            other => Err(other),
        })
        .then(&mut el, |v| Err::<Value, _>(Value::from(format!("too big: {}", v))))
        .catch(&mut el, move |reason| {
            s.borrow_mut().push(reason.to_string());
            Ok(Value::from("recovered"))
        });
    let s = seen.clone();
    done.finally(&mut el, move || s.borrow_mut().push("finally".to_string()));

    let log = el.run();
    assert_eq!(*seen.borrow(), vec!["too big: 40", "finally"]);
    assert_eq!(done.state(), PromiseState::Fulfilled(Value::from("recovered")));
    assert!(log.failures().is_empty());
}

/// Test: all rejects with the first rejection, race picks the earliest
#[test]
fn test_all_and_race_share_inputs() {
    let mut el = EventLoop::new();
    let ok = Promise::delayed(&mut el, 30, Ok(Value::from("ok"))).unwrap();
    let bad = Promise::delayed(&mut el, 20, Err(Value::from("bad"))).unwrap();
    let fast = Promise::delayed(&mut el, 10, Ok(Value::from("fast"))).unwrap();

    let every = all(&mut el, &[ok.clone(), bad.clone()]);
    let first = race(&mut el, &[ok, bad, fast]);
    let log = el.run();

    assert_eq!(every.state(), PromiseState::Rejected(Value::from("bad")));
    assert_eq!(first.state(), PromiseState::Fulfilled(Value::from("fast")));
    // `every` is rejected with nobody listening.
    assert_eq!(log.failures().len(), 1);
    assert!(matches!(
        &log.failures()[0].outcome,
        async_runtime::Outcome::Failed(e) if e.kind == TaskErrorKind::Rejected
    ));
}

/// Test: any fulfils with the first fulfilment even after rejections
#[test]
fn test_any_skips_rejections() {
    let mut el = EventLoop::new();
    let a = Promise::delayed(&mut el, 10, Err(Value::from("a"))).unwrap();
    let b = Promise::delayed(&mut el, 20, Ok(Value::from("b"))).unwrap();
    let c = Promise::delayed(&mut el, 30, Ok(Value::from("c"))).unwrap();

    let winner = any(&mut el, &[a, b, c]);
    el.run();
    assert_eq!(winner.state(), PromiseState::Fulfilled(Value::from("b")));
}

/// Test: Debounced callback resolves a promise once typing stops
#[test]
fn test_debounce_settles_promise() {
    let mut el = EventLoop::new();
    let result = Promise::new();

    let r = result.clone();
    let debounced = Rc::new(
        Debouncer::new(100, move |el| {
            let at = Value::Smi(el.now().0 as i32);
            r.resolve(el, at);
            Ok(())
        })
        .unwrap(),
    );

    for at in [0, 50, 120] {
        let d = debounced.clone();
        el.submit_macrotask(at, move |el| {
            d.trigger(el)?;
            Ok(())
        })
        .unwrap();
    }
    el.run();

    assert_eq!(result.state(), PromiseState::Fulfilled(Value::Smi(220)));
    assert!(!debounced.is_pending());
}

/// Test: Throttled handler queues microtasks that run before the next trigger
#[test]
fn test_throttle_with_microtasks() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut el = EventLoop::new();

    let s = seen.clone();
    let throttled = Rc::new(Throttler::new(50, move |el| {
        let at = el.now().0;
        let inner = s.clone();
        el.submit_microtask(move |_| {
            inner.borrow_mut().push(at);
            Ok(())
        });
        Ok(())
    }));

    for at in [0, 20, 40, 60, 80, 100] {
        let t = throttled.clone();
        el.submit_macrotask(at, move |el| {
            t.trigger(el)?;
            Ok(())
        })
        .unwrap();
    }
    el.run();

    assert_eq!(*seen.borrow(), vec![0, 60]);
}
