//! Unit tests for Promise and the combinators

use async_runtime::{aggregate_error, all, all_settled, any, race, EventLoop, Promise, PromiseState};
use core_types::{TaskKind, Ticks, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn fulfilled(text: &str) -> PromiseState {
    PromiseState::Fulfilled(Value::from(text))
}

#[test]
fn then_callbacks_run_before_timers() {
    let mut event_loop = EventLoop::new();
    let out = Rc::new(RefCell::new(Vec::new()));

    let o = out.clone();
    event_loop
        .submit_macrotask(0, move |_| {
            o.borrow_mut().push("timeout");
            Ok(())
        })
        .unwrap();

    let o = out.clone();
    Promise::resolved(Value::Undefined).then(&mut event_loop, move |v| {
        o.borrow_mut().push("then");
        Ok(v)
    });

    event_loop.run();
    assert_eq!(*out.borrow(), vec!["then", "timeout"]);
}

#[test]
fn chained_thens_each_take_a_microtask() {
    let mut event_loop = EventLoop::new();
    let source = Promise::resolved(Value::Smi(1));
    let step = source.then(&mut event_loop, |v| match v {
        Value::Smi(n) => Ok(Value::Smi(n + 1)),
        other => Ok(other),
    });
    let last = step.then(&mut event_loop, |v| match v {
        Value::Smi(n) => Ok(Value::Smi(n * 10)),
        other => Ok(other),
    });

    let log = event_loop.run();
    assert_eq!(last.state(), PromiseState::Fulfilled(Value::Smi(20)));
    assert_eq!(log.len(), 2);
    assert!(log.entries.iter().all(|e| e.kind == TaskKind::Microtask));
}

#[test]
fn rejection_skips_then_and_reaches_catch() {
    let mut event_loop = EventLoop::new();
    let source = Promise::new();
    let skipped = Rc::new(RefCell::new(true));

    let s = skipped.clone();
    let caught = source
        .then(&mut event_loop, move |v| {
            *s.borrow_mut() = false;
            Ok(v)
        })
        .catch(&mut event_loop, |reason| Ok(Value::from(format!("handled {}", reason))));

    source.reject(&mut event_loop, Value::from("err"));
    let log = event_loop.run();

    assert!(*skipped.borrow());
    assert_eq!(caught.state(), fulfilled("handled err"));
    assert!(log.failures().is_empty());
}

#[test]
fn finally_passes_settlement_through() {
    let mut event_loop = EventLoop::new();
    let ran = Rc::new(RefCell::new(false));

    let r = ran.clone();
    let source = Promise::resolved(Value::from("v"));
    let after = source.finally(&mut event_loop, move || *r.borrow_mut() = true);

    event_loop.run();
    assert!(*ran.borrow());
    assert_eq!(after.state(), fulfilled("v"));
}

#[test]
fn late_handler_marks_rejection_handled() {
    let mut event_loop = EventLoop::new();
    let source = Promise::new();
    source.reject(&mut event_loop, Value::from("late"));
    source.catch(&mut event_loop, Ok);

    let log = event_loop.run();
    assert!(source.is_handled());
    assert!(log.failures().is_empty());
}

#[test]
fn delayed_promise_settles_at_its_deadline() {
    let mut event_loop = EventLoop::new();
    let settled_at = Rc::new(RefCell::new(None));

    let p = Promise::delayed(&mut event_loop, 2000, Err(Value::from("nope"))).unwrap();
    let s = settled_at.clone();
    p.catch(&mut event_loop, move |reason| {
        *s.borrow_mut() = Some(reason.clone());
        Ok(reason)
    });

    let log = event_loop.run();
    assert_eq!(*settled_at.borrow(), Some(Value::from("nope")));
    assert_eq!(log.finished_at, Ticks(2000));
}

#[test]
fn delayed_rejects_negative_delay() {
    let mut event_loop = EventLoop::new();
    assert!(Promise::delayed(&mut event_loop, -1, Ok(Value::Undefined)).is_err());
}

#[test]
fn all_fulfils_in_input_order() {
    let mut event_loop = EventLoop::new();
    let p1 = Promise::delayed(&mut event_loop, 3000, Ok(Value::from("allP1 success."))).unwrap();
    let p2 = Promise::delayed(&mut event_loop, 2000, Ok(Value::from("allP2 success."))).unwrap();
    let p3 = Promise::delayed(&mut event_loop, 5000, Ok(Value::from("allP3 success."))).unwrap();

    let result = all(&mut event_loop, &[p1, p2, p3]);
    event_loop.run();

    match result.state() {
        PromiseState::Fulfilled(value) => assert_eq!(
            value.to_string(),
            "[ 'allP1 success.', 'allP2 success.', 'allP3 success.' ]"
        ),
        other => panic!("expected fulfilment, got {:?}", other),
    }
}

#[test]
fn all_rejects_on_first_rejection_without_waiting() {
    let mut event_loop = EventLoop::new();
    let p1 = Promise::delayed(&mut event_loop, 3000, Err(Value::from("allP1 failure."))).unwrap();
    let p2 = Promise::delayed(&mut event_loop, 2000, Ok(Value::from("allP2 success."))).unwrap();
    let p3 = Promise::delayed(&mut event_loop, 5000, Ok(Value::from("allP3 success."))).unwrap();

    let result = all(&mut event_loop, &[p1, p2, p3]);
    result.catch(&mut event_loop, Ok);

    // p3 is still pending at t=3001, yet the combined promise has settled.
    let seen = Rc::new(RefCell::new(None));
    let (probe, s) = (result.clone(), seen.clone());
    event_loop
        .submit_macrotask(3001, move |_| {
            *s.borrow_mut() = Some(probe.state());
            Ok(())
        })
        .unwrap();
    event_loop.run();

    assert_eq!(
        *seen.borrow(),
        Some(PromiseState::Rejected(Value::from("allP1 failure.")))
    );
}

#[test]
fn then_with_no_handlers_passes_through() {
    let mut event_loop = EventLoop::new();
    let source = Promise::resolved(Value::Smi(7));
    let derived = source.then_with(&mut event_loop, None, None);
    event_loop.run();
    assert_eq!(derived.state(), PromiseState::Fulfilled(Value::Smi(7)));
}

#[test]
fn all_settled_reports_every_outcome() {
    let mut event_loop = EventLoop::new();
    let p1 = Promise::delayed(&mut event_loop, 3000, Err(Value::from("allSettledP1 failure."))).unwrap();
    let p2 = Promise::delayed(&mut event_loop, 2000, Ok(Value::from("allSettledP2 success."))).unwrap();

    let result = all_settled(&mut event_loop, &[p1, p2]);
    let log = event_loop.run();

    match result.state() {
        PromiseState::Fulfilled(Value::List(records)) => {
            assert_eq!(records.len(), 2);
            assert_eq!(records[0].get("status"), Some(&Value::from("rejected")));
            assert_eq!(records[0].get("reason"), Some(&Value::from("allSettledP1 failure.")));
            assert_eq!(records[1].get("status"), Some(&Value::from("fulfilled")));
            assert_eq!(records[1].get("value"), Some(&Value::from("allSettledP2 success.")));
        }
        other => panic!("expected list, got {:?}", other),
    }
    assert!(log.failures().is_empty());
}

#[test]
fn race_takes_first_settlement() {
    let mut event_loop = EventLoop::new();
    let p1 = Promise::delayed(&mut event_loop, 2000, Err(Value::from("raceP1 failure."))).unwrap();
    let p2 = Promise::delayed(&mut event_loop, 3000, Ok(Value::from("raceP2 success."))).unwrap();

    let result = race(&mut event_loop, &[p1, p2]);
    result.catch(&mut event_loop, Ok);
    event_loop.run();

    assert_eq!(result.state(), PromiseState::Rejected(Value::from("raceP1 failure.")));
}

#[test]
fn any_takes_first_fulfilment() {
    let mut event_loop = EventLoop::new();
    let p1 = Promise::delayed(&mut event_loop, 1000, Err(Value::from("anyP1 failure."))).unwrap();
    let p2 = Promise::delayed(&mut event_loop, 2000, Ok(Value::from("anyP2 success."))).unwrap();
    let p3 = Promise::delayed(&mut event_loop, 5000, Ok(Value::from("anyP3 success."))).unwrap();

    let result = any(&mut event_loop, &[p1, p2, p3]);
    event_loop.run();
    assert_eq!(result.state(), fulfilled("anyP2 success."));
}

#[test]
fn any_all_rejected_gives_aggregate_error() {
    let mut event_loop = EventLoop::new();
    let p1 = Promise::delayed(&mut event_loop, 2000, Err(Value::from("anyP1 failure."))).unwrap();
    let p2 = Promise::delayed(&mut event_loop, 2000, Err(Value::from("anyP2 failure."))).unwrap();
    let p3 = Promise::delayed(&mut event_loop, 5000, Err(Value::from("anyP3 failure."))).unwrap();

    let result = any(&mut event_loop, &[p1, p2, p3]);
    let log = event_loop.run();

    let expected = aggregate_error(vec![
        Value::from("anyP1 failure."),
        Value::from("anyP2 failure."),
        Value::from("anyP3 failure."),
    ]);
    assert_eq!(result.state(), PromiseState::Rejected(expected));
    // Nobody handled the aggregate rejection.
    assert_eq!(log.failures().len(), 1);
}

#[test]
fn then_returning_a_promise_is_adopted() {
    let mut event_loop = EventLoop::new();
    let inner = Promise::delayed(&mut event_loop, 100, Ok(Value::from("from timer"))).unwrap();
    let seen = Rc::new(RefCell::new(None));

    let s = seen.clone();
    Promise::resolved(Value::Undefined)
        .then(&mut event_loop, move |_| Ok(inner))
        .and_then(&mut event_loop, move |el, v| {
            *s.borrow_mut() = Some((v, el.now()));
            Ok(Value::Undefined)
        });

    let log = event_loop.run();
    assert_eq!(*seen.borrow(), Some((Value::from("from timer"), Ticks(100))));
    assert!(log.failures().is_empty());
}

#[test]
fn and_then_sequences_async_steps() {
    let mut event_loop = EventLoop::new();
    let steps = Rc::new(RefCell::new(Vec::new()));

    let s1 = steps.clone();
    let s2 = steps.clone();
    let done = Promise::delayed(&mut event_loop, 500, Ok(Value::from("ORD-7")))
        .unwrap()
        .and_then(&mut event_loop, move |el, id| {
            s1.borrow_mut().push(el.now());
            Promise::delayed(el, 300, Ok(Value::from(format!("{} paid", id))))
                .map_err(|e| Value::from(e.to_string()))
        })
        .and_then(&mut event_loop, move |el, info| {
            s2.borrow_mut().push(el.now());
            Ok(info)
        });

    event_loop.run();
    assert_eq!(*steps.borrow(), vec![Ticks(500), Ticks(800)]);
    assert_eq!(done.state(), fulfilled("ORD-7 paid"));
}

#[test]
fn adopted_rejection_reaches_catch() {
    let mut event_loop = EventLoop::new();
    let failing = Promise::delayed(&mut event_loop, 50, Err(Value::from("card declined"))).unwrap();

    let caught = Promise::resolved(Value::Undefined)
        .then(&mut event_loop, move |_| Ok(failing))
        .then(&mut event_loop, |_| Ok(Value::from("skipped")))
        .catch(&mut event_loop, |reason| Ok(Value::from(format!("caught {}", reason))));

    let log = event_loop.run();
    assert_eq!(caught.state(), fulfilled("caught card declined"));
    assert!(log.failures().is_empty());
}

#[test]
fn resolve_with_promise_locks_in() {
    let mut event_loop = EventLoop::new();
    let outer = Promise::new();
    let inner = Promise::new();

    assert!(outer.resolve(&mut event_loop, inner.clone()));
    assert!(!outer.resolve(&mut event_loop, Value::Smi(1)));
    assert!(!outer.reject(&mut event_loop, Value::from("late")));
    assert!(outer.is_pending());
    assert!(inner.is_handled());

    inner.resolve(&mut event_loop, Value::Smi(2));
    event_loop.run();
    assert_eq!(outer.state(), PromiseState::Fulfilled(Value::Smi(2)));
}

#[test]
fn resolve_with_itself_rejects_with_type_error() {
    let mut event_loop = EventLoop::new();
    let promise = Promise::new();
    promise.catch(&mut event_loop, Ok);

    assert!(promise.resolve(&mut event_loop, promise.clone()));
    match promise.state() {
        PromiseState::Rejected(reason) => {
            assert_eq!(reason.get("name"), Some(&Value::from("TypeError")));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}
