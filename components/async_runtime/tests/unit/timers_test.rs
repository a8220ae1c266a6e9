//! Unit tests for Debouncer and Throttler

use async_runtime::{Debouncer, EventLoop, Throttler};
use core_types::{TaskError, Ticks};
use std::cell::RefCell;
use std::rc::Rc;

fn schedule_triggers(event_loop: &mut EventLoop, debouncer: &Rc<Debouncer>, at: &[i64]) {
    for &delay in at {
        let d = debouncer.clone();
        event_loop
            .submit_macrotask(delay, move |el| {
                d.trigger(el)?;
                Ok(())
            })
            .unwrap();
    }
}

#[test]
fn debounce_collapses_a_burst() {
    let mut event_loop = EventLoop::new();
    let fired = Rc::new(RefCell::new(Vec::new()));

    let f = fired.clone();
    let debouncer = Rc::new(
        Debouncer::new(300, move |el| {
            f.borrow_mut().push(el.now());
            Ok(())
        })
        .unwrap(),
    );

    schedule_triggers(&mut event_loop, &debouncer, &[0, 100, 200]);
    event_loop.run();

    assert_eq!(*fired.borrow(), vec![Ticks(500)]);
    assert!(!debouncer.is_pending());
}

#[test]
fn debounce_fires_again_after_quiet_period() {
    let mut event_loop = EventLoop::new();
    let fired = Rc::new(RefCell::new(Vec::new()));

    let f = fired.clone();
    let debouncer = Rc::new(
        Debouncer::new(300, move |el| {
            f.borrow_mut().push(el.now());
            Ok(())
        })
        .unwrap(),
    );

    schedule_triggers(&mut event_loop, &debouncer, &[0, 1000]);
    event_loop.run();

    assert_eq!(*fired.borrow(), vec![Ticks(300), Ticks(1300)]);
}

#[test]
fn debounce_callback_error_is_a_failed_task() {
    let mut event_loop = EventLoop::new();
    let debouncer = Debouncer::new(10, |_| Err(TaskError::thrown("search failed"))).unwrap();
    let id = debouncer.trigger(&mut event_loop).unwrap();

    let log = event_loop.run();
    assert_eq!(log.failures().len(), 1);
    assert_eq!(log.failures()[0].id, id);
}

#[test]
fn throttle_drops_triggers_inside_window() {
    let mut event_loop = EventLoop::new();
    let fired = Rc::new(RefCell::new(Vec::new()));

    let f = fired.clone();
    let throttler = Rc::new(Throttler::new(300, move |el| {
        f.borrow_mut().push(el.now());
        Ok(())
    }));

    for i in 0..10 {
        let t = throttler.clone();
        event_loop
            .submit_macrotask(i * 100, move |el| {
                t.trigger(el)?;
                Ok(())
            })
            .unwrap();
    }
    event_loop.run();

    assert_eq!(
        *fired.borrow(),
        vec![Ticks(0), Ticks(300), Ticks(600), Ticks(900)]
    );
}

#[test]
fn throttle_propagates_callback_error() {
    let mut event_loop = EventLoop::new();
    let throttler = Throttler::new(100, |_| Err(TaskError::thrown("nope")));
    assert!(throttler.trigger(&mut event_loop).is_err());
    assert_eq!(throttler.last_run(), Some(Ticks::ZERO));
}
