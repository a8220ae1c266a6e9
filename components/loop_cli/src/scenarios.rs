//! Demo scenarios
//!
//! Each scenario is an entry script: it runs synchronously as phase 0,
//! queues work on the event loop, and logs to the scenario console so the
//! resulting order can be inspected.

use crate::console::Console;
use crate::error::{CliError, CliResult};
use async_runtime::{all, all_settled, any, race, Debouncer, EventLoop, Promise, Throttler};
use core_types::{TaskError, TaskResult, Value};
use std::rc::Rc;

/// A named demo script.
pub struct Scenario {
    /// Name used on the command line
    pub name: &'static str,
    /// One-line description
    pub summary: &'static str,
    /// Step limit applied when the configuration sets none
    pub default_step_limit: Option<u64>,
    /// The entry script
    pub script: fn(&mut EventLoop, &Console) -> TaskResult,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("default_step_limit", &self.default_step_limit)
            .finish_non_exhaustive()
    }
}

/// Every available scenario.
pub static SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "microtasks-first",
        summary: "script, then promise callbacks and queueMicrotask, then setTimeout(0)",
        default_step_limit: None,
        script: microtasks_first,
    },
    Scenario {
        name: "microtask-chain",
        summary: "a microtask queueing another microtask still beats a ready timer",
        default_step_limit: None,
        script: microtask_chain,
    },
    Scenario {
        name: "fifo",
        summary: "microtasks run in submission order",
        default_step_limit: None,
        script: fifo,
    },
    Scenario {
        name: "one-macrotask-per-pass",
        summary: "microtasks are drained between every two macrotasks",
        default_step_limit: None,
        script: one_macrotask_per_pass,
    },
    Scenario {
        name: "cancellation",
        summary: "clearTimeout before the timer fires",
        default_step_limit: None,
        script: cancellation,
    },
    Scenario {
        name: "failing-task",
        summary: "a throwing callback does not stop the loop",
        default_step_limit: None,
        script: failing_task,
    },
    Scenario {
        name: "timers",
        summary: "timers fire in deadline order as the clock fast-forwards",
        default_step_limit: None,
        script: timers,
    },
    Scenario {
        name: "starvation",
        summary: "a self-requeueing microtask starves a ready timer",
        default_step_limit: Some(50),
        script: starvation,
    },
    Scenario {
        name: "promise-all",
        summary: "Promise.all over three timers",
        default_step_limit: None,
        script: promise_all,
    },
    Scenario {
        name: "promise-all-settled",
        summary: "Promise.allSettled with one rejection",
        default_step_limit: None,
        script: promise_all_settled,
    },
    Scenario {
        name: "promise-race",
        summary: "Promise.race: the earliest timer wins",
        default_step_limit: None,
        script: promise_race,
    },
    Scenario {
        name: "promise-any",
        summary: "Promise.any where every input rejects",
        default_step_limit: None,
        script: promise_any,
    },
    Scenario {
        name: "promise-chain",
        summary: "each .then returns the next step's promise: order, payment, summary",
        default_step_limit: None,
        script: promise_chain,
    },
    Scenario {
        name: "debounce",
        summary: "a search box debounced by 300 ticks",
        default_step_limit: None,
        script: debounce,
    },
    Scenario {
        name: "throttle",
        summary: "a scroll handler throttled to once per 300 ticks",
        default_step_limit: None,
        script: throttle,
    },
];

/// Looks up a scenario by name.
///
/// # Errors
/// Returns `CliError::UnknownScenario` when no scenario has that name.
pub fn find_scenario(name: &str) -> CliResult<&'static Scenario> {
    SCENARIOS
        .iter()
        .find(|scenario| scenario.name == name)
        .ok_or_else(|| CliError::UnknownScenario(name.to_string()))
}

fn say(console: &Console, text: &'static str) -> impl FnOnce(&mut EventLoop) -> TaskResult {
    let console = console.clone();
    move |_| {
        console.log(text);
        Ok(())
    }
}

/// `promise.then(console.log).catch(console.log)`
fn print_settlement(event_loop: &mut EventLoop, promise: &Promise, console: &Console) {
    let on_value = console.clone();
    let on_error = console.clone();
    promise
        .then(event_loop, move |res| {
            on_value.log(res.to_string());
            Ok(Value::Undefined)
        })
        .catch(event_loop, move |err| {
            on_error.log(err.to_string());
            Ok(Value::Undefined)
        });
}

fn delayed(
    event_loop: &mut EventLoop,
    delay: i64,
    settlement: Result<&str, &str>,
) -> Result<Promise, TaskError> {
    let settlement = settlement.map(Value::from).map_err(Value::from);
    Ok(Promise::delayed(event_loop, delay, settlement)?)
}

fn microtasks_first(el: &mut EventLoop, console: &Console) -> TaskResult {
    console.log("script start");

    el.submit_macrotask(0, say(console, "setTimeout callback"))?;
    el.submit_microtask(say(console, "queueMicrotask callback"));

    let c = console.clone();
    Promise::resolved(Value::Undefined).then(el, move |v| {
        c.log("promise then");
        Ok(v)
    });

    console.log("script end");
    Ok(())
}

fn microtask_chain(el: &mut EventLoop, console: &Console) -> TaskResult {
    el.submit_macrotask(0, say(console, "M"))?;

    let c = console.clone();
    el.submit_microtask(move |el| {
        c.log("A");
        el.submit_microtask(say(&c, "B"));
        Ok(())
    });
    Ok(())
}

fn fifo(el: &mut EventLoop, console: &Console) -> TaskResult {
    el.submit_microtask(say(console, "A"));
    el.submit_microtask(say(console, "B"));
    Ok(())
}

fn one_macrotask_per_pass(el: &mut EventLoop, console: &Console) -> TaskResult {
    let c = console.clone();
    el.submit_macrotask(0, move |el| {
        c.log("M1");
        el.submit_microtask(say(&c, "microtask queued by M1"));
        Ok(())
    })?;
    el.submit_macrotask(0, say(console, "M2"))?;
    el.submit_microtask(say(console, "A"));
    Ok(())
}

fn cancellation(el: &mut EventLoop, console: &Console) -> TaskResult {
    let doomed = el.submit_macrotask(100, say(console, "this timer never fires"))?;
    el.submit_macrotask(200, say(console, "kept timer fired"))?;

    let cancelled = el.cancel(doomed);
    console.log(format!("clearTimeout({}) -> {}", doomed, cancelled));
    Ok(())
}

fn failing_task(el: &mut EventLoop, console: &Console) -> TaskResult {
    el.submit_macrotask(0, |_| Err(TaskError::thrown("M1 failed")))?;
    el.submit_macrotask(0, say(console, "ok"))?;
    Ok(())
}

fn timers(el: &mut EventLoop, console: &Console) -> TaskResult {
    for delay in [300, 100, 200, 0] {
        let c = console.clone();
        el.submit_macrotask(delay, move |el| {
            c.log(format!("{}ms timer fired at {}", delay, el.now()));
            Ok(())
        })?;
    }
    console.log("timers registered");
    Ok(())
}

fn starvation(el: &mut EventLoop, console: &Console) -> TaskResult {
    fn spin(el: &mut EventLoop, console: Console, round: u64) -> TaskResult {
        if round % 10 == 0 {
            console.log(format!("microtask round {}", round));
        }
        el.submit_microtask(move |el| spin(el, console, round + 1));
        Ok(())
    }

    el.submit_macrotask(0, say(console, "setTimeout callback finally ran"))?;
    let c = console.clone();
    el.submit_microtask(move |el| spin(el, c, 0));
    Ok(())
}

fn promise_all(el: &mut EventLoop, console: &Console) -> TaskResult {
    let p1 = delayed(el, 3000, Ok("allP1 success."))?;
    let p2 = delayed(el, 2000, Ok("allP2 success."))?;
    let p3 = delayed(el, 5000, Ok("allP3 success."))?;

    let result = all(el, &[p1, p2, p3]);
    print_settlement(el, &result, console);
    Ok(())
}

fn promise_all_settled(el: &mut EventLoop, console: &Console) -> TaskResult {
    let p1 = delayed(el, 3000, Err("allSettledP1 failure."))?;
    let p2 = delayed(el, 2000, Ok("allSettledP2 success."))?;
    let p3 = delayed(el, 5000, Ok("allSettledP3 success."))?;

    let result = all_settled(el, &[p1, p2, p3]);
    print_settlement(el, &result, console);
    Ok(())
}

fn promise_race(el: &mut EventLoop, console: &Console) -> TaskResult {
    let p1 = delayed(el, 3000, Ok("raceP1 success."))?;
    let p2 = delayed(el, 2000, Ok("raceP2 success."))?;
    let p3 = delayed(el, 5000, Ok("raceP3 success."))?;

    let result = race(el, &[p1, p2, p3]);
    print_settlement(el, &result, console);
    Ok(())
}

fn promise_any(el: &mut EventLoop, console: &Console) -> TaskResult {
    let p1 = delayed(el, 2000, Err("anyP1 failure."))?;
    let p2 = delayed(el, 2000, Err("anyP2 failure."))?;
    let p3 = delayed(el, 5000, Err("anyP3 failure."))?;

    let result = any(el, &[p1, p2, p3]);
    let on_value = console.clone();
    let on_error = console.clone();
    result
        .then(el, move |res| {
            on_value.log(res.to_string());
            Ok(Value::Undefined)
        })
        .catch(el, move |err| {
            let name = err.get("name").cloned().unwrap_or(Value::Undefined);
            let message = err.get("message").cloned().unwrap_or(Value::Undefined);
            on_error.log(format!("{}: {}", name, message));
            if let Some(errors) = err.get("errors") {
                on_error.log(errors.to_string());
            }
            Ok(Value::Undefined)
        });
    Ok(())
}

/// A step that finishes `delay` ticks after it starts.
fn step(el: &mut EventLoop, delay: i64, result: String) -> Result<Promise, Value> {
    Promise::delayed(el, delay, Ok(Value::from(result))).map_err(|e| Value::from(e.to_string()))
}

fn promise_chain(el: &mut EventLoop, console: &Console) -> TaskResult {
    let cart = Value::List(vec![Value::from("shoes"), Value::from("shirts")]);
    console.log(format!("cart: {}", cart));

    let (c1, c2, c3, c4) = (console.clone(), console.clone(), console.clone(), console.clone());
    delayed(el, 500, Ok("ORD-1001"))?
        .and_then(el, move |el, order_id| {
            c1.log(format!("order {} created at {}", order_id, el.now()));
            step(el, 300, format!("payment for {} completed", order_id))
        })
        .and_then(el, move |el, payment| {
            c2.log(format!("{} at {}", payment, el.now()));
            step(el, 200, format!("summary of {}", payment))
        })
        .and_then(el, move |el, summary| {
            c3.log(format!("{} shown at {}", summary, el.now()));
            Ok(Value::Undefined)
        })
        .finally(el, move || c4.log("Promise settled"));
    Ok(())
}

fn debounce(el: &mut EventLoop, console: &Console) -> TaskResult {
    let c = console.clone();
    let search = Rc::new(Debouncer::new(300, move |el| {
        c.log(format!("search request sent at {}", el.now()));
        Ok(())
    })?);

    for (at, key) in [(0, "r"), (80, "u"), (150, "s"), (220, "t"), (900, "!")] {
        let c = console.clone();
        let search = search.clone();
        el.submit_macrotask(at, move |el| {
            c.log(format!("keypress '{}' at {}", key, el.now()));
            search.trigger(el)?;
            Ok(())
        })?;
    }
    Ok(())
}

fn throttle(el: &mut EventLoop, console: &Console) -> TaskResult {
    let c = console.clone();
    let on_scroll = Rc::new(Throttler::new(300, move |el| {
        c.log(format!("scroll handler ran at {}", el.now()));
        Ok(())
    }));

    for at in (0..=1000).step_by(100) {
        let on_scroll = on_scroll.clone();
        el.submit_macrotask(at, move |el| {
            on_scroll.trigger(el)?;
            Ok(())
        })?;
    }
    Ok(())
}
