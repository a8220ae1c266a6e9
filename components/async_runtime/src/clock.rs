//! Logical clock driving delay-based ordering.

use core_types::Ticks;

/// A monotonic, event-driven clock.
///
/// The clock starts at zero and only moves when the event loop fast-forwards
/// across an idle gap, which makes every run deterministic and independent of
/// wall time.
///
/// # Examples
///
/// ```
/// use async_runtime::VirtualClock;
/// use core_types::Ticks;
///
/// let mut clock = VirtualClock::new();
/// assert!(clock.advance_to(Ticks(100)));
/// assert!(!clock.advance_to(Ticks(50)));
/// assert_eq!(clock.now(), Ticks(100));
/// ```
#[derive(Debug, Default, Clone)]
pub struct VirtualClock {
    now: Ticks,
}

impl VirtualClock {
    /// Creates a clock at tick zero.
    pub fn new() -> Self {
        Self { now: Ticks::ZERO }
    }

    /// Returns the current logical time.
    pub fn now(&self) -> Ticks {
        self.now
    }

    /// Moves the clock forward to `target`.
    ///
    /// Returns false and leaves the clock unchanged if `target` is not in the
    /// future.
    pub fn advance_to(&mut self, target: Ticks) -> bool {
        if target <= self.now {
            return false;
        }
        self.now = target;
        true
    }
}
