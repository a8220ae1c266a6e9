//! Captured console output of a scenario.

use std::cell::RefCell;
use std::rc::Rc;

/// A `console.log` stand-in shared by every callback of a scenario.
///
/// Cloning yields another handle to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct Console {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Console {
    /// Creates an empty console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line.
    pub fn log(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::trace!(%text, "console");
        self.lines.borrow_mut().push(text);
    }

    /// Everything logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}
