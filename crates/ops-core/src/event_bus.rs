//! Event bus between the session and whoever drives it.
//!
//! The runtime is single-threaded, so the bus uses interior mutability via
//! RefCell. Events are buffered until the CLI drains them after a query.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ops_types::event::SessionEvent;

/// Shared event bus — clone-cheap via Rc.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<SessionEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: SessionEvent) {
        self.inner.borrow_mut().push_back(event);
    }

    /// Drain all pending events, oldest first.
    pub fn drain(&self) -> Vec<SessionEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}
