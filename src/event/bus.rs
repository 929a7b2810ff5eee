use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::event::StackEvent;

/// Receives stack notifications. Implemented automatically for closures.
pub trait StackObserver {
    fn handle_event(&mut self, event: &StackEvent);
}

impl<F: FnMut(&StackEvent)> StackObserver for F {
    fn handle_event(&mut self, event: &StackEvent) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

// Single static counter for all observer handles
static NEXT_OBSERVER_ID: AtomicUsize = AtomicUsize::new(1);

/// A simple event bus broadcasting stack events to registered observers.
///
/// Observers hold no ownership of the stack; they are plain callbacks kept
/// alive by the bus until unsubscribed.
pub struct EventBus {
    observers: RefCell<Vec<(ObserverId, Box<dyn StackObserver>)>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "observers",
                &format!("<{} observers>", self.observers.borrow().len()),
            )
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe an observer to receive events
    pub fn subscribe(&self, observer: Box<dyn StackObserver>) -> ObserverId {
        let id = ObserverId(NEXT_OBSERVER_ID.fetch_add(1, Ordering::SeqCst));
        self.observers.borrow_mut().push((id, observer));
        id
    }

    /// Remove a previously subscribed observer. Returns false if the handle
    /// is unknown (already unsubscribed).
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Emit an event to all registered observers
    pub fn emit(&self, event: StackEvent) {
        for (_, observer) in &mut *self.observers.borrow_mut() {
            observer.handle_event(&event);
        }
    }
}
