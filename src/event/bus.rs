use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{EditorEvent, EventHandler};

/// A simple event bus for broadcasting editor events to registered handlers
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new event bus
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    /// Emit an event to all registered handlers
    pub fn emit(&self, event: EditorEvent) {
        for handler in &mut *self.handlers.borrow_mut() {
            handler.handle_event(&event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

/// Handler that keeps a shared, bounded record of recent events. The app
/// reads it for its status line; tests read it to assert on emissions.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<EditorEvent>>>,
    capacity: Option<usize>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::default(),
            capacity: Some(capacity),
        }
    }

    pub fn events(&self) -> Vec<EditorEvent> {
        self.entries.lock().clone()
    }

    pub fn last(&self) -> Option<EditorEvent> {
        self.entries.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &EditorEvent) {
        let mut entries = self.entries.lock();
        entries.push(event.clone());
        if let Some(capacity) = self.capacity {
            let overflow = entries.len().saturating_sub(capacity);
            entries.drain(..overflow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sees_emitted_events() {
        let bus = EventBus::new();
        let log = EventLog::new();
        bus.subscribe(Box::new(log.clone()));

        bus.emit(EditorEvent::FlowBack);
        bus.emit(EditorEvent::Saved { element_count: 2 });

        assert_eq!(bus.handler_count(), 1);
        assert_eq!(log.events().len(), 2);
        assert_eq!(log.last(), Some(EditorEvent::Saved { element_count: 2 }));
    }

    #[test]
    fn bounded_log_drops_oldest() {
        let mut log = EventLog::with_capacity(2);
        for count in 0..5 {
            log.handle_event(&EditorEvent::Saved { element_count: count });
        }
        assert_eq!(
            log.events(),
            vec![
                EditorEvent::Saved { element_count: 3 },
                EditorEvent::Saved { element_count: 4 },
            ]
        );
    }
}
