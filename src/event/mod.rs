mod bus;
mod events;

pub use bus::{EventBus, EventLog};
pub use events::{DocumentEvent, EditorEvent, SelectionEvent};

pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &EditorEvent);
}
