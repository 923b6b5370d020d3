//! The editing context tying the pieces together.
//!
//! `Editor` owns one element store together with its edit session, drag
//! controller, undo history and event bus. Every document mutation goes
//! through [`Editor::execute`], which records the undo step, routes store
//! events to the session (so deleting the selected element closes its
//! property panel) and then broadcasts them to subscribers.

use std::sync::Arc;

use crate::command::{Command, CommandHistory, CommandResult};
use crate::drag::{DragController, DragPayload, DragState, DropTarget};
use crate::element::{Element, Properties};
use crate::error::TransitionError;
use crate::event::{DocumentEvent, EditorEvent, EventBus, EventHandler, SelectionEvent};
use crate::id_generator::ElementId;
use crate::persistence::{PersistenceResult, SaveSink};
use crate::registry::ElementRegistry;
use crate::selection::EditSession;
use crate::store::{ElementStore, InsertPosition};

/// Navigation collaborator of the surrounding page flow.
pub trait FlowHandler {
    /// The user confirmed completion with the current document.
    fn on_complete(&mut self, elements: &[Element]);
    fn on_back(&mut self);
}

#[derive(Debug)]
pub struct Editor {
    store: ElementStore,
    session: EditSession,
    drag: DragController,
    history: CommandHistory,
    event_bus: EventBus,
}

impl Editor {
    pub fn new(registry: Arc<ElementRegistry>) -> Self {
        Self::from_store(ElementStore::new(registry))
    }

    /// Opens an existing document; repeated ids are repaired on the way in.
    pub fn with_elements(registry: Arc<ElementRegistry>, elements: Vec<Element>) -> Self {
        Self::from_store(ElementStore::with_elements(registry, elements))
    }

    fn from_store(store: ElementStore) -> Self {
        Self {
            store,
            session: EditSession::new(),
            drag: DragController::new(),
            history: CommandHistory::new(),
            event_bus: EventBus::new(),
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = CommandHistory::with_limit(limit);
        self
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn registry(&self) -> &ElementRegistry {
        self.store.registry()
    }

    pub fn elements(&self) -> &[Element] {
        self.store.elements()
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.event_bus.subscribe(handler);
    }

    /// Runs a command through the undo history. Returns whether the document
    /// changed.
    pub fn execute(&mut self, command: Command) -> bool {
        !self.run(command).is_empty()
    }

    pub fn insert_at(&mut self, index: usize, type_tag: &str) -> Option<ElementId> {
        self.insert(InsertPosition::Index(index), type_tag)
    }

    pub fn append(&mut self, type_tag: &str) -> Option<ElementId> {
        self.insert(InsertPosition::End, type_tag)
    }

    pub fn append_child(&mut self, parent: &ElementId, type_tag: &str) -> Option<ElementId> {
        self.insert(InsertPosition::Inside(parent.clone()), type_tag)
    }

    pub fn insert(&mut self, position: InsertPosition, type_tag: &str) -> Option<ElementId> {
        let events = self.run(Command::InsertElement {
            position,
            type_tag: type_tag.to_owned(),
        });
        inserted_id(&events)
    }

    pub fn duplicate(&mut self, id: &ElementId) -> Option<ElementId> {
        let events = self.run(Command::DuplicateElement { id: id.clone() });
        inserted_id(&events)
    }

    pub fn remove(&mut self, id: &ElementId) -> bool {
        self.execute(Command::RemoveElement { id: id.clone() })
    }

    pub fn update(&mut self, id: &ElementId, changes: Properties) -> bool {
        self.execute(Command::UpdateElement {
            id: id.clone(),
            changes,
        })
    }

    pub fn reorder(&mut self, from: &ElementId, to: &ElementId) -> bool {
        self.execute(Command::ReorderElement {
            from: from.clone(),
            to: to.clone(),
        })
    }

    pub fn set_locked(&mut self, id: &ElementId, locked: bool) -> bool {
        self.execute(Command::SetLocked {
            id: id.clone(),
            locked,
        })
    }

    pub fn clear(&mut self) {
        self.run(Command::ClearAll);
    }

    /// Swaps in a loaded document. History is dropped; the selection survives
    /// only if its element is still there.
    pub fn load(&mut self, elements: Vec<Element>) {
        self.cancel_drag();
        self.history.clear();
        self.store.replace_all(elements);
        self.dispatch_document_events();
        self.emit_history();
    }

    /// Selects an element and opens its property panel. Stale ids are ignored.
    pub fn select(&mut self, id: &ElementId) -> bool {
        if !self.store.contains(id) {
            log::debug!("Ignoring selection of missing element {}", id);
            return false;
        }
        let event = self.session.select(id.clone());
        self.event_bus.emit(EditorEvent::SelectionChanged(event));
        true
    }

    pub fn close_editor(&mut self) {
        if let Some(event) = self.session.close_editor() {
            self.event_bus.emit(EditorEvent::SelectionChanged(event));
        }
    }

    pub fn open_editor(&mut self) {
        if let Some(event) = self.session.open_editor() {
            self.event_bus.emit(EditorEvent::SelectionChanged(event));
        }
    }

    pub fn deselect(&mut self) {
        if let Some(event) = self.session.clear() {
            self.event_bus.emit(EditorEvent::SelectionChanged(event));
        }
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.session
            .selected_id()
            .and_then(|id| self.store.find(id))
    }

    /// Applies property-panel edits to the selected element.
    pub fn update_selected(&mut self, changes: Properties) -> bool {
        match self.session.selected_id().cloned() {
            Some(id) => self.update(&id, changes),
            None => false,
        }
    }

    pub fn begin_drag(&mut self, payload: DragPayload) -> Result<(), TransitionError> {
        let old = self.drag.state().clone();
        self.drag.begin(payload, &self.store)?;
        self.emit_drag_change(old);
        Ok(())
    }

    /// Finishes the drag over `target` (`None` when released outside every
    /// drop zone). Returns whether the document changed.
    pub fn drop_on(&mut self, target: Option<DropTarget>) -> bool {
        let old = self.drag.state().clone();
        let command = self.drag.drop_on(target, &self.store);
        self.emit_drag_change(old);
        command.is_some_and(|command| self.execute(command))
    }

    pub fn cancel_drag(&mut self) -> bool {
        let old = self.drag.state().clone();
        let cancelled = self.drag.cancel();
        self.emit_drag_change(old);
        cancelled
    }

    pub fn undo(&mut self) -> CommandResult {
        let result = self.history.undo(&mut self.store);
        self.dispatch_document_events();
        self.emit_history();
        result
    }

    pub fn redo(&mut self) -> CommandResult {
        let result = self.history.redo(&mut self.store);
        self.dispatch_document_events();
        self.emit_history();
        result
    }

    /// Hands the full document to the save collaborator.
    pub fn save(&self, sink: &mut dyn SaveSink) -> PersistenceResult<()> {
        sink.save(self.store.elements())?;
        self.event_bus.emit(EditorEvent::Saved {
            element_count: self.store.total_len(),
        });
        Ok(())
    }

    pub fn complete(&self, flow: &mut dyn FlowHandler) {
        flow.on_complete(self.store.elements());
        self.event_bus.emit(EditorEvent::FlowCompleted {
            element_count: self.store.total_len(),
        });
    }

    pub fn back(&self, flow: &mut dyn FlowHandler) {
        flow.on_back();
        self.event_bus.emit(EditorEvent::FlowBack);
    }

    fn run(&mut self, command: Command) -> Vec<DocumentEvent> {
        let changed = self.history.execute(command, &mut self.store);
        let events = self.dispatch_document_events();
        if changed {
            self.emit_history();
        }
        events
    }

    fn dispatch_document_events(&mut self) -> Vec<DocumentEvent> {
        let events = self.store.take_events();
        for event in &events {
            let store = &self.store;
            if let Some(selection) = self.session.observe(event, |id| store.contains(id)) {
                self.emit_selection(selection);
            }
            self.event_bus.emit(EditorEvent::DocumentChanged(event.clone()));
        }
        events
    }

    fn emit_selection(&self, event: SelectionEvent) {
        self.event_bus.emit(EditorEvent::SelectionChanged(event));
    }

    fn emit_history(&self) {
        self.event_bus.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit_drag_change(&self, old: DragState) {
        let new = self.drag.state();
        if old != *new {
            self.event_bus.emit(EditorEvent::DragStateChanged {
                old,
                new: new.clone(),
            });
        }
    }
}

fn inserted_id(events: &[DocumentEvent]) -> Option<ElementId> {
    events.iter().find_map(|event| match event {
        DocumentEvent::Inserted { id, .. } => Some(id.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;

    fn editor() -> (Editor, EventLog) {
        let editor = Editor::new(Arc::new(ElementRegistry::page_blocks()));
        let log = EventLog::new();
        editor.subscribe(Box::new(log.clone()));
        (editor, log)
    }

    #[test]
    fn selection_event_precedes_document_event() {
        let (mut editor, log) = editor();
        let id = editor.append("heading").unwrap();
        editor.select(&id);
        log.clear();

        assert!(editor.remove(&id));
        let events = log.events();
        assert_eq!(events[0], EditorEvent::SelectionChanged(SelectionEvent::Cleared));
        assert_eq!(
            events[1],
            EditorEvent::DocumentChanged(DocumentEvent::Removed { ids: vec![id] })
        );
    }

    #[test]
    fn stale_selection_is_ignored() {
        let (mut editor, _) = editor();
        assert!(!editor.select(&"ghost".into()));
        assert_eq!(editor.session().selected_id(), None);
    }

    #[test]
    fn drag_state_changes_are_broadcast() {
        let (mut editor, log) = editor();
        editor
            .begin_drag(DragPayload::NewFromRegistry("text".into()))
            .unwrap();
        editor.cancel_drag();

        let drags: Vec<EditorEvent> = log
            .events()
            .into_iter()
            .filter(|event| matches!(event, EditorEvent::DragStateChanged { .. }))
            .collect();
        assert_eq!(drags.len(), 2);
        assert!(editor.drag_state().is_idle());
        assert!(editor.elements().is_empty());
    }

    #[test]
    fn load_keeps_surviving_selection() {
        let (mut editor, _) = editor();
        let id = editor.append("button").unwrap();
        editor.select(&id);

        let document = editor.elements().to_vec();
        editor.load(document);
        assert!(editor.session().is_selected(&id));
        assert!(!editor.history().can_undo());

        editor.load(Vec::new());
        assert_eq!(editor.session().selected_id(), None);
    }

    #[test]
    fn loading_during_a_drag_announces_the_cancel() {
        let (mut editor, log) = editor();
        editor
            .begin_drag(DragPayload::NewFromRegistry("text".into()))
            .unwrap();
        log.clear();

        editor.load(Vec::new());
        assert!(editor.drag_state().is_idle());
        assert_eq!(
            log.events()[0],
            EditorEvent::DragStateChanged {
                old: DragState::DraggingNew {
                    type_tag: "text".into()
                },
                new: DragState::Idle,
            }
        );
    }

    #[test]
    fn empty_update_records_no_undo_step() {
        let (mut editor, log) = editor();
        let id = editor.append("heading").unwrap();
        log.clear();

        assert!(!editor.update(&id, Properties::new()));
        assert_eq!(editor.history().undo_stack().len(), 1);
        assert!(log.events().is_empty());
    }
}
