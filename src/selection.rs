use serde::{Deserialize, Serialize};

use crate::event::{DocumentEvent, SelectionEvent};
use crate::id_generator::ElementId;

/// Which element is highlighted and whether its property panel is showing.
///
/// The session only refers to elements by id; it never owns them. Closing the
/// panel keeps the selection so the same element can be reopened without
/// selecting it again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSession {
    selected_id: Option<ElementId>,
    editor_open: bool,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected_id.as_ref()
    }

    pub fn is_editor_open(&self) -> bool {
        self.editor_open
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected_id.as_ref() == Some(id)
    }

    /// Replaces the selection and opens the property panel for it.
    pub fn select(&mut self, id: ElementId) -> SelectionEvent {
        self.selected_id = Some(id.clone());
        self.editor_open = true;
        SelectionEvent::Selected(id)
    }

    pub fn close_editor(&mut self) -> Option<SelectionEvent> {
        if !self.editor_open {
            return None;
        }
        self.editor_open = false;
        Some(SelectionEvent::EditorClosed)
    }

    /// Reopens the panel for the kept selection, if any.
    pub fn open_editor(&mut self) -> Option<SelectionEvent> {
        if self.selected_id.is_none() || self.editor_open {
            return None;
        }
        self.editor_open = true;
        Some(SelectionEvent::EditorOpened)
    }

    pub fn on_element_removed(&mut self, id: &ElementId) -> Option<SelectionEvent> {
        if self.is_selected(id) {
            self.clear()
        } else {
            None
        }
    }

    pub fn clear(&mut self) -> Option<SelectionEvent> {
        let had_selection = self.selected_id.take().is_some();
        self.editor_open = false;
        had_selection.then_some(SelectionEvent::Cleared)
    }

    /// Reacts to a store change. `still_present` answers whether the current
    /// selection survived a wholesale replacement of the document.
    pub fn observe(
        &mut self,
        event: &DocumentEvent,
        still_present: impl FnOnce(&ElementId) -> bool,
    ) -> Option<SelectionEvent> {
        match event {
            DocumentEvent::Removed { ids } => {
                let hit = ids.iter().find(|id| self.is_selected(id))?.clone();
                self.on_element_removed(&hit)
            }
            DocumentEvent::Cleared => self.clear(),
            DocumentEvent::Replaced => {
                let vanished = self.selected_id.as_ref().is_some_and(|id| !still_present(id));
                if vanished { self.clear() } else { None }
            }
            _ => None,
        }
    }
}
