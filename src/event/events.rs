use crate::drag::DragState;
use crate::id_generator::ElementId;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    DocumentChanged(DocumentEvent),
    SelectionChanged(SelectionEvent),
    DragStateChanged {
        old: DragState,
        new: DragState,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    Saved {
        element_count: usize,
    },
    FlowCompleted {
        element_count: usize,
    },
    FlowBack,
}

/// Structural changes recorded by the element store.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    Inserted {
        id: ElementId,
        parent: Option<ElementId>,
        index: usize,
    },
    /// The removed element followed by all of its descendants.
    Removed {
        ids: Vec<ElementId>,
    },
    Updated {
        id: ElementId,
    },
    Moved {
        id: ElementId,
        from: usize,
        to: usize,
    },
    LockChanged {
        id: ElementId,
        locked: bool,
    },
    Cleared,
    Replaced,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Selected(ElementId),
    EditorClosed,
    EditorOpened,
    Cleared,
}
