//! Gesture interpreter for palette and canvas drag-and-drop.
//!
//! ```text
//!            begin(NewFromRegistry)          drop / cancel
//!   ┌──────┐ ───────────────────────► ┌──────────────┐ ───────────┐
//!   │      │                          │ DraggingNew  │            │
//!   │ Idle │ ◄─────────────────────────────────────────────────────┘
//!   │      │ ───────────────────────► ┌──────────────────┐        │
//!   └──────┘  begin(ExistingElement)  │ DraggingExisting │ ───────┘
//!                                     └──────────────────┘
//! ```
//!
//! The controller keeps no document data. A drop turns into a [`Command`]
//! that the editor runs against the store, so the gesture logic can be driven
//! with plain function calls in tests.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::TransitionError;
use crate::id_generator::ElementId;
use crate::store::{ElementStore, InsertPosition};

/// What a drag carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPayload {
    NewFromRegistry(String),
    ExistingElement(ElementId),
}

/// What the pointer was released over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget {
    /// A rendered element; new elements go into its slot.
    Element(ElementId),
    /// The child area of a container element.
    Container(ElementId),
    /// Empty canvas space below the last element.
    Canvas,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragState {
    #[default]
    Idle,
    DraggingNew {
        type_tag: String,
    },
    DraggingExisting {
        id: ElementId,
    },
}

impl DragState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::DraggingNew { .. } => "DraggingNew",
            Self::DraggingExisting { .. } => "DraggingExisting",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        !self.is_idle()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Starts a drag from Idle. Existing elements must be present and
    /// unlocked.
    pub fn begin(&mut self, payload: DragPayload, store: &ElementStore) -> Result<(), TransitionError> {
        let next = match payload {
            DragPayload::NewFromRegistry(type_tag) => DragState::DraggingNew { type_tag },
            DragPayload::ExistingElement(id) => {
                match store.find(&id) {
                    None => return Err(TransitionError::MissingElement(id)),
                    Some(element) if element.locked => {
                        return Err(TransitionError::LockedElement(id));
                    }
                    Some(_) => DragState::DraggingExisting { id },
                }
            }
        };

        if !self.state.is_idle() {
            return Err(TransitionError::InvalidStateTransition {
                from: self.state.name(),
                to: next.name(),
            });
        }

        log::debug!("Drag started: {:?}", next);
        self.state = next;
        Ok(())
    }

    /// Ends the drag. Returns the store command the drop stands for; `None`
    /// target (released outside any drop zone) behaves like a cancel.
    ///
    /// A new element dropped on a container that accepts it goes inside,
    /// otherwise it takes the slot in front of the element it landed on.
    pub fn drop_on(&mut self, target: Option<DropTarget>, store: &ElementStore) -> Option<Command> {
        let state = std::mem::take(&mut self.state);
        let Some(target) = target else {
            log::debug!("Drop without a target, cancelling {:?}", state);
            return None;
        };

        match (state, target) {
            (DragState::Idle, _) => None,
            (DragState::DraggingNew { type_tag }, target) => {
                let position = match target {
                    DropTarget::Element(anchor) => {
                        let accepts = store
                            .descriptor_of(&anchor)
                            .is_some_and(|descriptor| descriptor.accepts_child(&type_tag));
                        if accepts {
                            InsertPosition::Inside(anchor)
                        } else {
                            InsertPosition::Before(anchor)
                        }
                    }
                    DropTarget::Container(parent) => InsertPosition::Inside(parent),
                    DropTarget::Canvas => InsertPosition::End,
                };
                Some(Command::InsertElement { position, type_tag })
            }
            (DragState::DraggingExisting { id }, DropTarget::Element(target)) => {
                Some(Command::ReorderElement { from: id, to: target })
            }
            (DragState::DraggingExisting { id }, target) => {
                log::debug!("Element {} dropped on {:?}, nothing to move", id, target);
                None
            }
        }
    }

    /// Abandons the drag without touching the store.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.state.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }
}
