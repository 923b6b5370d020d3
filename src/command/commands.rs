use serde::{Deserialize, Serialize};

use crate::element::{Element, Properties};
use crate::id_generator::ElementId;
use crate::store::{ElementStore, InsertPosition, Location};

/// Mutations that can be executed against the element store and undone.
///
/// The first group is what the UI issues. The second group only appears as
/// the inverse of an executed command; they restore exact prior state, ids
/// included, so a redo never invents new identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Create an element from the registry
    InsertElement {
        position: InsertPosition,
        type_tag: String,
    },

    DuplicateElement {
        id: ElementId,
    },

    RemoveElement {
        id: ElementId,
    },

    /// Shallow-merge property changes
    UpdateElement {
        id: ElementId,
        changes: Properties,
    },

    /// Move `from` into the slot held by `to`
    ReorderElement {
        from: ElementId,
        to: ElementId,
    },

    SetLocked {
        id: ElementId,
        locked: bool,
    },

    ClearAll,

    /// Put a removed element back where it was
    RestoreElement {
        location: Location,
        element: Element,
    },

    /// Remove an element even if it is locked
    DetachElement {
        id: ElementId,
    },

    ReplaceProperties {
        id: ElementId,
        properties: Properties,
    },

    MoveElement {
        id: ElementId,
        index: usize,
    },

    ReplaceAll {
        elements: Vec<Element>,
    },
}

impl Command {
    /// Execute the command against the store.
    ///
    /// Returns the command that reverts it, or `None` when the store was left
    /// untouched (stale id, unknown type, refused placement).
    pub fn execute(&self, store: &mut ElementStore) -> Option<Command> {
        match self {
            Command::InsertElement { position, type_tag } => store
                .insert(position, type_tag)
                .map(|id| Command::DetachElement { id }),

            Command::DuplicateElement { id } => store
                .duplicate(id)
                .map(|id| Command::DetachElement { id }),

            Command::RemoveElement { id } => {
                let location = store.locate(id)?;
                let element = store.remove(id)?;
                Some(Command::RestoreElement { location, element })
            }

            Command::UpdateElement { id, changes } => {
                let previous = store.find(id)?.properties.clone();
                store.update(id, changes.clone()).then(|| Command::ReplaceProperties {
                    id: id.clone(),
                    properties: previous,
                })
            }

            Command::ReorderElement { from, to } => {
                let old_index = store.index_of(from)?;
                store.reorder(from, to).then(|| Command::MoveElement {
                    id: from.clone(),
                    index: old_index,
                })
            }

            Command::SetLocked { id, locked } => {
                let previous = store.find(id)?.locked;
                if previous == *locked {
                    return None;
                }
                store.set_locked(id, *locked).then(|| Command::SetLocked {
                    id: id.clone(),
                    locked: previous,
                })
            }

            Command::ClearAll => {
                let previous = store.elements().to_vec();
                store.clear();
                (!previous.is_empty()).then_some(Command::ReplaceAll { elements: previous })
            }

            Command::RestoreElement { location, element } => store
                .restore(location, element.clone())
                .then(|| Command::DetachElement {
                    id: element.id.clone(),
                }),

            Command::DetachElement { id } => {
                let location = store.locate(id)?;
                let element = store.detach(id)?;
                Some(Command::RestoreElement { location, element })
            }

            Command::ReplaceProperties { id, properties } => store
                .replace_properties(id, properties.clone())
                .map(|previous| Command::ReplaceProperties {
                    id: id.clone(),
                    properties: previous,
                }),

            Command::MoveElement { id, index } => store
                .move_to(id, *index)
                .map(|previous| Command::MoveElement {
                    id: id.clone(),
                    index: previous,
                }),

            Command::ReplaceAll { elements } => {
                let previous = store.replace_all(elements.clone());
                Some(Command::ReplaceAll { elements: previous })
            }
        }
    }

    /// Short human-readable description for history listings.
    pub fn label(&self) -> String {
        match self {
            Command::InsertElement { type_tag, .. } => format!("Add {}", type_tag),
            Command::DuplicateElement { .. } => "Duplicate".to_owned(),
            Command::RemoveElement { .. } | Command::DetachElement { .. } => "Delete".to_owned(),
            Command::UpdateElement { changes, .. } => {
                let keys: Vec<&str> = changes.keys().map(String::as_str).collect();
                format!("Edit {}", keys.join(", "))
            }
            Command::ReplaceProperties { .. } => "Edit".to_owned(),
            Command::ReorderElement { .. } | Command::MoveElement { .. } => "Move".to_owned(),
            Command::SetLocked { locked: true, .. } => "Lock".to_owned(),
            Command::SetLocked { locked: false, .. } => "Unlock".to_owned(),
            Command::ClearAll => "Clear".to_owned(),
            Command::RestoreElement { element, .. } => format!("Restore {}", element.type_tag()),
            Command::ReplaceAll { .. } => "Replace document".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ElementRegistry;
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> ElementStore {
        ElementStore::new(Arc::new(ElementRegistry::page_blocks()))
    }

    #[test]
    fn noop_commands_have_no_inverse() {
        let mut store = store();
        let missing = ElementId::from("missing");

        assert_eq!(Command::RemoveElement { id: missing.clone() }.execute(&mut store), None);
        assert_eq!(Command::DuplicateElement { id: missing.clone() }.execute(&mut store), None);
        assert_eq!(
            Command::InsertElement {
                position: InsertPosition::End,
                type_tag: "carousel".into()
            }
            .execute(&mut store),
            None
        );
        assert_eq!(Command::ClearAll.execute(&mut store), None);

        let id = store.append("heading").unwrap();
        store.take_events();
        assert_eq!(
            Command::UpdateElement {
                id,
                changes: Properties::new()
            }
            .execute(&mut store),
            None
        );
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn inverse_of_update_restores_full_map() {
        let mut store = store();
        let id = store.append("heading").unwrap();
        let before = store.find(&id).unwrap().properties.clone();

        let mut changes = Properties::new();
        changes.insert("subtitle".into(), json!("new key"));
        let inverse = Command::UpdateElement {
            id: id.clone(),
            changes,
        }
        .execute(&mut store)
        .unwrap();

        inverse.execute(&mut store).unwrap();
        assert_eq!(store.find(&id).unwrap().properties, before);
    }

    #[test]
    fn remove_and_restore_round_trip_keeps_position() {
        let mut store = store();
        let a = store.append("heading").unwrap();
        let b = store.append("text").unwrap();
        let c = store.append("button").unwrap();

        let inverse = Command::RemoveElement { id: b.clone() }.execute(&mut store).unwrap();
        assert_eq!(store.root_ids(), vec![a.clone(), c.clone()]);

        let redo = inverse.execute(&mut store).unwrap();
        assert_eq!(store.root_ids(), vec![a, b.clone(), c]);
        assert_eq!(redo, Command::DetachElement { id: b });
    }

    #[test]
    fn reorder_inverse_moves_back() {
        let mut store = store();
        let a = store.append("heading").unwrap();
        let b = store.append("text").unwrap();
        let c = store.append("button").unwrap();

        let inverse = Command::ReorderElement {
            from: a.clone(),
            to: c.clone(),
        }
        .execute(&mut store)
        .unwrap();
        assert_eq!(store.root_ids(), vec![b.clone(), c.clone(), a.clone()]);

        inverse.execute(&mut store).unwrap();
        assert_eq!(store.root_ids(), vec![a, b, c]);
    }

    #[test]
    fn locked_duplicate_can_still_be_undone() {
        let mut store = store();
        let id = store.append("image").unwrap();
        store.set_locked(&id, true);

        let inverse = Command::DuplicateElement { id }.execute(&mut store).unwrap();
        assert_eq!(store.len(), 2);
        inverse.execute(&mut store).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn lock_is_idempotent() {
        let mut store = store();
        let id = store.append("text").unwrap();
        let command = Command::SetLocked { id, locked: false };
        assert_eq!(command.execute(&mut store), None);
        assert_eq!(command.label(), "Unlock");
    }
}
