//! The ordered element collection and its mutation operations.
//!
//! Every operation is synchronous and total: a stale id, an unknown type tag
//! or an impossible placement leaves the store untouched and is reported only
//! through the return value and a debug log line. Structural changes are
//! recorded as [`DocumentEvent`]s which the owner drains with
//! [`ElementStore::take_events`] and forwards to observers such as the edit
//! session.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::element::{Element, Properties, merge_properties};
use crate::event::DocumentEvent;
use crate::id_generator::{ElementId, generate_id};
use crate::registry::{ElementRegistry, ElementTypeDescriptor};

/// Where an element sits: its parent (`None` for the top level) and its index
/// within the parent's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub parent: Option<ElementId>,
    pub index: usize,
}

impl Location {
    pub fn root(index: usize) -> Self {
        Self { parent: None, index }
    }
}

/// Placement of a newly created element. Anchored positions are resolved
/// against the anchor's current position when the insert runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertPosition {
    Index(usize),
    Before(ElementId),
    After(ElementId),
    /// Last child of a container element.
    Inside(ElementId),
    End,
}

#[derive(Debug, Clone)]
pub struct ElementStore {
    registry: Arc<ElementRegistry>,
    elements: Vec<Element>,
    pending: Vec<DocumentEvent>,
}

impl ElementStore {
    pub fn new(registry: Arc<ElementRegistry>) -> Self {
        Self {
            registry,
            elements: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Builds a store around previously saved elements, repairing repeated
    /// ids and stale `order` fields.
    pub fn with_elements(registry: Arc<ElementRegistry>, mut elements: Vec<Element>) -> Self {
        repair(&mut elements, &mut HashSet::new(), &registry);
        Self {
            registry,
            elements,
            pending: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<ElementRegistry> {
        Arc::clone(&self.registry)
    }

    /// Top-level elements in display order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of top-level elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements at every nesting level.
    pub fn total_len(&self) -> usize {
        self.ids().len()
    }

    /// Every id in the store, depth first.
    pub fn ids(&self) -> Vec<ElementId> {
        let mut ids = Vec::new();
        for element in &self.elements {
            element.collect_ids(&mut ids);
        }
        ids
    }

    pub fn root_ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|element| element.id.clone()).collect()
    }

    pub fn find(&self, id: &ElementId) -> Option<&Element> {
        find_in(&self.elements, id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.find(id).is_some()
    }

    pub fn locate(&self, id: &ElementId) -> Option<Location> {
        locate_in(&self.elements, None, id)
    }

    /// Index of the element within its own sibling list.
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.locate(id).map(|location| location.index)
    }

    pub fn descriptor_of(&self, id: &ElementId) -> Option<&ElementTypeDescriptor> {
        self.find(id)
            .and_then(|element| self.registry.find_descriptor(element.type_tag()))
    }

    /// Creates an element of `type_tag` at `index` (clamped) in the top level.
    pub fn insert_at(&mut self, index: usize, type_tag: &str) -> Option<ElementId> {
        self.insert_in(None, index, type_tag)
    }

    pub fn append(&mut self, type_tag: &str) -> Option<ElementId> {
        self.insert_at(self.elements.len(), type_tag)
    }

    /// Creates an element at an index or next to an anchor element. A missing
    /// anchor falls back to appending at the end of the top level.
    pub fn insert(&mut self, position: &InsertPosition, type_tag: &str) -> Option<ElementId> {
        let location = self.resolve_position(position);
        self.insert_in(location.parent.as_ref(), location.index, type_tag)
    }

    pub fn insert_child_at(
        &mut self,
        parent: &ElementId,
        index: usize,
        type_tag: &str,
    ) -> Option<ElementId> {
        self.insert_in(Some(parent), index, type_tag)
    }

    pub fn append_child(&mut self, parent: &ElementId, type_tag: &str) -> Option<ElementId> {
        let index = self.find(parent)?.children.len();
        self.insert_in(Some(parent), index, type_tag)
    }

    /// Deep-copies an element (fresh ids throughout) right after the source.
    pub fn duplicate(&mut self, id: &ElementId) -> Option<ElementId> {
        let Some(location) = self.locate(id) else {
            log::debug!("Ignoring duplicate of missing element {}", id);
            return None;
        };
        let list = self.list_mut(location.parent.as_ref())?;
        let copy = list[location.index].duplicate();
        let new_id = copy.id.clone();
        let index = location.index + 1;
        list.insert(index, copy);
        renumber(list);

        self.pending.push(DocumentEvent::Inserted {
            id: new_id.clone(),
            parent: location.parent,
            index,
        });
        Some(new_id)
    }

    /// Removes an element and its descendants. Locked elements stay put.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        if self.find(id).is_some_and(|element| element.locked) {
            log::debug!("Element {} is locked and cannot be removed", id);
            return None;
        }
        self.detach(id)
    }

    /// Removes an element regardless of its lock.
    pub(crate) fn detach(&mut self, id: &ElementId) -> Option<Element> {
        let Some(location) = self.locate(id) else {
            log::debug!("Ignoring removal of missing element {}", id);
            return None;
        };

        let list = self.list_mut(location.parent.as_ref())?;
        let removed = list.remove(location.index);
        renumber(list);

        let mut ids = Vec::new();
        removed.collect_ids(&mut ids);
        self.pending.push(DocumentEvent::Removed { ids });
        Some(removed)
    }

    /// Shallow-merges `changes` into the element's properties. An empty
    /// change set is a no-op.
    pub fn update(&mut self, id: &ElementId, changes: Properties) -> bool {
        let Some(element) = find_in_mut(&mut self.elements, id) else {
            log::debug!("Ignoring update of missing element {}", id);
            return false;
        };
        if changes.is_empty() {
            return false;
        }
        merge_properties(&mut element.properties, changes);
        self.pending.push(DocumentEvent::Updated { id: id.clone() });
        true
    }

    /// Moves `from` into the slot currently held by `to`; the elements in
    /// between shift by one. Both must share a parent list.
    pub fn reorder(&mut self, from: &ElementId, to: &ElementId) -> bool {
        if from == to {
            return false;
        }
        let (Some(from_location), Some(to_location)) = (self.locate(from), self.locate(to)) else {
            log::debug!("Ignoring reorder of {} onto {}: element missing", from, to);
            return false;
        };
        if from_location.parent != to_location.parent {
            log::debug!("Ignoring reorder of {} onto {}: different parents", from, to);
            return false;
        }
        if self.find(from).is_some_and(|element| element.locked) {
            log::debug!("Element {} is locked and cannot be reordered", from);
            return false;
        }

        self.move_within(from_location.parent.as_ref(), from_location.index, to_location.index)
    }

    pub fn set_locked(&mut self, id: &ElementId, locked: bool) -> bool {
        let Some(element) = find_in_mut(&mut self.elements, id) else {
            log::debug!("Ignoring lock change of missing element {}", id);
            return false;
        };
        element.locked = locked;
        self.pending.push(DocumentEvent::LockChanged {
            id: id.clone(),
            locked,
        });
        true
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.pending.push(DocumentEvent::Cleared);
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Reinserts a previously removed element at an exact location. Refused
    /// when any of its ids is already present.
    pub(crate) fn restore(&mut self, location: &Location, element: Element) -> bool {
        let mut incoming = Vec::new();
        element.collect_ids(&mut incoming);
        if incoming.iter().any(|id| self.contains(id)) {
            log::debug!("Refusing to restore element {}: id already present", element.id);
            return false;
        }

        let Some(list) = self.list_mut(location.parent.as_ref()) else {
            return false;
        };
        let index = location.index.min(list.len());
        let id = element.id.clone();
        list.insert(index, element);
        renumber(list);

        self.pending.push(DocumentEvent::Inserted {
            id,
            parent: location.parent.clone(),
            index,
        });
        true
    }

    /// Swaps in a whole property map, returning the previous one.
    pub(crate) fn replace_properties(
        &mut self,
        id: &ElementId,
        properties: Properties,
    ) -> Option<Properties> {
        let element = find_in_mut(&mut self.elements, id)?;
        let previous = std::mem::replace(&mut element.properties, properties);
        self.pending.push(DocumentEvent::Updated { id: id.clone() });
        Some(previous)
    }

    /// Moves an element to `index` within its own list, returning where it was.
    pub(crate) fn move_to(&mut self, id: &ElementId, index: usize) -> Option<usize> {
        let location = self.locate(id)?;
        self.move_within(location.parent.as_ref(), location.index, index)
            .then_some(location.index)
    }

    /// Replaces the whole document, returning the previous contents.
    pub(crate) fn replace_all(&mut self, mut elements: Vec<Element>) -> Vec<Element> {
        repair(&mut elements, &mut HashSet::new(), &self.registry);
        let previous = std::mem::replace(&mut self.elements, elements);
        self.pending.push(DocumentEvent::Replaced);
        previous
    }

    fn resolve_position(&self, position: &InsertPosition) -> Location {
        match position {
            InsertPosition::Index(index) => Location::root(*index),
            InsertPosition::End => Location::root(self.elements.len()),
            InsertPosition::Before(anchor) | InsertPosition::After(anchor) => {
                match self.locate(anchor) {
                    Some(mut location) => {
                        if matches!(position, InsertPosition::After(_)) {
                            location.index += 1;
                        }
                        location
                    }
                    None => {
                        log::debug!("Insert anchor {} no longer exists, appending", anchor);
                        Location::root(self.elements.len())
                    }
                }
            }
            InsertPosition::Inside(parent) => match self.find(parent) {
                Some(container) => Location {
                    parent: Some(parent.clone()),
                    index: container.children.len(),
                },
                None => {
                    log::debug!("Insert container {} no longer exists, appending", parent);
                    Location::root(self.elements.len())
                }
            },
        }
    }

    fn insert_in(
        &mut self,
        parent: Option<&ElementId>,
        index: usize,
        type_tag: &str,
    ) -> Option<ElementId> {
        let Some(descriptor) = self.registry.find_descriptor(type_tag) else {
            log::warn!("Ignoring insert of unknown element type: {}", type_tag);
            return None;
        };
        if parent.is_none() && descriptor.nested_only {
            log::debug!("Element type {} only goes inside a container", type_tag);
            return None;
        }
        let element = Element::from_descriptor(descriptor);

        if let Some(parent_id) = parent {
            let accepted = self
                .descriptor_of(parent_id)
                .is_some_and(|parent| parent.accepts_child(type_tag));
            if !accepted {
                log::debug!("Element {} does not accept children of type {}", parent_id, type_tag);
                return None;
            }
        }

        let id = element.id.clone();
        let list = self.list_mut(parent)?;
        let index = index.min(list.len());
        list.insert(index, element);
        renumber(list);

        self.pending.push(DocumentEvent::Inserted {
            id: id.clone(),
            parent: parent.cloned(),
            index,
        });
        Some(id)
    }

    fn move_within(&mut self, parent: Option<&ElementId>, from: usize, to: usize) -> bool {
        let Some(list) = self.list_mut(parent) else {
            return false;
        };
        if from >= list.len() {
            return false;
        }
        let element = list.remove(from);
        let id = element.id.clone();
        let to = to.min(list.len());
        list.insert(to, element);
        renumber(list);

        self.pending.push(DocumentEvent::Moved { id, from, to });
        true
    }

    fn list_mut(&mut self, parent: Option<&ElementId>) -> Option<&mut Vec<Element>> {
        match parent {
            None => Some(&mut self.elements),
            Some(parent_id) => {
                find_in_mut(&mut self.elements, parent_id).map(|parent| &mut parent.children)
            }
        }
    }
}

fn find_in<'a>(list: &'a [Element], id: &ElementId) -> Option<&'a Element> {
    list.iter().find_map(|element| {
        if element.id == *id {
            Some(element)
        } else {
            find_in(&element.children, id)
        }
    })
}

fn find_in_mut<'a>(list: &'a mut [Element], id: &ElementId) -> Option<&'a mut Element> {
    list.iter_mut().find_map(|element| {
        if element.id == *id {
            Some(element)
        } else {
            find_in_mut(&mut element.children, id)
        }
    })
}

fn locate_in(list: &[Element], parent: Option<&ElementId>, id: &ElementId) -> Option<Location> {
    if let Some(index) = list.iter().position(|element| element.id == *id) {
        return Some(Location {
            parent: parent.cloned(),
            index,
        });
    }
    list.iter()
        .find_map(|element| locate_in(&element.children, Some(&element.id), id))
}

fn renumber(list: &mut [Element]) {
    for (index, element) in list.iter_mut().enumerate() {
        element.order = index as u32;
    }
}

fn repair(elements: &mut [Element], seen: &mut HashSet<ElementId>, registry: &ElementRegistry) {
    for (index, element) in elements.iter_mut().enumerate() {
        element.order = index as u32;
        if !seen.insert(element.id.clone()) {
            let fresh = generate_id();
            log::warn!("Duplicate element id {} replaced with {}", element.id, fresh);
            element.id = fresh.clone();
            seen.insert(fresh);
        }
        if registry.find_descriptor(element.type_tag()).is_none() {
            log::warn!("Element {} has unknown type {}", element.id, element.type_tag());
        }
        repair(&mut element.children, seen, registry);
    }
}
