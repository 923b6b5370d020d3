use serde::{Deserialize, Serialize};

use crate::id_generator::{ElementId, generate_id};
use crate::registry::ElementTypeDescriptor;

mod properties;

pub use properties::{Properties, PropertyExt, merge_properties};

/// One addressable, typed item in an editable collection: a page block, a
/// course module, a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    type_tag: String,
    #[serde(default)]
    pub properties: Properties,
    /// Position within the parent list, kept in sync by the store.
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an element with explicit id and properties.
    pub fn new(id: impl Into<ElementId>, type_tag: impl Into<String>, properties: Properties) -> Self {
        Self {
            id: id.into(),
            type_tag: type_tag.into(),
            properties,
            order: 0,
            locked: false,
            children: Vec::new(),
        }
    }

    /// Instantiates a descriptor: fresh id, private copy of the defaults.
    pub fn from_descriptor(descriptor: &ElementTypeDescriptor) -> Self {
        Self::new(
            generate_id(),
            descriptor.type_tag.clone(),
            descriptor.default_properties.clone(),
        )
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Deep copy with a fresh id for this element and every descendant.
    pub fn duplicate(&self) -> Self {
        Self {
            id: generate_id(),
            type_tag: self.type_tag.clone(),
            properties: self.properties.clone(),
            order: self.order,
            locked: self.locked,
            children: self.children.iter().map(Element::duplicate).collect(),
        }
    }

    /// Ids of this element and all of its descendants, depth first.
    pub fn collect_ids(&self, out: &mut Vec<ElementId>) {
        out.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(out);
        }
    }

    /// Display title used by panels: the first text-like property, else the tag.
    pub fn title(&self) -> String {
        ["title", "text", "label", "content"]
            .iter()
            .find_map(|key| self.properties.str_value(key))
            .filter(|title| !title.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| self.type_tag.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn module_with_lessons() -> Element {
        let lesson = |id: &str| Element::new(id, "text_lesson", Properties::new());
        Element::new("m1", "module", Properties::new())
            .with_children(vec![lesson("l1"), lesson("l2")])
    }

    #[test]
    fn duplicate_refreshes_every_id() {
        let module = module_with_lessons();
        let copy = module.duplicate();

        let mut original_ids = Vec::new();
        module.collect_ids(&mut original_ids);
        let mut copy_ids = Vec::new();
        copy.collect_ids(&mut copy_ids);

        assert_eq!(copy_ids.len(), 3);
        assert!(copy_ids.iter().all(|id| !original_ids.contains(id)));
        assert_eq!(copy.children[1].type_tag(), "text_lesson");
    }

    #[test]
    fn title_falls_back_to_type_tag() {
        let mut element = Element::new("a", "divider", Properties::new());
        assert_eq!(element.title(), "divider");

        element.properties.insert("text".into(), json!("Welcome"));
        assert_eq!(element.title(), "Welcome");
    }

    #[test]
    fn leaf_serializes_without_children() {
        let element = Element::new("a", "spacer", Properties::new());
        let json = serde_json::to_value(&element).unwrap();
        assert!(json.get("children").is_none());
        assert!(json.get("locked").is_none());

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }
}
