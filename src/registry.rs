//! Catalog of element types that can be placed in a builder.
//!
//! A registry is configuration data: it is built once at start-up (from one of
//! the built-in catalogs or from a JSON catalog file) and only read afterwards.
//! Lookups never fail loudly; an unknown type tag is simply "not found".

use crate::element::Properties;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while building a registry. These are configuration errors
/// and are meant to be reported at start-up.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Element catalog is empty")]
    Empty,

    #[error("Element catalog has no type allowed at the top level")]
    NoRootTypes,

    #[error("Duplicate element type tag in catalog: {0}")]
    DuplicateTypeTag(String),

    #[error("Element type {type_tag} has default properties that are not an object")]
    InvalidDefaults { type_tag: String },

    #[error("Failed to parse element catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read element catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Immutable template used to instantiate new elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTypeDescriptor {
    pub type_tag: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    pub category: String,
    #[serde(default)]
    pub default_properties: Properties,
    /// Type tags that may be nested inside elements of this type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_types: Vec<String>,
    /// Only allowed inside a container, never at the top level.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nested_only: bool,
}

impl ElementTypeDescriptor {
    pub fn new(type_tag: &str, label: &str, icon: &str, category: &str, defaults: Value) -> Self {
        let default_properties = match defaults {
            Value::Object(map) => map,
            _ => Properties::new(),
        };
        Self {
            type_tag: type_tag.to_owned(),
            label: label.to_owned(),
            icon: icon.to_owned(),
            category: category.to_owned(),
            default_properties,
            child_types: Vec::new(),
            nested_only: false,
        }
    }

    pub fn with_child_types(mut self, child_types: &[&str]) -> Self {
        self.child_types = child_types.iter().map(|tag| (*tag).to_owned()).collect();
        self
    }

    pub fn nested_only(mut self) -> Self {
        self.nested_only = true;
        self
    }

    pub fn is_container(&self) -> bool {
        !self.child_types.is_empty()
    }

    pub fn accepts_child(&self, type_tag: &str) -> bool {
        self.child_types.iter().any(|tag| tag == type_tag)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementRegistry {
    descriptors: Vec<ElementTypeDescriptor>,
}

impl ElementRegistry {
    /// Builds a registry, rejecting empty catalogs and repeated type tags.
    pub fn new(descriptors: Vec<ElementTypeDescriptor>) -> Result<Self, RegistryError> {
        if descriptors.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.type_tag.as_str()) {
                return Err(RegistryError::DuplicateTypeTag(descriptor.type_tag.clone()));
            }
        }

        let registry = Self { descriptors };
        if registry.root_types().is_empty() {
            return Err(RegistryError::NoRootTypes);
        }
        Ok(registry)
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: Vec<Value> = serde_json::from_str(json)?;
        let mut descriptors = Vec::with_capacity(raw.len());
        for entry in raw {
            if let Some(defaults) = entry.get("default_properties") {
                if !defaults.is_object() {
                    let type_tag = entry
                        .get("type_tag")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned();
                    return Err(RegistryError::InvalidDefaults { type_tag });
                }
            }
            descriptors.push(serde_json::from_value(entry)?);
        }
        Self::new(descriptors)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// All descriptors in catalog order, optionally restricted to one category.
    pub fn list_descriptors(&self, category: Option<&str>) -> Vec<&ElementTypeDescriptor> {
        self.descriptors
            .iter()
            .filter(|descriptor| category.is_none_or(|category| descriptor.category == category))
            .collect()
    }

    pub fn find_descriptor(&self, type_tag: &str) -> Option<&ElementTypeDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.type_tag == type_tag)
    }

    /// Whether `type_tag` is registered and may sit in the top-level list.
    pub fn accepts_at_root(&self, type_tag: &str) -> bool {
        self.find_descriptor(type_tag)
            .is_some_and(|descriptor| !descriptor.nested_only)
    }

    /// Type tags allowed at the top level, in catalog order.
    pub fn root_types(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .filter(|descriptor| !descriptor.nested_only)
            .map(|descriptor| descriptor.type_tag.as_str())
            .collect()
    }

    /// Category names in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for descriptor in &self.descriptors {
            if !categories.contains(&descriptor.category.as_str()) {
                categories.push(&descriptor.category);
            }
        }
        categories
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Blocks available to the landing page builder.
    pub fn page_blocks() -> Self {
        Self {
            descriptors: vec![
                ElementTypeDescriptor::new(
                    "heading",
                    "Heading",
                    "H",
                    "Basic",
                    json!({ "text": "Your Headline Here", "level": 1, "align": "center" }),
                ),
                ElementTypeDescriptor::new(
                    "text",
                    "Text",
                    "¶",
                    "Basic",
                    json!({ "content": "Add your text here...", "align": "left" }),
                ),
                ElementTypeDescriptor::new(
                    "button",
                    "Button",
                    "▭",
                    "Basic",
                    json!({ "label": "Click Here", "url": "#", "style": "primary" }),
                ),
                ElementTypeDescriptor::new(
                    "divider",
                    "Divider",
                    "—",
                    "Layout",
                    json!({ "thickness": 1 }),
                ),
                ElementTypeDescriptor::new(
                    "spacer",
                    "Spacer",
                    "↕",
                    "Layout",
                    json!({ "height": 40 }),
                ),
                ElementTypeDescriptor::new(
                    "image",
                    "Image",
                    "🖼",
                    "Media",
                    json!({ "src": "", "alt": "Image", "width": 100 }),
                ),
                ElementTypeDescriptor::new(
                    "video",
                    "Video",
                    "▶",
                    "Media",
                    json!({ "url": "", "autoplay": false }),
                ),
                ElementTypeDescriptor::new(
                    "form",
                    "Opt-in Form",
                    "✉",
                    "Forms",
                    json!({
                        "title": "Get Instant Access",
                        "fields": ["name", "email"],
                        "submit_label": "Submit"
                    }),
                ),
                ElementTypeDescriptor::new(
                    "countdown",
                    "Countdown",
                    "⏱",
                    "Marketing",
                    json!({ "title": "Offer ends in", "target_date": "" }),
                ),
                ElementTypeDescriptor::new(
                    "testimonial",
                    "Testimonial",
                    "❝",
                    "Marketing",
                    json!({
                        "quote": "This changed how we run our launches.",
                        "author": "Happy Customer",
                        "role": ""
                    }),
                ),
            ],
        }
    }

    /// Modules and lessons available to the course builder.
    pub fn course_outline() -> Self {
        const LESSONS: &[&str] = &["video_lesson", "text_lesson", "quiz", "assignment"];

        Self {
            descriptors: vec![
                ElementTypeDescriptor::new(
                    "module",
                    "Module",
                    "📁",
                    "Structure",
                    json!({ "title": "New Module", "description": "" }),
                )
                .with_child_types(LESSONS),
                ElementTypeDescriptor::new(
                    "video_lesson",
                    "Video Lesson",
                    "▶",
                    "Lessons",
                    json!({
                        "title": "New Video Lesson",
                        "video_url": "",
                        "duration_minutes": 10,
                        "is_preview": false
                    }),
                )
                .nested_only(),
                ElementTypeDescriptor::new(
                    "text_lesson",
                    "Text Lesson",
                    "📄",
                    "Lessons",
                    json!({ "title": "New Text Lesson", "content": "" }),
                )
                .nested_only(),
                ElementTypeDescriptor::new(
                    "quiz",
                    "Quiz",
                    "?",
                    "Assessments",
                    json!({ "title": "New Quiz", "questions": [], "passing_score": 70 }),
                )
                .nested_only(),
                ElementTypeDescriptor::new(
                    "assignment",
                    "Assignment",
                    "✎",
                    "Assessments",
                    json!({ "title": "New Assignment", "instructions": "", "due_days": 7 }),
                )
                .nested_only(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_catalogs_are_valid() {
        for registry in [ElementRegistry::page_blocks(), ElementRegistry::course_outline()] {
            let descriptors = registry.list_descriptors(None).into_iter().cloned().collect();
            assert!(ElementRegistry::new(descriptors).is_ok());
        }
    }

    #[test]
    fn filters_by_category() {
        let registry = ElementRegistry::page_blocks();
        let media: Vec<&str> = registry
            .list_descriptors(Some("Media"))
            .iter()
            .map(|descriptor| descriptor.type_tag.as_str())
            .collect();
        assert_eq!(media, vec!["image", "video"]);
        assert!(registry.list_descriptors(Some("Nope")).is_empty());
    }

    #[test]
    fn unknown_tag_is_not_found() {
        let registry = ElementRegistry::page_blocks();
        assert!(registry.find_descriptor("heading").is_some());
        assert!(registry.find_descriptor("carousel").is_none());
    }

    #[test]
    fn categories_keep_catalog_order() {
        let registry = ElementRegistry::page_blocks();
        assert_eq!(
            registry.categories(),
            vec!["Basic", "Layout", "Media", "Forms", "Marketing"]
        );
    }

    #[test]
    fn modules_accept_lessons_only() {
        let registry = ElementRegistry::course_outline();
        let module = registry.find_descriptor("module").unwrap();
        assert!(module.is_container());
        assert!(module.accepts_child("quiz"));
        assert!(!module.accepts_child("module"));
    }

    #[test]
    fn rejects_bad_catalogs() {
        assert!(matches!(ElementRegistry::new(Vec::new()), Err(RegistryError::Empty)));

        let json = r#"[
            {"type_tag": "a", "label": "A", "category": "x"},
            {"type_tag": "a", "label": "A again", "category": "x"}
        ]"#;
        assert!(matches!(
            ElementRegistry::from_json(json),
            Err(RegistryError::DuplicateTypeTag(tag)) if tag == "a"
        ));

        let json = r#"[{"type_tag": "a", "label": "A", "category": "x", "default_properties": 3}]"#;
        assert!(matches!(
            ElementRegistry::from_json(json),
            Err(RegistryError::InvalidDefaults { .. })
        ));

        assert!(matches!(ElementRegistry::from_json("{"), Err(RegistryError::Parse(_))));
    }

    #[test]
    fn parses_catalog_json() {
        let json = r#"[
            {"type_tag": "banner", "label": "Banner", "icon": "B", "category": "Hero",
             "default_properties": {"text": "Hi"}},
            {"type_tag": "section", "label": "Section", "category": "Layout",
             "child_types": ["banner"]}
        ]"#;
        let registry = ElementRegistry::from_json(json).unwrap();
        assert_eq!(registry.len(), 2);
        let banner = registry.find_descriptor("banner").unwrap();
        assert_eq!(banner.default_properties["text"], "Hi");
        assert!(registry.find_descriptor("section").unwrap().accepts_child("banner"));
    }

    #[test]
    fn lessons_stay_inside_modules() {
        let registry = ElementRegistry::course_outline();
        assert_eq!(registry.root_types(), vec!["module"]);
        assert!(registry.accepts_at_root("module"));
        assert!(!registry.accepts_at_root("quiz"));
        assert!(!registry.accepts_at_root("carousel"));

        let page = ElementRegistry::page_blocks();
        assert_eq!(page.root_types().len(), page.len());
    }

    #[test]
    fn catalog_can_mark_nested_only_types() {
        let json = r#"[
            {"type_tag": "slide", "label": "Slide", "category": "x", "nested_only": true},
            {"type_tag": "deck", "label": "Deck", "category": "x", "child_types": ["slide"]}
        ]"#;
        let registry = ElementRegistry::from_json(json).unwrap();
        assert_eq!(registry.root_types(), vec!["deck"]);

        let json = r#"[{"type_tag": "slide", "label": "Slide", "category": "x", "nested_only": true}]"#;
        assert!(matches!(
            ElementRegistry::from_json(json),
            Err(RegistryError::NoRootTypes)
        ));
    }
}
