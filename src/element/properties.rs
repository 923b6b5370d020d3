use serde_json::{Map, Value};

/// Property payload of an element. The store treats it as opaque.
pub type Properties = Map<String, Value>;

/// Shallow merge: every key in `changes` replaces the existing value whole.
/// Nested objects are not merged.
pub fn merge_properties(target: &mut Properties, changes: Properties) {
    for (key, value) in changes {
        target.insert(key, value);
    }
}

/// Typed reads with sensible fallbacks, used by the renderer and panels.
pub trait PropertyExt {
    fn str_value(&self, key: &str) -> Option<&str>;
    fn str_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str;
    fn f64_or(&self, key: &str, fallback: f64) -> f64;
    fn bool_or(&self, key: &str, fallback: bool) -> bool;
    fn string_list(&self, key: &str) -> Vec<String>;
}

impl PropertyExt for Properties {
    fn str_value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn str_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.str_value(key).unwrap_or(fallback)
    }

    fn f64_or(&self, key: &str, fallback: f64) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(fallback)
    }

    fn bool_or(&self, key: &str, fallback: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(fallback)
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn merge_replaces_nested_objects_whole() {
        let mut target = props(json!({ "style": { "color": "red", "size": 12 }, "text": "Hi" }));
        merge_properties(&mut target, props(json!({ "style": { "color": "blue" } })));

        assert_eq!(target["style"], json!({ "color": "blue" }));
        assert_eq!(target["text"], "Hi");
    }

    #[test]
    fn merge_adds_new_keys() {
        let mut target = Properties::new();
        merge_properties(&mut target, props(json!({ "level": 2 })));
        assert_eq!(target.f64_or("level", 1.0), 2.0);
    }

    #[test]
    fn typed_reads_fall_back() {
        let properties = props(json!({ "fields": ["name", 3], "autoplay": true }));
        assert_eq!(properties.string_list("fields"), vec!["name", "3"]);
        assert!(properties.bool_or("autoplay", false));
        assert_eq!(properties.str_or("url", "#"), "#");
        assert!(properties.string_list("missing").is_empty());
    }
}
