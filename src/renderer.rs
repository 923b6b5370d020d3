//! Pure mapping from an element to a description of what to draw.
//!
//! Rendering never touches the store. Catalog types without a dedicated
//! renderer draw as a generic block built from their descriptor; tags the
//! registry does not know produce a visible placeholder so a partly
//! corrupted document still shows everything else.

use serde_json::Value;

use crate::element::{Element, Properties, PropertyExt};
use crate::registry::ElementRegistry;

#[derive(Debug, Clone, PartialEq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    fn parse(value: &str) -> Self {
        match value {
            "center" => Self::Center,
            "right" => Self::Right,
            _ => Self::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Heading {
        text: String,
        level: u8,
        align: TextAlign,
    },
    Paragraph {
        text: String,
        align: TextAlign,
    },
    Button {
        label: String,
        url: String,
        primary: bool,
    },
    Image {
        src: String,
        alt: String,
        width_percent: f32,
    },
    Video {
        url: String,
        autoplay: bool,
    },
    Divider {
        thickness: f32,
    },
    Spacer {
        height: f32,
    },
    Form {
        title: String,
        fields: Vec<String>,
        submit_label: String,
    },
    Countdown {
        title: String,
        target_date: String,
    },
    Quote {
        quote: String,
        author: String,
        role: String,
    },
    /// Container with its own rendered children.
    Section {
        title: String,
        description: String,
        children: Vec<RenderNode>,
    },
    Lesson {
        kind: LessonKind,
        title: String,
        detail: String,
        preview: bool,
    },
    /// Registered type without a dedicated renderer: its label and scalar
    /// properties, plus children when it is a container.
    Block {
        icon: String,
        label: String,
        fields: Vec<(String, String)>,
        container: bool,
        children: Vec<RenderNode>,
    },
    Unknown {
        type_tag: String,
    },
}

impl RenderNode {
    pub fn children(&self) -> &[RenderNode] {
        match self {
            Self::Section { children, .. } | Self::Block { children, .. } => children,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonKind {
    Video,
    Text,
    Quiz,
    Assignment,
}

impl LessonKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Video => "▶",
            Self::Text => "📄",
            Self::Quiz => "?",
            Self::Assignment => "✎",
        }
    }
}

/// Renders with the built-in renderers only.
pub fn render(element: &Element) -> RenderNode {
    render_node(element, None)
}

/// Renders an element of a document built on `registry`; catalog types with
/// no built-in renderer fall back to a generic block.
pub fn render_with(element: &Element, registry: &ElementRegistry) -> RenderNode {
    render_node(element, Some(registry))
}

fn render_node(element: &Element, registry: Option<&ElementRegistry>) -> RenderNode {
    let props = &element.properties;
    let children = || -> Vec<RenderNode> {
        element
            .children
            .iter()
            .map(|child| render_node(child, registry))
            .collect()
    };
    match element.type_tag() {
        "heading" => RenderNode::Heading {
            text: props.str_or("text", "").to_owned(),
            level: props.f64_or("level", 1.0).clamp(1.0, 6.0) as u8,
            align: TextAlign::parse(props.str_or("align", "left")),
        },
        "text" => RenderNode::Paragraph {
            text: props.str_or("content", "").to_owned(),
            align: TextAlign::parse(props.str_or("align", "left")),
        },
        "button" => RenderNode::Button {
            label: props.str_or("label", "Button").to_owned(),
            url: props.str_or("url", "#").to_owned(),
            primary: props.str_or("style", "primary") == "primary",
        },
        "image" => RenderNode::Image {
            src: props.str_or("src", "").to_owned(),
            alt: props.str_or("alt", "").to_owned(),
            width_percent: props.f64_or("width", 100.0).clamp(1.0, 100.0) as f32,
        },
        "video" => RenderNode::Video {
            url: props.str_or("url", "").to_owned(),
            autoplay: props.bool_or("autoplay", false),
        },
        "divider" => RenderNode::Divider {
            thickness: props.f64_or("thickness", 1.0).max(0.0) as f32,
        },
        "spacer" => RenderNode::Spacer {
            height: props.f64_or("height", 40.0).max(0.0) as f32,
        },
        "form" => RenderNode::Form {
            title: props.str_or("title", "").to_owned(),
            fields: props.string_list("fields"),
            submit_label: props.str_or("submit_label", "Submit").to_owned(),
        },
        "countdown" => RenderNode::Countdown {
            title: props.str_or("title", "").to_owned(),
            target_date: props.str_or("target_date", "").to_owned(),
        },
        "testimonial" => RenderNode::Quote {
            quote: props.str_or("quote", "").to_owned(),
            author: props.str_or("author", "").to_owned(),
            role: props.str_or("role", "").to_owned(),
        },
        "module" => RenderNode::Section {
            title: props.str_or("title", "Module").to_owned(),
            description: props.str_or("description", "").to_owned(),
            children: children(),
        },
        "video_lesson" => {
            let minutes = props.f64_or("duration_minutes", 0.0);
            RenderNode::Lesson {
                kind: LessonKind::Video,
                title: props.str_or("title", "").to_owned(),
                detail: format!("{} min", minutes),
                preview: props.bool_or("is_preview", false),
            }
        }
        "text_lesson" => RenderNode::Lesson {
            kind: LessonKind::Text,
            title: props.str_or("title", "").to_owned(),
            detail: String::new(),
            preview: false,
        },
        "quiz" => RenderNode::Lesson {
            kind: LessonKind::Quiz,
            title: props.str_or("title", "").to_owned(),
            detail: format!(
                "{} questions, pass at {}%",
                props.string_list("questions").len(),
                props.f64_or("passing_score", 70.0)
            ),
            preview: false,
        },
        "assignment" => RenderNode::Lesson {
            kind: LessonKind::Assignment,
            title: props.str_or("title", "").to_owned(),
            detail: format!("due in {} days", props.f64_or("due_days", 7.0)),
            preview: false,
        },
        other => match registry.and_then(|registry| registry.find_descriptor(other)) {
            Some(descriptor) => {
                let container = descriptor.is_container() || !element.children.is_empty();
                RenderNode::Block {
                    icon: descriptor.icon.clone(),
                    label: descriptor.label.clone(),
                    fields: scalar_fields(props),
                    container,
                    children: if container { children() } else { Vec::new() },
                }
            }
            None => RenderNode::Unknown {
                type_tag: other.to_owned(),
            },
        },
    }
}

fn scalar_fields(props: &Properties) -> Vec<(String, String)> {
    props
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}
