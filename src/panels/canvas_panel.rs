use egui::{Align, Align2, FontId, Layout, RichText, Sense, Stroke};

use crate::drag::{DragPayload, DropTarget};
use crate::editor::Editor;
use crate::element::Element;
use crate::id_generator::ElementId;
use crate::registry::ElementRegistry;
use crate::renderer::{RenderNode, TextAlign, render_with};
use crate::selection::EditSession;

/// User intent collected while the canvas is drawn and applied afterwards,
/// once the immutable borrow of the document has ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    Select(ElementId),
    Duplicate(ElementId),
    Remove(ElementId),
    SetLocked(ElementId, bool),
    BeginDrag(DragPayload),
    Drop(DropTarget),
}

pub fn canvas_panel(ui: &mut egui::Ui, editor: &mut Editor, preview: bool) {
    if preview {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for element in editor.elements() {
                    paint_node(ui, &render_with(element, editor.registry()));
                    ui.add_space(8.0);
                }
            });
        return;
    }

    let mut actions = Vec::new();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let session = editor.session();
            let registry = editor.registry();
            for element in editor.elements() {
                element_card(ui, element, registry, session, &mut actions);
            }
            canvas_drop_zone(ui, editor.elements().is_empty(), &mut actions);
        });

    for action in actions {
        apply(ui.ctx(), editor, action);
    }
}

fn apply(ctx: &egui::Context, editor: &mut Editor, action: CanvasAction) {
    log::debug!("Canvas action: {:?}", action);
    match action {
        CanvasAction::Select(id) => {
            editor.select(&id);
        }
        CanvasAction::Duplicate(id) => {
            editor.duplicate(&id);
        }
        CanvasAction::Remove(id) => {
            if !editor.remove(&id) {
                log::warn!("Element {} was not removed", id);
            }
        }
        CanvasAction::SetLocked(id, locked) => {
            editor.set_locked(&id, locked);
        }
        CanvasAction::BeginDrag(payload) => {
            if let Err(err) = editor.begin_drag(payload) {
                log::warn!("Drag refused: {}", err);
                egui::DragAndDrop::clear_payload(ctx);
            }
        }
        CanvasAction::Drop(target) => {
            editor.drop_on(Some(target));
        }
    }
}

fn element_card(
    ui: &mut egui::Ui,
    element: &Element,
    registry: &ElementRegistry,
    session: &EditSession,
    actions: &mut Vec<CanvasAction>,
) {
    let selected = session.is_selected(&element.id);
    let stroke = if selected {
        ui.visuals().selection.stroke
    } else {
        ui.visuals().widgets.noninteractive.bg_stroke
    };

    let card = egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.horizontal(|ui| {
            if element.locked {
                ui.label("🔒").on_hover_text("Locked");
            } else {
                let payload = DragPayload::ExistingElement(element.id.clone());
                let handle = ui
                    .dnd_drag_source(
                        egui::Id::new(("element", element.id.as_str())),
                        payload.clone(),
                        |ui| ui.label("☰"),
                    )
                    .response;
                if handle.drag_started() {
                    actions.push(CanvasAction::BeginDrag(payload));
                }
            }

            if ui.selectable_label(selected, element.title()).clicked() {
                actions.push(CanvasAction::Select(element.id.clone()));
            }
            ui.weak(element.type_tag());

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let remove = ui.add_enabled(!element.locked, egui::Button::new("🗑").small());
                if remove.on_hover_text("Delete").clicked() {
                    actions.push(CanvasAction::Remove(element.id.clone()));
                }
                if ui.small_button("⧉").on_hover_text("Duplicate").clicked() {
                    actions.push(CanvasAction::Duplicate(element.id.clone()));
                }
                let lock_hint = if element.locked { "Unlock" } else { "Lock" };
                if ui.small_button("🔐").on_hover_text(lock_hint).clicked() {
                    actions.push(CanvasAction::SetLocked(element.id.clone(), !element.locked));
                }
            });
        });

        let node = render_with(element, registry);
        let accepts_children = registry
            .find_descriptor(element.type_tag())
            .is_some_and(|descriptor| descriptor.is_container());
        if accepts_children || !element.children.is_empty() {
            paint_container_header(ui, &node);
            for child in &element.children {
                element_card(ui, child, registry, session, actions);
            }
            if accepts_children {
                container_drop_zone(ui, &element.id, actions);
            }
        } else {
            paint_node(ui, &node);
        }
    });

    // Children ran first, so a release over a nested card is claimed there.
    let response = card.response;
    if response.dnd_hover_payload::<DragPayload>().is_some() {
        let rect = response.rect;
        ui.painter().hline(
            rect.x_range(),
            rect.top() - 2.0,
            Stroke::new(2.0, ui.visuals().selection.stroke.color),
        );
    }
    if response.dnd_release_payload::<DragPayload>().is_some() {
        actions.push(CanvasAction::Drop(DropTarget::Element(element.id.clone())));
    }
}

fn container_drop_zone(ui: &mut egui::Ui, parent: &ElementId, actions: &mut Vec<CanvasAction>) {
    let size = egui::vec2(ui.available_width(), 28.0);
    let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
    let hovered = response.dnd_hover_payload::<DragPayload>().is_some();
    paint_drop_zone(ui, rect, hovered, "Drop here to add inside");
    if response.dnd_release_payload::<DragPayload>().is_some() {
        actions.push(CanvasAction::Drop(DropTarget::Container(parent.clone())));
    }
}

fn canvas_drop_zone(ui: &mut egui::Ui, empty: bool, actions: &mut Vec<CanvasAction>) {
    ui.add_space(8.0);
    let height = ui.available_height().clamp(80.0, 240.0);
    let size = egui::vec2(ui.available_width(), height);
    let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
    let hovered = response.dnd_hover_payload::<DragPayload>().is_some();
    let hint = if empty {
        "Drag elements here to start building"
    } else {
        "Drop here to add at the end"
    };
    paint_drop_zone(ui, rect, hovered, hint);
    if response.dnd_release_payload::<DragPayload>().is_some() {
        actions.push(CanvasAction::Drop(DropTarget::Canvas));
    }
}

fn paint_drop_zone(ui: &egui::Ui, rect: egui::Rect, hovered: bool, hint: &str) {
    let visuals = ui.visuals();
    let color = if hovered {
        visuals.selection.stroke.color
    } else {
        visuals.weak_text_color()
    };
    let painter = ui.painter();
    if hovered {
        painter.rect_filled(rect.shrink(2.0), 6.0, visuals.selection.bg_fill.gamma_multiply(0.3));
    }
    painter.rect_stroke(rect.shrink(2.0), 6.0, Stroke::new(1.0, color));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        hint,
        FontId::proportional(13.0),
        color,
    );
}

fn paint_section_header(ui: &mut egui::Ui, title: &str, description: &str) {
    ui.label(RichText::new(title).size(18.0).strong());
    if !description.is_empty() {
        ui.weak(description);
    }
}

/// Header part of a container node; its children are drawn as cards.
fn paint_container_header(ui: &mut egui::Ui, node: &RenderNode) {
    match node {
        RenderNode::Section {
            title, description, ..
        } => paint_section_header(ui, title, description),
        RenderNode::Block {
            icon,
            label,
            fields,
            ..
        } => paint_block_header(ui, icon, label, fields),
        other => paint_node(ui, other),
    }
}

fn paint_block_header(ui: &mut egui::Ui, icon: &str, label: &str, fields: &[(String, String)]) {
    ui.label(RichText::new(format!("{}  {}", icon, label)).strong());
    for (key, value) in fields {
        ui.horizontal(|ui| {
            ui.weak(key);
            ui.label(value);
        });
    }
}

fn layout_for(align: &TextAlign) -> Layout {
    let align = match align {
        TextAlign::Left => Align::Min,
        TextAlign::Center => Align::Center,
        TextAlign::Right => Align::Max,
    };
    Layout::top_down(align)
}

/// Draws a render node with plain egui widgets.
pub fn paint_node(ui: &mut egui::Ui, node: &RenderNode) {
    match node {
        RenderNode::Heading { text, level, align } => {
            const SIZES: [f32; 6] = [32.0, 26.0, 22.0, 18.0, 16.0, 14.0];
            let size = SIZES[usize::from(level.saturating_sub(1)).min(SIZES.len() - 1)];
            ui.with_layout(layout_for(align), |ui| {
                ui.label(RichText::new(text).size(size).strong());
            });
        }
        RenderNode::Paragraph { text, align } => {
            ui.with_layout(layout_for(align), |ui| {
                ui.add(egui::Label::new(text).wrap());
            });
        }
        RenderNode::Button {
            label,
            url,
            primary,
        } => {
            let mut button = egui::Button::new(label);
            if *primary {
                button = button.fill(ui.visuals().selection.bg_fill);
            }
            ui.add(button).on_hover_text(url);
        }
        RenderNode::Image {
            src,
            alt,
            width_percent,
        } => {
            let width = ui.available_width() * width_percent / 100.0;
            let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 120.0), Sense::hover());
            let visuals = ui.visuals();
            ui.painter().rect_filled(rect, 4.0, visuals.extreme_bg_color);
            let caption = if src.is_empty() {
                "No image selected".to_owned()
            } else {
                format!("🖼 {}", if alt.is_empty() { src } else { alt })
            };
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                caption,
                FontId::proportional(13.0),
                visuals.weak_text_color(),
            );
        }
        RenderNode::Video { url, autoplay } => {
            let size = egui::vec2(ui.available_width(), 140.0);
            let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
            ui.painter().rect_filled(rect, 4.0, egui::Color32::from_gray(24));
            let caption = match (url.is_empty(), autoplay) {
                (true, _) => "▶ No video URL".to_owned(),
                (false, true) => format!("▶ {} (autoplay)", url),
                (false, false) => format!("▶ {}", url),
            };
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                caption,
                FontId::proportional(14.0),
                egui::Color32::from_gray(220),
            );
        }
        RenderNode::Divider { thickness } => {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(ui.available_width(), thickness + 8.0), Sense::hover());
            ui.painter().hline(
                rect.x_range(),
                rect.center().y,
                Stroke::new(*thickness, ui.visuals().widgets.noninteractive.fg_stroke.color),
            );
        }
        RenderNode::Spacer { height } => {
            ui.allocate_space(egui::vec2(ui.available_width(), *height));
        }
        RenderNode::Form {
            title,
            fields,
            submit_label,
        } => {
            if !title.is_empty() {
                ui.strong(title);
            }
            for field in fields {
                ui.add_enabled(
                    false,
                    egui::TextEdit::singleline(&mut String::new()).hint_text(field.as_str()),
                );
            }
            ui.add_enabled(false, egui::Button::new(submit_label));
        }
        RenderNode::Countdown { title, target_date } => {
            ui.vertical_centered(|ui| {
                ui.strong(title);
                ui.label(RichText::new("00d 00h 00m 00s").size(24.0).monospace());
                if !target_date.is_empty() {
                    ui.weak(format!("until {}", target_date));
                }
            });
        }
        RenderNode::Quote {
            quote,
            author,
            role,
        } => {
            ui.label(RichText::new(format!("“{}”", quote)).italics());
            let byline = match (author.is_empty(), role.is_empty()) {
                (true, _) => String::new(),
                (false, true) => author.clone(),
                (false, false) => format!("{}, {}", author, role),
            };
            if !byline.is_empty() {
                ui.weak(byline);
            }
        }
        RenderNode::Section {
            title,
            description,
            children,
        } => {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                paint_section_header(ui, title, description);
                for child in children {
                    ui.indent(ui.next_auto_id(), |ui| paint_node(ui, child));
                }
            });
        }
        RenderNode::Lesson {
            kind,
            title,
            detail,
            preview,
        } => {
            ui.horizontal(|ui| {
                ui.label(kind.icon());
                ui.label(title);
                if !detail.is_empty() {
                    ui.weak(detail);
                }
                if *preview {
                    ui.label(RichText::new("Preview").small().color(ui.visuals().hyperlink_color));
                }
            });
        }
        RenderNode::Block {
            icon,
            label,
            fields,
            container,
            children,
        } => {
            if *container {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    paint_block_header(ui, icon, label, fields);
                    for child in children {
                        ui.indent(ui.next_auto_id(), |ui| paint_node(ui, child));
                    }
                });
            } else {
                paint_block_header(ui, icon, label, fields);
            }
        }
        RenderNode::Unknown { type_tag } => {
            ui.colored_label(
                ui.visuals().warn_fg_color,
                format!("⚠ Unknown element type \"{}\"", type_tag),
            );
        }
    }
}
