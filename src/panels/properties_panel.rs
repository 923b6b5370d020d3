use serde_json::Value;

use crate::editor::Editor;
use crate::element::Properties;

/// Keys edited in a multi-line box.
const MULTILINE_KEYS: [&str; 4] = ["content", "description", "instructions", "quote"];

/// Right panel editing the selected element's properties. Each edited value
/// is sent as a single-key update so untouched keys stay as they are.
pub fn properties_panel(ui: &mut egui::Ui, editor: &mut Editor) {
    let Some(element) = editor.selected_element() else {
        ui.weak("Select an element to edit it");
        return;
    };
    let id = element.id.clone();
    let mut properties = element.properties.clone();
    let mut locked = element.locked;
    let label = editor
        .registry()
        .find_descriptor(element.type_tag())
        .map(|descriptor| format!("{} {}", descriptor.icon, descriptor.label))
        .unwrap_or_else(|| format!("Unknown ({})", element.type_tag()));

    ui.horizontal(|ui| {
        ui.heading(label);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("✖").on_hover_text("Close").clicked() {
                editor.close_editor();
            }
        });
    });
    ui.small(id.as_str());
    ui.separator();

    let mut changes = Properties::new();
    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("element_properties")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .striped(true)
            .show(ui, |ui| {
                for (key, value) in properties.iter_mut() {
                    ui.label(key);
                    if edit_value(ui, key, value) {
                        changes.insert(key.clone(), value.clone());
                    }
                    ui.end_row();
                }
            });
    });

    ui.separator();
    if ui.checkbox(&mut locked, "Locked").changed() {
        editor.set_locked(&id, locked);
    }
    if !changes.is_empty() {
        editor.update(&id, changes);
    }
}

/// Draws the widget matching the value's JSON type. Returns whether the
/// user changed it.
fn edit_value(ui: &mut egui::Ui, key: &str, value: &mut Value) -> bool {
    match value {
        Value::String(text) => {
            let response = if MULTILINE_KEYS.contains(&key) {
                ui.add(egui::TextEdit::multiline(text).desired_rows(3))
            } else {
                ui.text_edit_singleline(text)
            };
            response.changed()
        }
        Value::Bool(flag) => ui.checkbox(flag, "").changed(),
        Value::Number(number) => {
            let integral = number.is_i64() || number.is_u64();
            let mut current = number.as_f64().unwrap_or_default();
            let speed = if integral { 1.0 } else { 0.1 };
            let changed = ui
                .add(egui::DragValue::new(&mut current).speed(speed))
                .changed();
            if changed {
                *value = if integral {
                    Value::from(current.round() as i64)
                } else {
                    serde_json::Number::from_f64(current)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                };
            }
            changed
        }
        Value::Array(items) if items.iter().all(Value::is_string) => {
            let mut joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let changed = ui
                .text_edit_singleline(&mut joined)
                .on_hover_text("Comma separated")
                .changed();
            if changed {
                *value = Value::Array(
                    joined
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(|item| Value::String(item.to_owned()))
                        .collect(),
                );
            }
            changed
        }
        other => {
            ui.monospace(other.to_string());
            false
        }
    }
}
