use crate::config::BuilderKind;
use crate::editor::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    SwitchBuilder(BuilderKind),
    Undo,
    Redo,
    Save,
    LoadSaved,
    Clear,
    TogglePreview,
    Back,
    Complete,
}

/// Top bar: builder switch, history, document actions and flow navigation.
/// Save and Load only show when snapshot files can be written. Returns
/// what was clicked; the app carries it out.
pub fn toolbar(
    ui: &mut egui::Ui,
    active: BuilderKind,
    editor: &Editor,
    preview: bool,
    file_storage: bool,
) -> Vec<ToolbarAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        if ui.button("⬅ Back").clicked() {
            actions.push(ToolbarAction::Back);
        }
        ui.separator();

        for kind in BuilderKind::ALL {
            if ui.selectable_label(kind == active, kind.label()).clicked() && kind != active {
                actions.push(ToolbarAction::SwitchBuilder(kind));
            }
        }
        ui.separator();

        let history = editor.history();
        let undo_hint = history
            .undo_stack()
            .last()
            .map(|command| format!("Undo {}", command.label()))
            .unwrap_or_else(|| "Nothing to undo".to_owned());
        let redo_hint = history
            .redo_stack()
            .last()
            .map(|command| format!("Redo {}", command.label()))
            .unwrap_or_else(|| "Nothing to redo".to_owned());
        if ui
            .add_enabled(history.can_undo(), egui::Button::new("⟲ Undo"))
            .on_hover_text(undo_hint)
            .clicked()
        {
            actions.push(ToolbarAction::Undo);
        }
        if ui
            .add_enabled(history.can_redo(), egui::Button::new("⟳ Redo"))
            .on_hover_text(redo_hint)
            .clicked()
        {
            actions.push(ToolbarAction::Redo);
        }
        ui.separator();

        if file_storage {
            if ui.button("💾 Save").clicked() {
                actions.push(ToolbarAction::Save);
            }
            if ui.button("📂 Load").on_hover_text("Reload the last save").clicked() {
                actions.push(ToolbarAction::LoadSaved);
            }
        }
        if ui
            .add_enabled(!editor.elements().is_empty(), egui::Button::new("🗑 Clear"))
            .clicked()
        {
            actions.push(ToolbarAction::Clear);
        }
        if ui.selectable_label(preview, "👁 Preview").clicked() {
            actions.push(ToolbarAction::TogglePreview);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Complete ✔").clicked() {
                actions.push(ToolbarAction::Complete);
            }
            ui.weak(format!("{} elements", editor.store().total_len()));
        });
    });

    actions
}
