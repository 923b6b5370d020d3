use crate::drag::DragPayload;
use crate::editor::Editor;

/// Left panel listing every registry entry as a drag source, grouped by
/// category. The "+" button appends without dragging; types that only live
/// inside a container have it disabled.
pub fn palette_panel(ui: &mut egui::Ui, editor: &mut Editor) {
    ui.heading("Elements");
    ui.weak("Drag onto the canvas");
    ui.separator();

    let registry = editor.store().shared_registry();
    let mut started: Option<DragPayload> = None;
    let mut appended: Option<String> = None;

    egui::ScrollArea::vertical().show(ui, |ui| {
        for category in registry.categories() {
            egui::CollapsingHeader::new(category)
                .default_open(true)
                .show(ui, |ui| {
                    for descriptor in registry.list_descriptors(Some(category)) {
                        let payload = DragPayload::NewFromRegistry(descriptor.type_tag.clone());
                        let source_id = egui::Id::new(("palette", descriptor.type_tag.as_str()));

                        let response = ui
                            .dnd_drag_source(source_id, payload.clone(), |ui| {
                                egui::Frame::group(ui.style()).show(ui, |ui| {
                                    ui.set_min_width(ui.available_width());
                                    ui.horizontal(|ui| {
                                        ui.label(format!("{}  {}", descriptor.icon, descriptor.label));
                                        ui.with_layout(
                                            egui::Layout::right_to_left(egui::Align::Center),
                                            |ui| {
                                                let at_root = registry.accepts_at_root(&descriptor.type_tag);
                                                let button = ui
                                                    .add_enabled(at_root, egui::Button::new("+").small())
                                                    .on_hover_text("Append")
                                                    .on_disabled_hover_text("Drag into a container");
                                                if button.clicked() {
                                                    appended = Some(descriptor.type_tag.clone());
                                                }
                                            },
                                        );
                                    });
                                });
                            })
                            .response;

                        if response.drag_started() {
                            started = Some(payload);
                        }
                    }
                });
        }
    });

    if let Some(payload) = started {
        if let Err(err) = editor.begin_drag(payload) {
            log::warn!("Palette drag refused: {}", err);
        }
    }
    if let Some(type_tag) = appended {
        log::info!("Appending {} from palette", type_tag);
        editor.append(&type_tag);
    }
}
