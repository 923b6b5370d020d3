use std::sync::Arc;

use crate::config::{BuilderKind, ConfigError, EditorConfig};
use crate::editor::{Editor, FlowHandler};
use crate::element::Element;
use crate::event::EventLog;
use crate::panels::{self, ToolbarAction};
use crate::persistence::StatePersistence;

/// Recent events kept for the activity panel.
const ACTIVITY_CAPACITY: usize = 50;

/// What survives an app restart through eframe storage.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PersistedState {
    pub builder: Option<BuilderKind>,
    pub page: Vec<Element>,
    pub course: Vec<Element>,
}

/// One builder's document with its editing machinery and snapshot storage.
#[derive(Debug)]
pub struct Workspace {
    kind: BuilderKind,
    editor: Editor,
    persistence: StatePersistence,
}

impl Workspace {
    pub fn open(
        config: &EditorConfig,
        kind: BuilderKind,
        elements: Vec<Element>,
        activity: &EventLog,
    ) -> Result<Self, ConfigError> {
        let registry = Arc::new(config.registry_for(kind)?);
        let editor =
            Editor::with_elements(registry, elements).with_history_limit(config.history_limit);
        editor.subscribe(Box::new(activity.clone()));
        log::info!(
            "{} ready with {} elements",
            kind.label(),
            editor.store().total_len()
        );
        Ok(Self {
            kind,
            editor,
            persistence: StatePersistence::from_config(config, kind),
        })
    }

    pub fn kind(&self) -> BuilderKind {
        self.kind
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }
}

/// Records flow navigation as a status message.
struct StatusFlow<'a> {
    status: &'a mut Option<String>,
}

impl FlowHandler for StatusFlow<'_> {
    fn on_complete(&mut self, elements: &[Element]) {
        *self.status = Some(format!("Completed with {} top-level elements", elements.len()));
    }

    fn on_back(&mut self) {
        *self.status = Some("Back to the overview".to_owned());
    }
}

pub struct BuilderApp {
    active: BuilderKind,
    page: Workspace,
    course: Workspace,
    preview: bool,
    show_activity: bool,
    activity: EventLog,
    status: Option<String>,
    /// Snapshot files are only reachable natively; the web build keeps its
    /// documents in eframe storage alone.
    file_storage: bool,
}

impl BuilderApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Result<Self, ConfigError> {
        let restored = cc
            .storage
            .and_then(|storage| eframe::get_value::<PersistedState>(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::from_state(config, restored)
    }

    /// Builds the app without a window, from configuration and restored state.
    pub fn from_state(config: EditorConfig, restored: PersistedState) -> Result<Self, ConfigError> {
        let activity = EventLog::with_capacity(ACTIVITY_CAPACITY);
        let page = Workspace::open(&config, BuilderKind::Page, restored.page, &activity)?;
        let course = Workspace::open(&config, BuilderKind::Course, restored.course, &activity)?;
        Ok(Self {
            active: restored.builder.unwrap_or(config.builder),
            page,
            course,
            preview: false,
            show_activity: false,
            activity,
            status: None,
            file_storage: cfg!(not(target_arch = "wasm32")),
        })
    }

    pub fn active(&self) -> BuilderKind {
        self.active
    }

    pub fn workspace(&self) -> &Workspace {
        match self.active {
            BuilderKind::Page => &self.page,
            BuilderKind::Course => &self.course,
        }
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        match self.active {
            BuilderKind::Page => &mut self.page,
            BuilderKind::Course => &mut self.course,
        }
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            builder: Some(self.active),
            page: self.page.editor.elements().to_vec(),
            course: self.course.editor.elements().to_vec(),
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn switch_builder(&mut self, kind: BuilderKind) {
        if kind == self.active {
            return;
        }
        self.workspace_mut().editor.cancel_drag();
        log::info!("Switching to {}", kind.label());
        self.active = kind;
    }

    /// Carries out one toolbar action against the active workspace.
    pub fn handle_toolbar(&mut self, action: ToolbarAction) {
        log::debug!("Toolbar action: {:?}", action);
        match action {
            ToolbarAction::SwitchBuilder(kind) => self.switch_builder(kind),
            ToolbarAction::Undo => {
                if let Err(err) = self.workspace_mut().editor.undo() {
                    log::warn!("Undo failed: {}", err);
                }
            }
            ToolbarAction::Redo => {
                if let Err(err) = self.workspace_mut().editor.redo() {
                    log::warn!("Redo failed: {}", err);
                }
            }
            ToolbarAction::Save | ToolbarAction::LoadSaved if !self.file_storage => {
                log::warn!("{:?} needs file storage", action);
                self.status = Some("Saving to files is not available here".to_owned());
            }
            ToolbarAction::Save => self.save_document(),
            ToolbarAction::LoadSaved => self.load_document(),
            ToolbarAction::Clear => self.workspace_mut().editor.clear(),
            ToolbarAction::TogglePreview => self.preview = !self.preview,
            ToolbarAction::Back => {
                let workspace = match self.active {
                    BuilderKind::Page => &self.page,
                    BuilderKind::Course => &self.course,
                };
                workspace.editor.back(&mut StatusFlow {
                    status: &mut self.status,
                });
            }
            ToolbarAction::Complete => {
                if self.file_storage {
                    self.save_document();
                }
                let workspace = match self.active {
                    BuilderKind::Page => &self.page,
                    BuilderKind::Course => &self.course,
                };
                workspace.editor.complete(&mut StatusFlow {
                    status: &mut self.status,
                });
            }
        }
    }

    fn save_document(&mut self) {
        let workspace = self.workspace_mut();
        let Workspace {
            editor,
            persistence,
            ..
        } = workspace;
        let message = match editor.save(persistence) {
            Ok(()) => format!("Saved {}", persistence.document_name()),
            Err(err) => {
                log::error!("Save failed: {}", err);
                format!("Save failed: {}", err)
            }
        };
        self.status = Some(message);
    }

    fn load_document(&mut self) {
        let workspace = self.workspace_mut();
        let name = workspace.persistence.document_name();
        let message = match workspace.persistence.load_elements(name) {
            Ok(elements) => {
                let count = elements.len();
                workspace.editor.load(elements);
                format!("Loaded {} ({} top-level elements)", name, count)
            }
            Err(err) => {
                log::error!("Load failed: {}", err);
                format!("Load failed: {}", err)
            }
        };
        self.status = Some(message);
    }

    /// Ends a drag whose pointer was released outside every drop zone, or
    /// that the user aborted with Escape.
    fn settle_abandoned_drag(&mut self, ctx: &egui::Context) {
        let editor = &mut self.workspace_mut().editor;
        if !editor.drag_state().is_dragging() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            egui::DragAndDrop::clear_payload(ctx);
            editor.cancel_drag();
            return;
        }
        let released = !ctx.input(|i| i.pointer.any_down());
        if released && !egui::DragAndDrop::has_any_payload(ctx) {
            editor.drop_on(None);
        }
    }

    fn autosave(&mut self) {
        if !self.file_storage {
            return;
        }
        for workspace in [&mut self.page, &mut self.course] {
            if let Err(err) = workspace.persistence.try_autosave(workspace.editor.elements()) {
                log::error!("Autosave of {} failed: {}", workspace.kind.label(), err);
            }
        }
    }
}

impl eframe::App for BuilderApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.persisted_state());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.settle_abandoned_drag(ctx);

        let mut toolbar_actions = Vec::new();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            toolbar_actions = panels::toolbar(
                ui,
                self.active,
                &self.workspace().editor,
                self.preview,
                self.file_storage,
            );
            ui.add_space(4.0);
        });
        for action in toolbar_actions {
            self.handle_toolbar(action);
        }

        let drag_name = self.workspace().editor.drag_state().name();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.toggle_value(&mut self.show_activity, "Activity");
                if let Some(status) = &self.status {
                    ui.label(status);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(drag_name);
                });
            });
            if self.show_activity {
                egui::ScrollArea::vertical()
                    .max_height(160.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for event in self.activity.events() {
                            ui.monospace(format!("{:?}", event));
                        }
                    });
            }
        });

        if !self.preview {
            egui::SidePanel::left("palette_panel")
                .resizable(true)
                .default_width(200.0)
                .show(ctx, |ui| {
                    panels::palette_panel(ui, &mut self.workspace_mut().editor);
                });

            if self.workspace().editor.session().is_editor_open() {
                egui::SidePanel::right("properties_panel")
                    .resizable(true)
                    .default_width(280.0)
                    .show(ctx, |ui| {
                        panels::properties_panel(ui, &mut self.workspace_mut().editor);
                    });
            }
        }

        let preview = self.preview;
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::canvas_panel(ui, &mut self.workspace_mut().editor, preview);
        });

        self.autosave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restored_state_reopens_both_documents() {
        let mut app = BuilderApp::from_state(EditorConfig::default(), PersistedState::default()).unwrap();
        app.workspace_mut().editor_mut().append("heading");
        app.switch_builder(BuilderKind::Course);
        app.workspace_mut().editor_mut().append("module");

        let state = app.persisted_state();
        assert_eq!(state.builder, Some(BuilderKind::Course));

        let json = serde_json::to_string(&state).unwrap();
        let restored: PersistedState = serde_json::from_str(&json).unwrap();
        let app = BuilderApp::from_state(EditorConfig::default(), restored).unwrap();
        assert_eq!(app.active(), BuilderKind::Course);
        assert_eq!(app.workspace().editor().elements()[0].type_tag(), "module");
        assert_eq!(app.page.editor().elements()[0].type_tag(), "heading");
    }

    #[test]
    fn flow_actions_report_status() {
        let mut app = BuilderApp::from_state(EditorConfig::default(), PersistedState::default()).unwrap();
        app.handle_toolbar(ToolbarAction::Back);
        assert_eq!(app.status(), Some("Back to the overview"));
    }

    #[test]
    fn undo_on_fresh_document_keeps_it_empty() {
        let mut app = BuilderApp::from_state(EditorConfig::default(), PersistedState::default()).unwrap();
        app.handle_toolbar(ToolbarAction::Undo);
        assert!(app.workspace().editor().elements().is_empty());
    }

    #[test]
    fn without_file_storage_complete_skips_the_save() {
        let dir = std::env::temp_dir().join(format!("funnel_builder_{}", uuid::Uuid::new_v4().simple()));
        let config = EditorConfig {
            snapshot_dir: dir.clone(),
            ..EditorConfig::default()
        };
        let mut app = BuilderApp::from_state(config, PersistedState::default()).unwrap();
        app.file_storage = false;
        app.workspace_mut().editor_mut().append("heading");

        app.handle_toolbar(ToolbarAction::Save);
        assert_eq!(app.status(), Some("Saving to files is not available here"));
        app.handle_toolbar(ToolbarAction::LoadSaved);
        assert_eq!(app.workspace().editor().elements().len(), 1);

        app.handle_toolbar(ToolbarAction::Complete);
        assert_eq!(app.status(), Some("Completed with 1 top-level elements"));
        assert!(!dir.exists());
    }
}
