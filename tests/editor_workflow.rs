use std::sync::Arc;

use funnel_builder::command::CommandError;
use funnel_builder::event::{DocumentEvent, EditorEvent, EventLog};
use funnel_builder::{
    DragPayload, DragState, DropTarget, Editor, ElementId, ElementRegistry, Properties,
};
use serde_json::json;

fn page_editor() -> Editor {
    Editor::new(Arc::new(ElementRegistry::page_blocks()))
}

fn course_editor() -> Editor {
    Editor::new(Arc::new(ElementRegistry::course_outline()))
}

fn type_tags(editor: &Editor) -> Vec<&str> {
    editor
        .elements()
        .iter()
        .map(|element| element.type_tag())
        .collect()
}

#[test]
fn removing_the_selected_element_closes_the_session() {
    let mut editor = page_editor();
    let id = editor.append("heading").unwrap();
    editor.select(&id);
    assert!(editor.session().is_editor_open());

    editor.remove(&id);
    assert_eq!(editor.session().selected_id(), None);
    assert!(!editor.session().is_editor_open());
}

#[test]
fn removing_another_element_keeps_the_session() {
    let mut editor = page_editor();
    let kept = editor.append("heading").unwrap();
    let other = editor.append("text").unwrap();
    editor.select(&kept);

    editor.remove(&other);
    assert!(editor.session().is_selected(&kept));
    assert!(editor.session().is_editor_open());
}

#[test]
fn closing_the_editor_keeps_the_selection() {
    let mut editor = page_editor();
    let id = editor.append("button").unwrap();
    editor.select(&id);
    editor.close_editor();

    assert!(editor.session().is_selected(&id));
    assert!(!editor.session().is_editor_open());
    editor.open_editor();
    assert!(editor.session().is_editor_open());
}

#[test]
fn clear_resets_the_session() {
    let mut editor = page_editor();
    let id = editor.append("spacer").unwrap();
    editor.select(&id);

    editor.clear();
    assert!(editor.elements().is_empty());
    assert_eq!(editor.session().selected_id(), None);
}

#[test]
fn update_selected_merges_into_the_selected_element() {
    let mut editor = page_editor();
    let id = editor.append("heading").unwrap();
    editor.select(&id);

    let mut changes = Properties::new();
    changes.insert("text".into(), json!("Free masterclass"));
    assert!(editor.update_selected(changes));

    let element = editor.selected_element().unwrap();
    assert_eq!(element.properties["text"], json!("Free masterclass"));
    assert_eq!(element.properties["level"], json!(1));
}

#[test]
fn palette_drop_on_element_inserts_before_it() {
    let mut editor = page_editor();
    let first = editor.append("heading").unwrap();
    editor.append("button");

    editor
        .begin_drag(DragPayload::NewFromRegistry("text".into()))
        .unwrap();
    assert!(matches!(editor.drag_state(), DragState::DraggingNew { .. }));
    assert!(editor.drop_on(Some(DropTarget::Element(first))));

    assert_eq!(type_tags(&editor), ["text", "heading", "button"]);
    assert!(editor.drag_state().is_idle());
}

#[test]
fn palette_drop_on_canvas_appends() {
    let mut editor = page_editor();
    editor.append("heading");

    editor
        .begin_drag(DragPayload::NewFromRegistry("divider".into()))
        .unwrap();
    assert!(editor.drop_on(Some(DropTarget::Canvas)));
    assert_eq!(type_tags(&editor), ["heading", "divider"]);
}

#[test]
fn palette_drop_into_module_adds_a_lesson() {
    let mut editor = course_editor();
    let module = editor.append("module").unwrap();

    editor
        .begin_drag(DragPayload::NewFromRegistry("quiz".into()))
        .unwrap();
    assert!(editor.drop_on(Some(DropTarget::Container(module.clone()))));

    let module = editor.store().find(&module).unwrap();
    assert_eq!(module.children.len(), 1);
    assert_eq!(module.children[0].type_tag(), "quiz");
}

#[test]
fn lesson_dropped_on_a_module_card_goes_inside() {
    let mut editor = course_editor();
    let module = editor.append("module").unwrap();

    editor
        .begin_drag(DragPayload::NewFromRegistry("video_lesson".into()))
        .unwrap();
    assert!(editor.drop_on(Some(DropTarget::Element(module.clone()))));

    assert_eq!(type_tags(&editor), ["module"]);
    let module = editor.store().find(&module).unwrap();
    assert_eq!(module.children[0].type_tag(), "video_lesson");
}

#[test]
fn lessons_never_land_at_the_top_level() {
    let mut editor = course_editor();
    let module = editor.append("module").unwrap();

    assert_eq!(editor.append("video_lesson"), None);

    editor
        .begin_drag(DragPayload::NewFromRegistry("quiz".into()))
        .unwrap();
    assert!(!editor.drop_on(Some(DropTarget::Canvas)));
    assert!(editor.drag_state().is_idle());

    assert_eq!(type_tags(&editor), ["module"]);
    assert!(editor.store().find(&module).unwrap().children.is_empty());
    assert_eq!(editor.history().undo_stack().len(), 1);
}

#[test]
fn dragging_an_element_onto_another_reorders() {
    let mut editor = page_editor();
    let a = editor.append("heading").unwrap();
    editor.append("text");
    let c = editor.append("button").unwrap();

    editor
        .begin_drag(DragPayload::ExistingElement(c))
        .unwrap();
    assert!(editor.drop_on(Some(DropTarget::Element(a))));
    assert_eq!(type_tags(&editor), ["button", "heading", "text"]);
}

#[test]
fn dropping_onto_itself_changes_nothing() {
    let mut editor = page_editor();
    let a = editor.append("heading").unwrap();
    editor.append("text");

    editor
        .begin_drag(DragPayload::ExistingElement(a.clone()))
        .unwrap();
    assert!(!editor.drop_on(Some(DropTarget::Element(a))));
    assert_eq!(type_tags(&editor), ["heading", "text"]);
    assert!(!editor.history().can_redo());
}

#[test]
fn release_outside_any_target_cancels() {
    let mut editor = page_editor();
    editor.append("heading");
    let before = editor.elements().to_vec();

    editor
        .begin_drag(DragPayload::NewFromRegistry("text".into()))
        .unwrap();
    assert!(!editor.drop_on(None));
    assert!(editor.drag_state().is_idle());
    assert_eq!(editor.elements(), before.as_slice());
}

#[test]
fn locked_elements_cannot_be_dragged() {
    let mut editor = page_editor();
    let id = editor.append("heading").unwrap();
    editor.set_locked(&id, true);

    assert!(editor.begin_drag(DragPayload::ExistingElement(id)).is_err());
    assert!(editor.drag_state().is_idle());
}

#[test]
fn second_drag_while_dragging_is_rejected() {
    let mut editor = page_editor();
    editor
        .begin_drag(DragPayload::NewFromRegistry("text".into()))
        .unwrap();
    assert!(editor
        .begin_drag(DragPayload::NewFromRegistry("heading".into()))
        .is_err());
    assert_eq!(
        editor.drag_state(),
        &DragState::DraggingNew {
            type_tag: "text".into()
        }
    );
}

#[test]
fn undo_and_redo_keep_element_ids() {
    let mut editor = page_editor();
    let id = editor.append("heading").unwrap();

    editor.undo().unwrap();
    assert!(editor.elements().is_empty());
    editor.redo().unwrap();
    assert_eq!(editor.elements()[0].id, id);
}

#[test]
fn undo_restores_a_removed_element_in_place() {
    let mut editor = page_editor();
    editor.append("heading");
    let middle = editor.append("text").unwrap();
    editor.append("button");

    editor.remove(&middle);
    editor.undo().unwrap();
    assert_eq!(editor.store().index_of(&middle), Some(1));
    assert_eq!(type_tags(&editor), ["heading", "text", "button"]);
}

#[test]
fn undoing_an_insert_clears_its_selection() {
    let mut editor = page_editor();
    let id = editor.append("image").unwrap();
    editor.select(&id);

    editor.undo().unwrap();
    assert_eq!(editor.session().selected_id(), None);
}

#[test]
fn undo_of_update_restores_previous_properties() {
    let mut editor = page_editor();
    let id = editor.append("button").unwrap();
    let original = editor.store().find(&id).unwrap().properties.clone();

    let mut changes = Properties::new();
    changes.insert("label".into(), json!("Register"));
    changes.insert("tracking".into(), json!("spring"));
    editor.update(&id, changes);
    editor.undo().unwrap();

    assert_eq!(editor.store().find(&id).unwrap().properties, original);
}

#[test]
fn undo_of_clear_brings_everything_back() {
    let mut editor = page_editor();
    let ids: Vec<ElementId> = ["heading", "text", "button"]
        .iter()
        .filter_map(|tag| editor.append(tag))
        .collect();

    editor.clear();
    editor.undo().unwrap();
    assert_eq!(editor.store().root_ids(), ids);
}

#[test]
fn empty_history_reports_nothing_to_undo() {
    let mut editor = page_editor();
    assert!(matches!(editor.undo(), Err(CommandError::NothingToUndo)));
    assert!(matches!(editor.redo(), Err(CommandError::NothingToRedo)));
}

#[test]
fn a_new_edit_drops_the_redo_stack() {
    let mut editor = page_editor();
    editor.append("heading");
    editor.undo().unwrap();
    assert!(editor.history().can_redo());

    editor.append("text");
    assert!(!editor.history().can_redo());
}

#[test]
fn history_limit_discards_the_oldest_steps() {
    let mut editor = page_editor().with_history_limit(2);
    for _ in 0..4 {
        editor.append("spacer");
    }
    assert_eq!(editor.history().undo_stack().len(), 2);
}

#[test]
fn locked_elements_survive_remove_and_reorder() {
    let mut editor = page_editor();
    let locked = editor.append("heading").unwrap();
    let other = editor.append("text").unwrap();
    editor.set_locked(&locked, true);

    assert!(!editor.remove(&locked));
    assert!(!editor.reorder(&locked, &other));
    assert_eq!(editor.store().index_of(&locked), Some(0));

    let duplicate = editor.duplicate(&locked).unwrap();
    assert!(editor.store().find(&duplicate).unwrap().locked);
    editor.undo().unwrap();
    assert!(!editor.store().contains(&duplicate));
}

#[test]
fn subscribers_see_document_changes() {
    let mut editor = page_editor();
    let log = EventLog::new();
    editor.subscribe(Box::new(log.clone()));

    let id = editor.append("countdown").unwrap();
    assert!(log.events().contains(&EditorEvent::DocumentChanged(DocumentEvent::Inserted {
        id,
        parent: None,
        index: 0,
    })));
    assert_eq!(
        log.last(),
        Some(EditorEvent::HistoryChanged {
            can_undo: true,
            can_redo: false,
        })
    );
}
