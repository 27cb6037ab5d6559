use millflow_dag::error::Precondition;
use millflow_dag::ids::SequentialIds;
use millflow_dag::{Editor, EditorConfig, NodeContent, NodeId, Outcome, SheetId, Workspace};
use millflow_test_utils::{assert_editor_consistent, chain, editor_with_config};
use pretty_assertions::assert_eq;

type Fixture = (Editor<SequentialIds>, SheetId, NodeId);

/// Editor over a one-node chain with an empty history.
fn fresh_editor(config: EditorConfig) -> Fixture {
    let (sheet, nodes) = chain(&["start"]);
    let sheet_id = sheet.id;
    let workspace: Workspace = std::iter::once(sheet).collect();
    let editor = Editor::from_workspace(workspace, config, SequentialIds::starting_at(1_000));
    (editor, sheet_id, nodes[0])
}

#[test]
fn sixty_mutations_keep_fifty_entries() {
    let (mut editor, sheet, start) = fresh_editor(EditorConfig::default());
    assert!(editor.history().is_empty());

    let mut last = start;
    for i in 0..60 {
        let outcome = editor
            .insert_after(sheet, last, NodeContent::named(format!("step {i}")))
            .unwrap();
        let Outcome::Applied { selected: Some(new) } = outcome else {
            panic!("insert {i} did not apply: {outcome:?}");
        };
        last = new;
    }
    assert_eq!(editor.history().len(), 50);
    assert_eq!(editor.sheet(sheet).unwrap().len(), 61);

    for i in 0..50 {
        assert!(editor.undo().is_applied(), "undo {i} failed");
    }
    assert_eq!(editor.undo(), Outcome::NoOp(Precondition::NothingToUndo));

    // the oldest reachable state is the one after the tenth insert
    assert_eq!(editor.sheet(sheet).unwrap().len(), 11);
    assert_editor_consistent(&editor);
}

#[test]
fn redo_walks_back_to_the_live_state() {
    let (mut editor, sheet, start) = fresh_editor(EditorConfig::default());
    editor.insert_after(sheet, start, NodeContent::named("a")).unwrap();
    editor.rename(sheet, start, "begin").unwrap();
    let live = editor.workspace().clone();

    assert!(editor.undo().is_applied());
    assert!(editor.undo().is_applied());
    assert_eq!(editor.sheet(sheet).unwrap().len(), 1);
    assert_eq!(editor.node(sheet, start).unwrap().name, "start");

    assert!(editor.redo().is_applied());
    assert!(editor.redo().is_applied());
    assert_eq!(editor.redo(), Outcome::NoOp(Precondition::NothingToRedo));
    assert_eq!(editor.workspace(), &live);
}

#[test]
fn a_new_edit_discards_the_redo_tail() {
    let (mut editor, sheet, start) = fresh_editor(EditorConfig::default());
    editor.insert_after(sheet, start, NodeContent::named("a")).unwrap();
    editor.insert_after(sheet, start, NodeContent::named("b")).unwrap();
    editor.undo();
    assert!(editor.history().can_redo());

    editor.rename(sheet, start, "begin").unwrap();

    assert!(!editor.history().can_redo());
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.redo(), Outcome::NoOp(Precondition::NothingToRedo));
}

#[test]
fn no_ops_are_not_recorded() {
    let (mut editor, sheet, start) = fresh_editor(EditorConfig::default());
    let outcome = editor.split(sheet, start, NodeContent::named("x")).unwrap();
    assert!(!outcome.is_applied());
    assert!(editor.history().is_empty());
}

#[test]
fn configured_limit_is_honoured() {
    let (mut editor, sheet, start) = editor_with_config(EditorConfig::new().with_history_limit(3));
    for name in ["a", "b", "c", "d", "e"] {
        editor.rename(sheet, start, name).unwrap();
    }
    assert_eq!(editor.history().len(), 3);
    assert_eq!(editor.history().undo_description(), Some("rename to e"));
    for _ in 0..3 {
        assert!(editor.undo().is_applied());
    }
    assert!(!editor.undo().is_applied());
    assert_eq!(editor.node(sheet, start).unwrap().name, "b");
}
