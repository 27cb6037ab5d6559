//! Testing utilities for MillFlow workspace
//!
//! Fixture sheets built through the real operations, plus structural
//! assertions shared by the integration tests.

#![allow(missing_docs)]

use millflow_dag::ids::{IdGenerator, SequentialIds};
use millflow_dag::ops;
use millflow_dag::validate;
use millflow_dag::{Editor, EditorConfig, JobId, NodeContent, NodeId, Sheet, SheetId, Side};

pub const TEST_JOB: &str = "J-TEST";

/// Sheet with a single start node "start".
pub fn start_sheet(ids: &mut SequentialIds) -> (Sheet, NodeId) {
    let sheet_id: SheetId = ids.next_id();
    let start: NodeId = ids.next_id();
    let sheet = Sheet::with_root(
        sheet_id,
        JobId::new(TEST_JOB),
        "test sheet",
        start,
        NodeContent::named("start"),
    );
    (sheet, start)
}

/// Straight line of nodes with the given names, first one as root.
pub fn chain(names: &[&str]) -> (Sheet, Vec<NodeId>) {
    assert!(!names.is_empty(), "chain needs at least one node");
    let mut ids = SequentialIds::new();
    let sheet_id: SheetId = ids.next_id();
    let first: NodeId = ids.next_id();
    let mut sheet = Sheet::with_root(
        sheet_id,
        JobId::new(TEST_JOB),
        "chain",
        first,
        NodeContent::named(names[0]),
    );
    let mut order = vec![first];
    for name in &names[1..] {
        let new_id: NodeId = ids.next_id();
        let last = *order.last().unwrap();
        sheet = ops::insert_after(&sheet, last, new_id, NodeContent::named(*name))
            .unwrap()
            .sheet;
        order.push(new_id);
    }
    (sheet, order)
}

/// Diamond with `width` parallel branches: `start -> {b0..} -> end`.
pub struct Fan {
    pub sheet: Sheet,
    pub start: NodeId,
    pub branches: Vec<NodeId>,
    pub end: NodeId,
}

pub fn fan(width: usize) -> Fan {
    assert!(width >= 1, "fan needs at least one branch");
    let (sheet, nodes) = chain(&["start", "b0", "end"]);
    let (start, first, end) = (nodes[0], nodes[1], nodes[2]);
    let mut ids = SequentialIds::starting_at(100);
    let mut sheet = sheet;
    let mut branches = vec![first];
    for i in 1..width {
        let new_id: NodeId = ids.next_id();
        let anchor = *branches.last().unwrap();
        let content = NodeContent::named(format!("b{i}"));
        sheet = ops::insert_sibling(&sheet, anchor, Side::Right, new_id, content)
            .unwrap()
            .sheet;
        branches.push(new_id);
    }
    Fan {
        sheet,
        start,
        branches,
        end,
    }
}

/// Editor with deterministic ids holding one sheet with a start node.
pub fn editor_with_start() -> (Editor<SequentialIds>, SheetId, NodeId) {
    editor_with_config(EditorConfig::default())
}

pub fn editor_with_config(config: EditorConfig) -> (Editor<SequentialIds>, SheetId, NodeId) {
    let mut editor = Editor::with_ids(config, SequentialIds::new());
    let (sheet, start) =
        editor.create_sheet(JobId::new(TEST_JOB), "test sheet", NodeContent::named("start"));
    (editor, sheet, start)
}

/// Id of the unique node called `name`.
pub fn node_named(sheet: &Sheet, name: &str) -> NodeId {
    let mut matches = sheet.nodes().filter(|n| n.name == name);
    let node = matches
        .next()
        .unwrap_or_else(|| panic!("no node named {name:?}"));
    assert!(matches.next().is_none(), "more than one node named {name:?}");
    node.id
}

/// Every parent->child edge, sorted.
pub fn edges(sheet: &Sheet) -> Vec<(NodeId, NodeId)> {
    let mut edges: Vec<(NodeId, NodeId)> = sheet
        .nodes()
        .flat_map(|n| n.children.iter().map(move |c| (n.id, *c)))
        .collect();
    edges.sort();
    edges
}

/// Edges by node name, sorted; easier to read in a failing diff.
pub fn named_edges(sheet: &Sheet) -> Vec<(String, String)> {
    let name = |id: NodeId| sheet.get_node(id).map(|n| n.name.clone()).unwrap();
    let mut edges: Vec<(String, String)> = edges(sheet)
        .into_iter()
        .map(|(p, c)| (name(p), name(c)))
        .collect();
    edges.sort();
    edges
}

/// Bidirectional consistency, no dangling ids, no cycles.
pub fn assert_consistent(sheet: &Sheet) {
    if let Err(violation) = validate::check_sheet(sheet) {
        panic!("sheet {} is inconsistent: {violation}", sheet.id);
    }
    for node in sheet.nodes() {
        for child in &node.children {
            let child = sheet.get_node(*child).unwrap();
            assert!(child.parents.contains(&node.id), "{} missing parent {}", child.id, node.id);
        }
        for parent in &node.parents {
            let parent = sheet.get_node(*parent).unwrap();
            assert!(parent.children.contains(&node.id), "{} missing child {}", parent.id, node.id);
        }
    }
}

/// Consistency of every sheet an editor holds.
pub fn assert_editor_consistent<G: IdGenerator>(editor: &Editor<G>) {
    for sheet in editor.workspace().sheets() {
        assert_consistent(sheet);
    }
}
