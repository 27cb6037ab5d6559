use millflow_dag::ids::{IdGenerator, SequentialIds};
use millflow_dag::linearize::linearize;
use millflow_dag::ops::{self, Applied};
use millflow_dag::{EditError, NodeContent, NodeId, PastePosition, Sheet, Side};
use millflow_test_utils::{assert_consistent, start_sheet};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Step {
    InsertAfter(usize),
    InsertBefore(usize),
    Sibling(usize, bool),
    Split(usize),
    Join(Vec<usize>, usize),
    Delete(usize),
    CutPaste(usize, usize, u8),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => any::<usize>().prop_map(Step::InsertAfter),
        2 => any::<usize>().prop_map(Step::InsertBefore),
        2 => (any::<usize>(), any::<bool>()).prop_map(|(n, left)| Step::Sibling(n, left)),
        2 => any::<usize>().prop_map(Step::Split),
        1 => (proptest::collection::vec(any::<usize>(), 0..4), any::<usize>())
            .prop_map(|(sources, target)| Step::Join(sources, target)),
        2 => any::<usize>().prop_map(Step::Delete),
        1 => (any::<usize>(), any::<usize>(), 0..3u8).prop_map(|(n, t, p)| Step::CutPaste(n, t, p)),
    ]
}

fn pick(sheet: &Sheet, index: usize) -> Option<NodeId> {
    let len = sheet.len();
    (len > 0).then(|| sheet.nodes().nth(index % len).map(|n| n.id)).flatten()
}

fn apply(sheet: &Sheet, step: &Step, ids: &mut SequentialIds) -> Result<Sheet, EditError> {
    let content = || NodeContent::named("n");
    let Some(first) = pick(sheet, 0) else {
        return Ok(sheet.clone());
    };
    let node = |i: usize| pick(sheet, i).unwrap_or(first);
    let applied: Applied = match step {
        Step::InsertAfter(n) => ops::insert_after(sheet, node(*n), ids.next_id(), content())?,
        Step::InsertBefore(n) => ops::insert_before(sheet, node(*n), ids.next_id(), content())?,
        Step::Sibling(n, left) => {
            let side = if *left { Side::Left } else { Side::Right };
            ops::insert_sibling(sheet, node(*n), side, ids.next_id(), content())?
        }
        Step::Split(n) => ops::split(sheet, node(*n), ids.next_id(), content())?,
        Step::Join(sources, target) => {
            let sources: Vec<NodeId> = sources.iter().map(|i| node(*i)).collect();
            ops::join(sheet, &sources, node(*target))?
        }
        Step::Delete(n) => ops::delete_node(sheet, node(*n))?,
        Step::CutPaste(n, target, position) => {
            let (cut, content) = ops::cut_node(sheet, node(*n))?;
            let Some(target) = pick(&cut.sheet, *target) else {
                return Ok(cut.sheet);
            };
            let position = match position {
                0 => PastePosition::Before,
                1 => PastePosition::After,
                _ => PastePosition::Sibling(Side::Right),
            };
            ops::paste_node(&cut.sheet, target, position, ids.next_id(), content)?
        }
    };
    Ok(applied.sheet)
}

proptest! {
    #[test]
    fn prop_edges_stay_mirrored_and_resolvable(steps in proptest::collection::vec(step(), 1..60)) {
        let mut ids = SequentialIds::new();
        let (mut sheet, _) = start_sheet(&mut ids);

        for step in &steps {
            match apply(&sheet, step, &mut ids) {
                Ok(next) => sheet = next,
                // rejected edits leave the input untouched; joins may close a cycle
                Err(err) => prop_assert!(err.is_no_op() || err.is_programming_error(), "{err}"),
            }
            assert_consistent(&sheet);
        }
    }

    #[test]
    fn prop_linearizer_places_every_node_once(steps in proptest::collection::vec(step(), 1..40)) {
        let mut ids = SequentialIds::new();
        let (mut sheet, _) = start_sheet(&mut ids);
        for step in &steps {
            if let Ok(next) = apply(&sheet, step, &mut ids) {
                sheet = next;
            }
        }

        let levels = linearize(&sheet);
        let mut seen = HashSet::new();
        for level in &levels {
            for id in &level.nodes {
                prop_assert!(seen.insert(*id), "{id} placed twice");
                let node = sheet.get_node(*id).unwrap();
                for parent in &node.parents {
                    let parent_level = levels
                        .iter()
                        .position(|l| l.nodes.contains(parent))
                        .unwrap();
                    prop_assert!(parent_level < level.index);
                }
            }
        }
        prop_assert_eq!(seen.len(), sheet.len());
    }

    #[test]
    fn prop_split_and_insert_grow_by_one(
        n in any::<usize>(),
        steps in proptest::collection::vec(step(), 0..20),
    ) {
        let mut ids = SequentialIds::new();
        let (mut sheet, _) = start_sheet(&mut ids);
        for step in &steps {
            if let Ok(next) = apply(&sheet, step, &mut ids) {
                sheet = next;
            }
        }
        prop_assume!(!sheet.is_empty());

        let before = sheet.len();
        let after = apply(&sheet, &Step::InsertAfter(n), &mut ids).unwrap();
        prop_assert_eq!(after.len(), before + 1);
    }
}
