use super::{ensure_fresh, insert_beside, node_mut, splice, Applied};
use crate::error::EditError;
use crate::node::{Node, NodeContent};
use crate::sheet::Sheet;
use crate::types::{NodeId, Side};

/// Subdivide every outgoing edge of `target` with a new node.
///
/// `target -> {c..}` becomes `target -> new -> {c..}`.
pub fn insert_after(
    sheet: &Sheet,
    target: NodeId,
    new_id: NodeId,
    content: NodeContent,
) -> Result<Applied, EditError> {
    let sheet = sheet.apply_mutation(|nodes| {
        ensure_fresh(nodes, new_id)?;
        let old_children = std::mem::replace(&mut node_mut(nodes, target)?.children, vec![new_id]);
        for child in &old_children {
            splice(&mut node_mut(nodes, *child)?.parents, target, &[new_id]);
        }
        let mut node = Node::from_content(new_id, content);
        node.parents = vec![target];
        node.children = old_children;
        nodes.insert(new_id, node);
        Ok(())
    })?;
    Ok(Applied::selecting(sheet, new_id))
}

/// Subdivide every incoming edge of `target` with a new node.
///
/// `{p..} -> target` becomes `{p..} -> new -> target`.
pub fn insert_before(
    sheet: &Sheet,
    target: NodeId,
    new_id: NodeId,
    content: NodeContent,
) -> Result<Applied, EditError> {
    let sheet = sheet.apply_mutation(|nodes| {
        ensure_fresh(nodes, new_id)?;
        let old_parents = std::mem::replace(&mut node_mut(nodes, target)?.parents, vec![new_id]);
        for parent in &old_parents {
            splice(&mut node_mut(nodes, *parent)?.children, target, &[new_id]);
        }
        let mut node = Node::from_content(new_id, content);
        node.parents = old_parents;
        node.children = vec![target];
        nodes.insert(new_id, node);
        Ok(())
    })?;
    Ok(Applied::selecting(sheet, new_id))
}

/// Add a node running in parallel with `target`: same parents, same
/// children, listed next to `target` on `side` in every shared list.
///
/// A root target has nothing to share, so this degrades to [`insert_after`].
pub fn insert_sibling(
    sheet: &Sheet,
    target: NodeId,
    side: Side,
    new_id: NodeId,
    content: NodeContent,
) -> Result<Applied, EditError> {
    if sheet.get_node(target)?.is_root() {
        return insert_after(sheet, target, new_id, content);
    }
    let sheet = sheet.apply_mutation(|nodes| {
        ensure_fresh(nodes, new_id)?;
        let anchor = node_mut(nodes, target)?;
        let parents = anchor.parents.clone();
        let children = anchor.children.clone();
        for parent in &parents {
            insert_beside(&mut node_mut(nodes, *parent)?.children, target, new_id, side);
        }
        for child in &children {
            insert_beside(&mut node_mut(nodes, *child)?.parents, target, new_id, side);
        }
        let mut node = Node::from_content(new_id, content);
        node.parents = parents;
        node.children = children;
        nodes.insert(new_id, node);
        Ok(())
    })?;
    Ok(Applied::selecting(sheet, new_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvariantViolation;
    use crate::types::{JobId, SheetId};

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    fn start() -> Sheet {
        Sheet::with_root(
            SheetId::from_u128(1),
            JobId::new("j"),
            "s",
            id(1),
            NodeContent::named("A"),
        )
    }

    fn edges(sheet: &Sheet, n: u128) -> (Vec<NodeId>, Vec<NodeId>) {
        let node = sheet.get_node(id(n)).unwrap();
        (node.parents.clone(), node.children.clone())
    }

    #[test]
    fn insert_after_leaf() {
        let applied = insert_after(&start(), id(1), id(2), NodeContent::named("B")).unwrap();
        assert_eq!(applied.selected, Some(id(2)));
        assert_eq!(edges(&applied.sheet, 1), (vec![], vec![id(2)]));
        assert_eq!(edges(&applied.sheet, 2), (vec![id(1)], vec![]));
    }

    #[test]
    fn insert_after_subdivides_fan() {
        let sheet = insert_after(&start(), id(1), id(2), NodeContent::named("B")).unwrap().sheet;
        let sheet = insert_sibling(&sheet, id(2), Side::Right, id(3), NodeContent::named("C"))
            .unwrap()
            .sheet;
        let sheet = insert_after(&sheet, id(1), id(4), NodeContent::named("X")).unwrap().sheet;
        assert_eq!(edges(&sheet, 1), (vec![], vec![id(4)]));
        assert_eq!(edges(&sheet, 4), (vec![id(1)], vec![id(2), id(3)]));
        assert_eq!(edges(&sheet, 2), (vec![id(4)], vec![]));
        assert_eq!(edges(&sheet, 3), (vec![id(4)], vec![]));
    }

    #[test]
    fn insert_before_takes_over_parents() {
        let sheet = insert_after(&start(), id(1), id(2), NodeContent::named("B")).unwrap().sheet;
        let sheet = insert_before(&sheet, id(2), id(3), NodeContent::named("X")).unwrap().sheet;
        assert_eq!(edges(&sheet, 1), (vec![], vec![id(3)]));
        assert_eq!(edges(&sheet, 3), (vec![id(1)], vec![id(2)]));
        assert_eq!(edges(&sheet, 2), (vec![id(3)], vec![]));
    }

    #[test]
    fn insert_before_root_creates_new_root() {
        let sheet = insert_before(&start(), id(1), id(2), NodeContent::named("Pre")).unwrap().sheet;
        assert_eq!(sheet.roots(), vec![id(2)]);
        assert_eq!(edges(&sheet, 1), (vec![id(2)], vec![]));
    }

    #[test]
    fn sibling_shares_parents_and_children() {
        let sheet = insert_after(&start(), id(1), id(2), NodeContent::named("B")).unwrap().sheet;
        let sheet = insert_after(&sheet, id(2), id(3), NodeContent::named("C")).unwrap().sheet;
        let sheet = insert_sibling(&sheet, id(2), Side::Right, id(4), NodeContent::named("D"))
            .unwrap()
            .sheet;
        assert_eq!(edges(&sheet, 4), (vec![id(1)], vec![id(3)]));
        assert_eq!(edges(&sheet, 1).1, vec![id(2), id(4)]);
        assert_eq!(edges(&sheet, 3).0, vec![id(2), id(4)]);

        let sheet = insert_sibling(&sheet, id(2), Side::Left, id(5), NodeContent::named("E"))
            .unwrap()
            .sheet;
        assert_eq!(edges(&sheet, 1).1, vec![id(5), id(2), id(4)]);
        assert_eq!(edges(&sheet, 3).0, vec![id(5), id(2), id(4)]);
    }

    #[test]
    fn sibling_of_root_falls_back_to_after() {
        let sheet = insert_sibling(&start(), id(1), Side::Right, id(2), NodeContent::named("B"))
            .unwrap()
            .sheet;
        assert_eq!(edges(&sheet, 1), (vec![], vec![id(2)]));
        assert_eq!(sheet.roots(), vec![id(1)]);
    }

    #[test]
    fn missing_target_changes_nothing() {
        let sheet = start();
        let err = insert_after(&sheet, id(9), id(2), NodeContent::named("B")).unwrap_err();
        assert_eq!(err, EditError::NodeNotFound(id(9)));
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn reused_id_is_rejected() {
        let err = insert_after(&start(), id(1), id(1), NodeContent::named("B")).unwrap_err();
        assert_eq!(err, EditError::Invariant(InvariantViolation::DuplicateId(id(1))));
    }
}
