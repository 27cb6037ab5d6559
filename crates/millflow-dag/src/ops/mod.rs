//! Mutation operations.
//!
//! Every operation is a pure function from a borrowed [`Sheet`] to a new one.
//! Ids and timestamps are injected by the caller. An `Err` means the input
//! sheet is the current state; there is no partial update.

mod content;
mod insert;
mod structure;

pub use content::{
    add_blocker, add_note, assign, delete_note, edit_note, remove_blocker, rename,
    resolve_blocker, set_kind, set_status, unassign,
};
pub use insert::{insert_after, insert_before, insert_sibling};
pub use structure::{cut_node, delete_node, join, paste_node, split};

use crate::error::{EditError, InvariantViolation};
use crate::node::Node;
use crate::sheet::{NodeTable, Sheet};
use crate::types::{NodeId, Side};

/// Result of a successful edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub sheet: Sheet,
    /// Node the cursor should land on, if the edit suggests one
    pub selected: Option<NodeId>,
}

impl Applied {
    pub(crate) fn selecting(sheet: Sheet, id: NodeId) -> Self {
        Self {
            sheet,
            selected: Some(id),
        }
    }
}

pub(crate) fn node_mut(nodes: &mut NodeTable, id: NodeId) -> Result<&mut Node, EditError> {
    nodes.get_mut(&id).ok_or(EditError::NodeNotFound(id))
}

pub(crate) fn ensure_fresh(nodes: &NodeTable, id: NodeId) -> Result<(), EditError> {
    if nodes.contains_key(&id) {
        return Err(InvariantViolation::DuplicateId(id).into());
    }
    Ok(())
}

/// Replace `old` in `list` by `with`, in place, skipping ids already listed.
pub(crate) fn splice(list: &mut Vec<NodeId>, old: NodeId, with: &[NodeId]) {
    let Some(pos) = list.iter().position(|id| *id == old) else {
        return;
    };
    list.remove(pos);
    let mut at = pos;
    for id in with {
        if !list.contains(id) {
            list.insert(at, *id);
            at += 1;
        }
    }
}

/// Put `new` directly beside `anchor`; append when the anchor is absent.
pub(crate) fn insert_beside(list: &mut Vec<NodeId>, anchor: NodeId, new: NodeId, side: Side) {
    if list.contains(&new) {
        return;
    }
    match list.iter().position(|id| *id == anchor) {
        Some(pos) => {
            let at = match side {
                Side::Left => pos,
                Side::Right => pos + 1,
            };
            list.insert(at, new);
        }
        None => list.push(new),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    #[test]
    fn splice_keeps_position_and_skips_duplicates() {
        let mut list = vec![id(1), id(2), id(3)];
        splice(&mut list, id(2), &[id(4), id(3), id(5)]);
        assert_eq!(list, vec![id(1), id(4), id(5), id(3)]);
    }

    #[test]
    fn splice_with_nothing_removes() {
        let mut list = vec![id(1), id(2)];
        splice(&mut list, id(1), &[]);
        assert_eq!(list, vec![id(2)]);
    }

    #[test]
    fn insert_beside_both_sides() {
        let mut list = vec![id(1), id(2)];
        insert_beside(&mut list, id(1), id(7), Side::Right);
        assert_eq!(list, vec![id(1), id(7), id(2)]);
        insert_beside(&mut list, id(1), id(8), Side::Left);
        assert_eq!(list, vec![id(8), id(1), id(7), id(2)]);
        insert_beside(&mut list, id(9), id(6), Side::Left);
        assert_eq!(list.last(), Some(&id(6)));
    }
}
