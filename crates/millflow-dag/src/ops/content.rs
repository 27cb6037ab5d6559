//! Edits to node content. None of these touch edges.

use super::{node_mut, Applied};
use crate::error::{EditError, Precondition};
use crate::node::{Blocker, Node, Note};
use crate::sheet::Sheet;
use crate::types::{BlockerId, NodeId, NodeKind, NodeStatus, NoteId, PersonId, Timestamp};

fn update_node<F>(sheet: &Sheet, id: NodeId, f: F) -> Result<Applied, EditError>
where
    F: FnOnce(&mut Node) -> Result<(), EditError>,
{
    let sheet = sheet.apply_mutation(|nodes| f(node_mut(nodes, id)?))?;
    Ok(Applied::selecting(sheet, id))
}

pub fn rename(sheet: &Sheet, id: NodeId, name: impl Into<String>) -> Result<Applied, EditError> {
    let name = name.into();
    update_node(sheet, id, |node| {
        if node.name == name {
            return Err(Precondition::Unchanged(id).into());
        }
        node.name = name;
        Ok(())
    })
}

pub fn set_kind(sheet: &Sheet, id: NodeId, kind: NodeKind) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        if node.kind == kind {
            return Err(Precondition::Unchanged(id).into());
        }
        node.kind = kind;
        Ok(())
    })
}

/// Status edit. A node with unresolved blockers stays blocked.
pub fn set_status(sheet: &Sheet, id: NodeId, status: NodeStatus) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        if node.status == status {
            return Err(Precondition::Unchanged(id).into());
        }
        if status != NodeStatus::Blocked && node.has_unresolved_blockers() {
            return Err(Precondition::UnresolvedBlockers(id).into());
        }
        node.status = status;
        Ok(())
    })
}

pub fn assign(sheet: &Sheet, id: NodeId, person: PersonId) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        if !node.assignees.insert(person) {
            return Err(Precondition::Unchanged(id).into());
        }
        Ok(())
    })
}

pub fn unassign(sheet: &Sheet, id: NodeId, person: &PersonId) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        if !node.assignees.remove(person) {
            return Err(Precondition::Unchanged(id).into());
        }
        Ok(())
    })
}

/// Attach a blocker; an unresolved one forces the node to blocked.
pub fn add_blocker(sheet: &Sheet, id: NodeId, blocker: Blocker) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        if !blocker.is_resolved() {
            node.status = NodeStatus::Blocked;
        }
        node.blockers.push(blocker);
        Ok(())
    })
}

/// Mark a blocker resolved. Resolving twice is a no-op.
pub fn resolve_blocker(
    sheet: &Sheet,
    id: NodeId,
    blocker: BlockerId,
    at: Timestamp,
) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        let record = node
            .blockers
            .iter_mut()
            .find(|b| b.id == blocker)
            .ok_or(EditError::BlockerNotFound { node: id, blocker })?;
        if record.is_resolved() {
            return Err(Precondition::AlreadyResolved { node: id, blocker }.into());
        }
        record.resolved_at = Some(at);
        node.recompute_blocked_status();
        Ok(())
    })
}

pub fn remove_blocker(sheet: &Sheet, id: NodeId, blocker: BlockerId) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        let before = node.blockers.len();
        node.blockers.retain(|b| b.id != blocker);
        if node.blockers.len() == before {
            return Err(EditError::BlockerNotFound { node: id, blocker });
        }
        node.recompute_blocked_status();
        Ok(())
    })
}

pub fn add_note(sheet: &Sheet, id: NodeId, note: Note) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        node.notes.push(note);
        Ok(())
    })
}

pub fn edit_note(
    sheet: &Sheet,
    id: NodeId,
    note: NoteId,
    text: impl Into<String>,
    at: Timestamp,
) -> Result<Applied, EditError> {
    let text = text.into();
    update_node(sheet, id, |node| {
        let record = node
            .notes
            .iter_mut()
            .find(|n| n.id == note)
            .ok_or(EditError::NoteNotFound { node: id, note })?;
        if record.text == text {
            return Err(Precondition::Unchanged(id).into());
        }
        record.text = text;
        record.edited_at = Some(at);
        Ok(())
    })
}

pub fn delete_note(sheet: &Sheet, id: NodeId, note: NoteId) -> Result<Applied, EditError> {
    update_node(sheet, id, |node| {
        let before = node.notes.len();
        node.notes.retain(|n| n.id != note);
        if node.notes.len() == before {
            return Err(EditError::NoteNotFound { node: id, note });
        }
        Ok(())
    })
}
