use super::{
    ensure_fresh, insert_after, insert_before, insert_beside, insert_sibling, node_mut, splice,
    Applied,
};
use crate::error::{EditError, InvariantViolation, Precondition};
use crate::node::{Node, NodeContent};
use crate::sheet::{NodeTable, Sheet};
use crate::types::{NodeId, PastePosition, Side};
use crate::validate;

/// Open a second path out of `target` that reconverges on its children.
///
/// `target -> {c..}` gains `target -> new -> {c..}`; existing edges stay.
pub fn split(
    sheet: &Sheet,
    target: NodeId,
    new_id: NodeId,
    content: NodeContent,
) -> Result<Applied, EditError> {
    if sheet.get_node(target)?.is_sink() {
        return Err(Precondition::NoChildren(target).into());
    }
    let sheet = sheet.apply_mutation(|nodes| {
        ensure_fresh(nodes, new_id)?;
        let anchor = node_mut(nodes, target)?;
        let children = anchor.children.clone();
        anchor.children.push(new_id);
        for child in &children {
            insert_beside(&mut node_mut(nodes, *child)?.parents, target, new_id, Side::Right);
        }
        let mut node = Node::from_content(new_id, content);
        node.parents = vec![target];
        node.children = children;
        nodes.insert(new_id, node);
        Ok(())
    })?;
    Ok(Applied::selecting(sheet, new_id))
}

/// Make `target` the single successor of every node in `sources`.
///
/// Prior children of the sources are dropped. The caller is trusted to pick
/// parallel branches; the only structural checks are that `target` is not
/// itself a source and that no cycle results.
pub fn join(sheet: &Sheet, sources: &[NodeId], target: NodeId) -> Result<Applied, EditError> {
    sheet.get_node(target)?;
    let mut unique: Vec<NodeId> = Vec::with_capacity(sources.len());
    for id in sources {
        sheet.get_node(*id)?;
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    if unique.is_empty() {
        return Err(Precondition::NothingToJoin.into());
    }
    if unique.contains(&target) {
        return Err(InvariantViolation::SelfLoop(target).into());
    }

    let joined = sheet.apply_mutation(|nodes| {
        for source in &unique {
            let old = std::mem::replace(&mut node_mut(nodes, *source)?.children, vec![target]);
            for child in old.into_iter().filter(|c| *c != target) {
                node_mut(nodes, child)?.parents.retain(|p| p != source);
            }
        }
        let sink = node_mut(nodes, target)?;
        for source in &unique {
            if !sink.parents.contains(source) {
                sink.parents.push(*source);
            }
        }
        Ok(())
    })?;
    validate::check_acyclic(joined.node_table())?;
    Ok(Applied::selecting(joined, target))
}

/// Remove a node and bridge every parent to every child.
pub fn delete_node(sheet: &Sheet, id: NodeId) -> Result<Applied, EditError> {
    let mut removed = None;
    let sheet = sheet.apply_mutation(|nodes| {
        removed = Some(detach(nodes, id)?);
        Ok(())
    })?;
    let selected = removed.and_then(|node| neighbour(&node));
    Ok(Applied { sheet, selected })
}

/// [`delete_node`], handing back the removed node's content for the clipboard.
pub fn cut_node(sheet: &Sheet, id: NodeId) -> Result<(Applied, NodeContent), EditError> {
    let mut removed = None;
    let sheet = sheet.apply_mutation(|nodes| {
        removed = Some(detach(nodes, id)?);
        Ok(())
    })?;
    let node = removed.ok_or(EditError::NodeNotFound(id))?;
    let selected = neighbour(&node);
    Ok((Applied { sheet, selected }, node.content()))
}

/// Insert a fresh node built from `content` with the relinking of the
/// matching insert operation.
pub fn paste_node(
    sheet: &Sheet,
    target: NodeId,
    position: PastePosition,
    new_id: NodeId,
    content: NodeContent,
) -> Result<Applied, EditError> {
    match position {
        PastePosition::Before => insert_before(sheet, target, new_id, content),
        PastePosition::After => insert_after(sheet, target, new_id, content),
        PastePosition::Sibling(side) => insert_sibling(sheet, target, side, new_id, content),
    }
}

fn detach(nodes: &mut NodeTable, id: NodeId) -> Result<Node, EditError> {
    let node = nodes.remove(&id).ok_or(EditError::NodeNotFound(id))?;
    for parent in &node.parents {
        splice(&mut node_mut(nodes, *parent)?.children, id, &node.children);
    }
    for child in &node.children {
        splice(&mut node_mut(nodes, *child)?.parents, id, &node.parents);
    }
    Ok(node)
}

fn neighbour(node: &Node) -> Option<NodeId> {
    node.parents.first().or_else(|| node.children.first()).copied()
}
