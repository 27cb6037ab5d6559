//! Graph invariant checks and lints.
//!
//! Hard invariants ([`check_references`], [`check_acyclic`]) reject a commit.
//! Lints ([`lint`]) describe graphs that are legal but unexpected in steady
//! state and are only surfaced as warnings.

use crate::error::InvariantViolation;
use crate::linearize;
use crate::sheet::{NodeTable, Sheet};
use crate::types::NodeId;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashSet;
use std::fmt;

/// Every referenced id exists, edges are mirrored, no duplicates or self loops.
pub fn check_references(nodes: &NodeTable) -> Result<(), InvariantViolation> {
    for (key, node) in nodes.iter() {
        if *key != node.id {
            return Err(InvariantViolation::KeyMismatch(node.id));
        }
        check_list(nodes, node.id, &node.parents, Direction::Parents)?;
        check_list(nodes, node.id, &node.children, Direction::Children)?;
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Direction {
    Parents,
    Children,
}

fn check_list(
    nodes: &NodeTable,
    id: NodeId,
    list: &[NodeId],
    direction: Direction,
) -> Result<(), InvariantViolation> {
    for (i, other) in list.iter().copied().enumerate() {
        if other == id {
            return Err(InvariantViolation::SelfLoop(id));
        }
        if list[..i].contains(&other) {
            return Err(InvariantViolation::DuplicateEdge { node: id, other });
        }
        let Some(peer) = nodes.get(&other) else {
            return Err(InvariantViolation::DanglingReference { node: id, missing: other });
        };
        let mirrored = match direction {
            Direction::Parents => peer.children.contains(&id),
            Direction::Children => peer.parents.contains(&id),
        };
        if !mirrored {
            let (parent, child) = match direction {
                Direction::Parents => (other, id),
                Direction::Children => (id, other),
            };
            return Err(InvariantViolation::AsymmetricEdge { parent, child });
        }
    }
    Ok(())
}

/// Reject any directed cycle along `children` edges.
pub fn check_acyclic(nodes: &NodeTable) -> Result<(), InvariantViolation> {
    let mut graph: DiGraphMap<NodeId, ()> = DiGraphMap::with_capacity(nodes.len(), nodes.len());
    for node in nodes.values() {
        graph.add_node(node.id);
        for child in &node.children {
            graph.add_edge(node.id, *child, ());
        }
    }
    match toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(cycle) => Err(InvariantViolation::CycleDetected(cycle.node_id())),
    }
}

/// Full structural validation, as applied to graphs loaded from outside.
pub fn check_sheet(sheet: &Sheet) -> Result<(), InvariantViolation> {
    check_references(sheet.node_table())?;
    check_acyclic(sheet.node_table())
}

/// Legal but suspicious graph shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lint {
    /// More than one zero-parent node
    MultipleRoots(Vec<NodeId>),
    /// Non-empty sheet in which every node has a parent
    NoRoot,
    /// Nodes the linearizer never reaches
    Unlinearized(Vec<NodeId>),
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lint::MultipleRoots(roots) => write!(f, "sheet has {} roots", roots.len()),
            Lint::NoRoot => f.write_str("sheet has no root"),
            Lint::Unlinearized(nodes) => {
                write!(f, "{} nodes are unreachable from any root", nodes.len())
            }
        }
    }
}

pub fn lint(sheet: &Sheet) -> Vec<Lint> {
    let mut lints = Vec::new();
    if sheet.is_empty() {
        return lints;
    }

    let roots = sheet.roots();
    match roots.len() {
        0 => lints.push(Lint::NoRoot),
        1 => {}
        _ => lints.push(Lint::MultipleRoots(roots)),
    }

    let placed: HashSet<NodeId> = linearize::levels(sheet)
        .flat_map(|level| level.nodes)
        .collect();
    if placed.len() < sheet.len() {
        let missing = sheet
            .nodes()
            .map(|n| n.id)
            .filter(|id| !placed.contains(id))
            .collect();
        lints.push(Lint::Unlinearized(missing));
    }
    lints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeContent};
    use crate::ops;
    use crate::types::{JobId, SheetId, Side};
    use pretty_assertions::assert_eq;

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    fn table(edges: &[(u128, u128)], count: u128) -> NodeTable {
        let mut nodes = NodeTable::new();
        for n in 1..=count {
            nodes.insert(id(n), Node::from_content(id(n), NodeContent::named(format!("n{n}"))));
        }
        for (from, to) in edges {
            nodes.get_mut(&id(*from)).unwrap().children.push(id(*to));
            nodes.get_mut(&id(*to)).unwrap().parents.push(id(*from));
        }
        nodes
    }

    #[test]
    fn consistent_chain_passes() {
        let nodes = table(&[(1, 2), (2, 3)], 3);
        assert!(check_references(&nodes).is_ok());
        assert!(check_acyclic(&nodes).is_ok());
    }

    #[test]
    fn one_sided_edge_is_rejected() {
        let mut nodes = table(&[(1, 2)], 2);
        nodes.get_mut(&id(2)).unwrap().parents.clear();
        assert_eq!(
            check_references(&nodes),
            Err(InvariantViolation::AsymmetricEdge { parent: id(1), child: id(2) })
        );
    }

    #[test]
    fn duplicate_edge_is_rejected() {
        let mut nodes = table(&[(1, 2)], 2);
        nodes.get_mut(&id(1)).unwrap().children.push(id(2));
        assert_eq!(
            check_references(&nodes),
            Err(InvariantViolation::DuplicateEdge { node: id(1), other: id(2) })
        );
    }

    #[test]
    fn self_loop_is_rejected() {
        let nodes = table(&[(1, 1)], 1);
        assert_eq!(check_references(&nodes), Err(InvariantViolation::SelfLoop(id(1))));
    }

    #[test]
    fn cycle_is_detected() {
        let nodes = table(&[(1, 2), (2, 3), (3, 1)], 3);
        assert!(check_references(&nodes).is_ok());
        assert!(matches!(
            check_acyclic(&nodes),
            Err(InvariantViolation::CycleDetected(_))
        ));
    }

    fn empty_sheet() -> Sheet {
        Sheet::new(SheetId::from_u128(1), JobId::new("j"), "s")
    }

    #[test]
    fn join_that_orphans_a_child_lints_multiple_roots() {
        // A -> {B, C}, B -> D; pointing B at C leaves D without a parent
        let sheet = Sheet::with_root(
            SheetId::from_u128(1),
            JobId::new("j"),
            "s",
            id(1),
            NodeContent::named("A"),
        );
        let sheet = ops::insert_after(&sheet, id(1), id(2), NodeContent::named("B"))
            .unwrap()
            .sheet;
        let sheet = ops::insert_sibling(&sheet, id(2), Side::Right, id(3), NodeContent::named("C"))
            .unwrap()
            .sheet;
        let sheet = ops::insert_after(&sheet, id(2), id(4), NodeContent::named("D"))
            .unwrap()
            .sheet;
        assert!(lint(&sheet).is_empty());

        let sheet = ops::join(&sheet, &[id(2)], id(3)).unwrap().sheet;

        assert_eq!(lint(&sheet), vec![Lint::MultipleRoots(vec![id(1), id(4)])]);
    }

    #[test]
    fn loaded_cycle_lints_no_root_and_unplaced_nodes() {
        let sheet = empty_sheet()
            .apply_mutation(|nodes| {
                *nodes = table(&[(1, 2), (2, 1)], 2);
                Ok(())
            })
            .unwrap();

        assert!(check_sheet(&sheet).is_err());
        assert_eq!(lint(&sheet), vec![Lint::NoRoot, Lint::Unlinearized(vec![id(1), id(2)])]);
    }

    #[test]
    fn empty_sheet_has_no_lints() {
        assert!(lint(&empty_sheet()).is_empty());
    }
}
