//! Linearizer: turns a sheet's graph into ordered display levels.
//!
//! Level 0 holds every zero-parent node (id order). Level N+1 is the
//! first-seen-order union of the children of level N, minus any child that
//! still has a parent outside the visited set; such a child is proposed again
//! once its last parent is visited, so a join lands one level after its
//! deepest parent.

use crate::sheet::Sheet;
use crate::types::{NodeId, SheetId};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Nodes at the same depth, running in parallel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
    pub index: usize,
    pub nodes: Vec<NodeId>,
}

impl Level {
    pub fn is_parallel(&self) -> bool {
        self.nodes.len() > 1
    }

    pub fn branch_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| *n == id)
    }
}

/// Lazy level sequence over a borrowed sheet. Call [`levels`] again to
/// restart.
#[derive(Debug)]
pub struct Levels<'a> {
    sheet: &'a Sheet,
    frontier: Vec<NodeId>,
    visited: HashSet<NodeId>,
    index: usize,
}

pub fn levels(sheet: &Sheet) -> Levels<'_> {
    Levels {
        sheet,
        frontier: sheet.roots(),
        visited: HashSet::with_capacity(sheet.len()),
        index: 0,
    }
}

/// Collected form of [`levels`].
pub fn linearize(sheet: &Sheet) -> Vec<Level> {
    levels(sheet).collect()
}

impl Levels<'_> {
    fn ready(&self, id: NodeId) -> bool {
        self.sheet
            .get_node(id)
            .map(|node| node.parents.iter().all(|p| self.visited.contains(p)))
            .unwrap_or(false)
    }
}

impl Iterator for Levels<'_> {
    type Item = Level;

    fn next(&mut self) -> Option<Level> {
        if self.frontier.is_empty() {
            return None;
        }
        let current = std::mem::take(&mut self.frontier);
        self.visited.extend(current.iter().copied());

        let mut next = Vec::new();
        for id in &current {
            let Ok(node) = self.sheet.get_node(*id) else {
                continue;
            };
            for child in &node.children {
                if self.visited.contains(child) || next.contains(child) {
                    continue;
                }
                if self.ready(*child) {
                    next.push(*child);
                }
            }
        }
        self.frontier = next;

        let level = Level {
            index: self.index,
            nodes: current,
        };
        self.index += 1;
        Some(level)
    }
}

/// (level, branch) coordinates of a node.
pub fn position(levels: &[Level], id: NodeId) -> Option<(usize, usize)> {
    levels
        .iter()
        .enumerate()
        .find_map(|(li, level)| level.branch_of(id).map(|bi| (li, bi)))
}

/// Memoized levels keyed on sheet id and revision stamp.
///
/// Unstamped sheets (revision 0) are never cached.
#[derive(Debug, Default)]
pub struct LevelCache {
    key: Option<(SheetId, u64)>,
    levels: Arc<Vec<Level>>,
}

impl LevelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, sheet: &Sheet) -> Arc<Vec<Level>> {
        let key = (sheet.id, sheet.revision());
        if sheet.revision() != 0 && self.key == Some(key) {
            return Arc::clone(&self.levels);
        }
        self.levels = Arc::new(linearize(sheet));
        self.key = (sheet.revision() != 0).then_some(key);
        Arc::clone(&self.levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeContent;
    use crate::ops;
    use crate::types::JobId;

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

    fn ids(levels: &[Level]) -> Vec<Vec<NodeId>> {
        levels.iter().map(|l| l.nodes.clone()).collect()
    }

    #[test]
    fn chain_is_one_node_per_level() {
        let sheet = chain_abc();
        assert_eq!(ids(&linearize(&sheet)), vec![vec![id(1)], vec![id(2)], vec![id(3)]]);
    }

    fn chain_abc() -> Sheet {
        let sheet = start();
        let sheet = ops::insert_after(&sheet, id(1), id(2), NodeContent::named("B"))
            .unwrap()
            .sheet;
        ops::insert_after(&sheet, id(2), id(3), NodeContent::named("C"))
            .unwrap()
            .sheet
    }

    #[test]
    fn split_renders_as_a_detour() {
        // A -> {B, D}, D -> B: B waits for D
        let sheet = chain_abc();
        let sheet = ops::split(&sheet, id(1), id(4), NodeContent::named("D")).unwrap().sheet;
        let levels = linearize(&sheet);
        assert_eq!(ids(&levels), vec![vec![id(1)], vec![id(4)], vec![id(2)], vec![id(3)]]);
        assert!(levels.iter().all(|l| !l.is_parallel()));
        assert_eq!(position(&levels, id(4)), Some((1, 0)));
        assert_eq!(position(&levels, id(2)), Some((2, 0)));
    }

    #[test]
    fn sibling_produces_parallel_level() {
        let sheet = chain_abc();
        let sheet = ops::insert_sibling(
            &sheet,
            id(2),
            crate::types::Side::Right,
            id(4),
            NodeContent::named("D"),
        )
        .unwrap()
        .sheet;
        let levels = linearize(&sheet);
        assert_eq!(ids(&levels), vec![vec![id(1)], vec![id(2), id(4)], vec![id(3)]]);
        assert!(levels[1].is_parallel());
        assert_eq!(position(&levels, id(4)), Some((1, 1)));
    }

    #[test]
    fn join_waits_for_deepest_parent() {
        // A -> B -> C, A -> C
        let sheet = chain_abc();
        let sheet = ops::insert_sibling(
            &sheet,
            id(2),
            crate::types::Side::Right,
            id(4),
            NodeContent::named("D"),
        )
        .unwrap()
        .sheet;
        let sheet = ops::insert_after(&sheet, id(2), id(5), NodeContent::named("E"))
            .unwrap()
            .sheet;
        // A -> {B, D}; B -> E -> C; D -> C
        let levels = linearize(&sheet);
        assert_eq!(
            ids(&levels),
            vec![vec![id(1)], vec![id(2), id(4)], vec![id(5)], vec![id(3)]]
        );
    }

    #[test]
    fn multiple_roots_share_level_zero() {
        let mut sheet = start();
        sheet = sheet
            .apply_mutation(|nodes| {
                let node = crate::node::Node::from_content(id(9), NodeContent::named("Z"));
                nodes.insert(id(9), node);
                Ok(())
            })
            .unwrap();
        let levels = linearize(&sheet);
        assert_eq!(ids(&levels), vec![vec![id(1), id(9)]]);
    }

    #[test]
    fn empty_sheet_has_no_levels() {
        let sheet = Sheet::new(SheetId::from_u128(1), JobId::new("j"), "s");
        assert!(linearize(&sheet).is_empty());
    }

    #[test]
    fn levels_restart() {
        let sheet = start();
        let sheet = ops::insert_after(&sheet, id(1), id(2), NodeContent::named("B")).unwrap().sheet;
        let first: Vec<_> = levels(&sheet).collect();
        let second: Vec<_> = levels(&sheet).collect();
        assert_eq!(first, second);
        assert_eq!(levels(&sheet).take(1).count(), 1);
    }

    #[test]
    fn cache_hits_on_same_revision() {
        let mut sheet = start();
        sheet.stamp(7);
        let mut cache = LevelCache::new();
        let a = cache.get(&sheet);
        let b = cache.get(&sheet);
        assert!(Arc::ptr_eq(&a, &b));

        sheet.stamp(8);
        let c = cache.get(&sheet);
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
