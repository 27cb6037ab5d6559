//! Selection cursor over linearizer output.
//!
//! Purely presentational: it never touches the graph and is recomputed
//! against the current levels after every edit.

use crate::linearize::{position, Level};
use crate::types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Previous level
    Up,
    /// Next level
    Down,
    /// Previous parallel branch
    Left,
    /// Next parallel branch
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    node: Option<NodeId>,
    branch: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(node: NodeId, levels: &[Level]) -> Self {
        let mut cursor = Self::new();
        cursor.select(node, levels);
        cursor
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn branch(&self) -> usize {
        self.branch
    }

    /// Select `node`, picking up its branch index when it is placed.
    pub fn select(&mut self, node: NodeId, levels: &[Level]) {
        self.node = Some(node);
        self.branch = position(levels, node).map_or(0, |(_, branch)| branch);
    }

    pub fn clear(&mut self) {
        self.node = None;
        self.branch = 0;
    }

    /// Re-anchor after the levels changed. A vanished node falls back to the
    /// first node of level 0.
    pub fn resync(&mut self, levels: &[Level]) {
        match self.node.and_then(|n| position(levels, n)) {
            Some((_, branch)) => self.branch = branch,
            None => match levels.first().and_then(|l| l.nodes.first()) {
                Some(first) => {
                    self.node = Some(*first);
                    self.branch = 0;
                }
                None => self.clear(),
            },
        }
    }

    /// Apply a navigation step. Returns whether the selection moved.
    pub fn step(&mut self, movement: Move, levels: &[Level]) -> bool {
        let Some((level, branch)) = self.node.and_then(|n| position(levels, n)) else {
            self.resync(levels);
            return self.node.is_some();
        };
        let target = match movement {
            Move::Up => level.checked_sub(1).map(|l| (l, branch)),
            Move::Down => (level + 1 < levels.len()).then_some((level + 1, branch)),
            Move::Left => branch.checked_sub(1).map(|b| (level, b)),
            Move::Right => (branch + 1 < levels[level].nodes.len()).then_some((level, branch + 1)),
        };
        let Some((level, branch)) = target else {
            return false;
        };
        let nodes = &levels[level].nodes;
        let branch = branch.min(nodes.len().saturating_sub(1));
        match nodes.get(branch) {
            Some(node) => {
                self.node = Some(*node);
                self.branch = branch;
                true
            }
            None => false,
        }
    }
}
