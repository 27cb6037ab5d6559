//! Bounded linear undo/redo over whole-workspace snapshots.
//!
//! Entries hold the state *before* each recorded mutation. `cursor` points
//! at the entry the next undo restores plus one; `cursor == len` is the live
//! state. Snapshots are persistent maps, so an entry costs only the nodes
//! its mutation touched.

use crate::sheet::Workspace;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub workspace: Workspace,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    /// Live state parked while the cursor is behind the tip
    tip: Option<Workspace>,
    limit: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            cursor: 0,
            tip: None,
            limit: limit.max(1),
        }
    }

    /// Record the pre-mutation state. Drops any redo tail, then evicts the
    /// oldest entries beyond the limit.
    pub fn record(&mut self, before: Workspace, description: impl Into<String>) {
        self.entries.truncate(self.cursor);
        self.tip = None;
        self.entries.push_back(HistoryEntry {
            workspace: before,
            description: description.into(),
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len();
    }

    /// Step back, returning the state to restore. `current` is the live
    /// state, kept so a redo can return to it.
    pub fn undo(&mut self, current: &Workspace) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        if self.cursor == self.entries.len() {
            self.tip = Some(current.clone());
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward, returning the state to restore.
    pub fn redo(&mut self) -> Option<Workspace> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        match self.entries.get(self.cursor) {
            Some(entry) => Some(entry.workspace.clone()),
            None => self.tip.clone(),
        }
    }

    /// Description of the mutation the next undo reverts.
    pub fn undo_description(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|e| e.description.as_str())
    }

    /// Description of the mutation the next redo replays.
    pub fn redo_description(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|e| e.description.as_str())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
