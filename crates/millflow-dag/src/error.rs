//! Error types for the MillFlow graph core
//!
//! Three classes, matching how callers are expected to react:
//! - not-found errors: a referenced id is missing, nothing changed
//! - preconditions: structurally impossible edits surfaced as no-ops
//! - invariant violations: programming errors, rejected before commit

use crate::types::{BlockerId, NodeId, NoteId, SheetId};
use std::path::PathBuf;

/// Failure of a mutation, lookup or editor command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("sheet not found: {0}")]
    SheetNotFound(SheetId),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("blocker {blocker} not found on node {node}")]
    BlockerNotFound { node: NodeId, blocker: BlockerId },

    #[error("note {note} not found on node {node}")]
    NoteNotFound { node: NodeId, note: NoteId },

    /// Structural precondition unmet; the editor reports these as no-ops
    #[error("precondition failed: {0}")]
    Precondition(#[from] Precondition),

    /// The edit would have corrupted the graph
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl EditError {
    #[inline]
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        matches!(self, EditError::Precondition(_))
    }

    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EditError::SheetNotFound(_)
                | EditError::NodeNotFound(_)
                | EditError::BlockerNotFound { .. }
                | EditError::NoteNotFound { .. }
        )
    }

    /// Unreachable through normal UI flows; worth a developer diagnostic
    #[inline]
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(self, EditError::Invariant(_))
    }
}

/// Reasons an edit was skipped without touching the graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Precondition {
    #[error("node {0} has no children to split from")]
    NoChildren(NodeId),

    #[error("clipboard is empty")]
    EmptyClipboard,

    #[error("no nodes given to join")]
    NothingToJoin,

    #[error("blocker {blocker} on node {node} is already resolved")]
    AlreadyResolved { node: NodeId, blocker: BlockerId },

    #[error("node {0} still has unresolved blockers")]
    UnresolvedBlockers(NodeId),

    #[error("node {0} already has that value")]
    Unchanged(NodeId),

    #[error("sheet {0} already has that name")]
    SheetUnchanged(SheetId),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

/// Graph corruption detected before a commit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("node {node} references missing node {missing}")]
    DanglingReference { node: NodeId, missing: NodeId },

    #[error("edge {parent} -> {child} is not mirrored on both ends")]
    AsymmetricEdge { parent: NodeId, child: NodeId },

    #[error("node {node} lists {other} more than once")]
    DuplicateEdge { node: NodeId, other: NodeId },

    #[error("node {0} is linked to itself")]
    SelfLoop(NodeId),

    #[error("node id {0} is already in use")]
    DuplicateId(NodeId),

    #[error("node {0} is stored under a different key")]
    KeyMismatch(NodeId),

    #[error("edit would create a cycle through {0}")]
    CycleDetected(NodeId),
}

/// Failure to import a serialized workspace
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("malformed workspace json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sheet {sheet} is not a valid graph: {source}")]
    InvalidSheet {
        sheet: SheetId,
        #[source]
        source: InvariantViolation,
    },

    #[error("sheet id {0} appears more than once")]
    DuplicateSheet(SheetId),

    #[error("unsupported workspace format version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Failure to read editor configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("history_limit must be at least 1")]
    ZeroHistoryLimit,
}
