//! Node records and the content they carry.

use crate::types::{
    BlockerId, BlockerKind, NodeId, NodeKind, NodeStatus, NoteId, PersonId, Timestamp,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One unit of work in a sheet.
///
/// `parents` and `children` are ordered sets: order is significant for
/// rendering and no id appears twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub status: NodeStatus,
    #[serde(default)]
    pub parents: Vec<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub assignees: BTreeSet<PersonId>,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Node {
    /// Freestanding node with no edges.
    pub fn from_content(id: NodeId, content: NodeContent) -> Self {
        let NodeContent {
            name,
            kind,
            status,
            assignees,
            blockers,
            notes,
        } = content;
        Self {
            id,
            name,
            kind,
            status,
            parents: Vec::new(),
            children: Vec::new(),
            assignees,
            blockers,
            notes,
        }
    }

    /// Deep copy of everything except identity and edges.
    pub fn content(&self) -> NodeContent {
        NodeContent {
            name: self.name.clone(),
            kind: self.kind,
            status: self.status,
            assignees: self.assignees.clone(),
            blockers: self.blockers.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_sink(&self) -> bool {
        self.children.is_empty()
    }

    pub fn unresolved_blockers(&self) -> impl Iterator<Item = &Blocker> {
        self.blockers.iter().filter(|b| !b.is_resolved())
    }

    pub fn has_unresolved_blockers(&self) -> bool {
        self.unresolved_blockers().next().is_some()
    }

    pub fn blocker(&self, id: BlockerId) -> Option<&Blocker> {
        self.blockers.iter().find(|b| b.id == id)
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Blocked -> ready once the last unresolved blocker is gone.
    pub(crate) fn recompute_blocked_status(&mut self) {
        if self.status == NodeStatus::Blocked && !self.has_unresolved_blockers() {
            self.status = NodeStatus::Ready;
        }
    }
}

/// Non-graph payload of a node: new-node data for inserts, and what the
/// clipboard holds after a cut.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeContent {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub status: NodeStatus,
    #[serde(default)]
    pub assignees: BTreeSet<PersonId>,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl NodeContent {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, person: PersonId) -> Self {
        self.assignees.insert(person);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// Attaching an unresolved blocker forces the status to blocked.
    #[must_use]
    pub fn with_blocker(mut self, blocker: Blocker) -> Self {
        if !blocker.is_resolved() {
            self.status = NodeStatus::Blocked;
        }
        self.blockers.push(blocker);
        self
    }
}

/// An impediment to progress on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    pub id: BlockerId,
    #[serde(rename = "type")]
    pub kind: BlockerKind,
    pub description: String,
    pub owner: String,
    #[serde(default)]
    pub expected_resolution: Option<NaiveDate>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub resolved_at: Option<Timestamp>,
}

impl Blocker {
    pub fn new(
        id: BlockerId,
        kind: BlockerKind,
        description: impl Into<String>,
        owner: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            kind,
            description: description.into(),
            owner: owner.into(),
            expected_resolution: None,
            created_at,
            resolved_at: None,
        }
    }

    #[must_use]
    pub fn expected_by(mut self, date: NaiveDate) -> Self {
        self.expected_resolution = Some(date);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub edited_at: Option<Timestamp>,
}

impl Note {
    pub fn new(
        id: NoteId,
        text: impl Into<String>,
        author: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            author: author.into(),
            source: None,
            created_at,
            edited_at: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
