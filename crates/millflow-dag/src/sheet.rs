//! Graph storage.
//!
//! A [`Sheet`] owns its nodes in a persistent ordered map, so cloning a sheet
//! (for a history snapshot or a working copy) shares every untouched node
//! record and only the nodes a mutation writes get copied.

use crate::error::EditError;
use crate::node::{Node, NodeContent};
use crate::types::{JobId, NodeId, SheetId};
use crate::validate;
use serde::{Deserialize, Serialize};

/// Node arena keyed by id.
pub type NodeTable = im::OrdMap<NodeId, Node>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub id: SheetId,
    pub job: JobId,
    pub name: String,
    #[serde(with = "node_list")]
    nodes: NodeTable,
    /// Identity stamp of `nodes`, assigned by the editor on commit
    #[serde(skip)]
    revision: u64,
}

impl PartialEq for Sheet {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.job == other.job
            && self.name == other.name
            && self.nodes == other.nodes
    }
}

impl Eq for Sheet {}

impl Sheet {
    /// Empty sheet. Only transiently valid for the UI, which expects a root.
    pub fn new(id: SheetId, job: JobId, name: impl Into<String>) -> Self {
        Self {
            id,
            job,
            name: name.into(),
            nodes: NodeTable::new(),
            revision: 0,
        }
    }

    /// Sheet holding a single freestanding start node.
    pub fn with_root(
        id: SheetId,
        job: JobId,
        name: impl Into<String>,
        root: NodeId,
        content: NodeContent,
    ) -> Self {
        let mut sheet = Self::new(id, job, name);
        sheet.nodes.insert(root, Node::from_content(root, content));
        sheet
    }

    pub fn get_node(&self, id: NodeId) -> Result<&Node, EditError> {
        self.nodes.get(&id).ok_or(EditError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_table(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Zero-parent nodes in id order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_root())
            .map(|n| n.id)
            .collect()
    }

    /// Zero-children nodes in id order.
    pub fn sinks(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_sink())
            .map(|n| n.id)
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.children.len()).sum()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn stamp(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Run `f` against a working copy of the node table and commit the
    /// result as a new, unstamped sheet.
    ///
    /// The copy is discarded if `f` fails or leaves a dangling, duplicated,
    /// self-referencing or one-sided edge behind, so `self` is never
    /// partially updated.
    pub fn apply_mutation<F>(&self, f: F) -> Result<Sheet, EditError>
    where
        F: FnOnce(&mut NodeTable) -> Result<(), EditError>,
    {
        let mut nodes = self.nodes.clone();
        f(&mut nodes)?;
        validate::check_references(&nodes)?;
        Ok(Sheet {
            id: self.id,
            job: self.job.clone(),
            name: self.name.clone(),
            nodes,
            revision: 0,
        })
    }

    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Sheet {
        Sheet {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Every sheet in the editing session. This is the unit history snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    sheets: im::OrdMap<SheetId, Sheet>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, id: SheetId) -> Result<&Sheet, EditError> {
        self.sheets.get(&id).ok_or(EditError::SheetNotFound(id))
    }

    pub fn sheet_mut(&mut self, id: SheetId) -> Result<&mut Sheet, EditError> {
        self.sheets.get_mut(&id).ok_or(EditError::SheetNotFound(id))
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    pub fn sheets_for_job<'a>(&'a self, job: &'a JobId) -> impl Iterator<Item = &'a Sheet> + 'a {
        self.sheets.values().filter(move |s| &s.job == job)
    }

    pub fn contains(&self, id: SheetId) -> bool {
        self.sheets.contains_key(&id)
    }

    /// Insert or replace a sheet, returning the previous one.
    pub fn insert(&mut self, sheet: Sheet) -> Option<Sheet> {
        self.sheets.insert(sheet.id, sheet)
    }

    pub fn remove(&mut self, id: SheetId) -> Option<Sheet> {
        self.sheets.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl FromIterator<Sheet> for Workspace {
    fn from_iter<I: IntoIterator<Item = Sheet>>(iter: I) -> Self {
        let mut workspace = Workspace::new();
        for sheet in iter {
            workspace.insert(sheet);
        }
        workspace
    }
}

/// Nodes travel as a plain list; duplicate ids are rejected on the way in.
mod node_list {
    use super::NodeTable;
    use crate::node::Node;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(nodes: &NodeTable, ser: S) -> Result<S::Ok, S::Error> {
        let list: Vec<&Node> = nodes.values().collect();
        list.serialize(ser)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NodeTable, D::Error> {
        let list = Vec::<Node>::deserialize(de)?;
        let mut nodes = NodeTable::new();
        for node in list {
            let id = node.id;
            if nodes.insert(id, node).is_some() {
                return Err(D::Error::custom(format!("duplicate node id {id}")));
            }
        }
        Ok(nodes)
    }
}
