//! Editing session.
//!
//! [`Editor`] owns the mutable state around the pure operations in
//! [`crate::ops`]: the workspace, undo history, clipboard, cursor, level
//! cache and change listeners. Each command looks up the sheet, runs the
//! operation against it and, on success, records the previous workspace and
//! swaps the new sheet in.

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::cursor::{Cursor, Move};
use crate::error::{EditError, Precondition};
use crate::history::History;
use crate::ids::{IdGenerator, RandomIds};
use crate::linearize::{Level, LevelCache};
use crate::node::{Blocker, Node, NodeContent, Note};
use crate::ops::{self, Applied};
use crate::sheet::{Sheet, Workspace};
use crate::types::{
    now_timestamp, BlockerId, BlockerKind, JobId, NodeId, NodeKind, NodeStatus, NoteId,
    PastePosition, PersonId, SheetId, Side,
};
use crate::validate::{self, Lint};
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied { selected: Option<NodeId> },
    /// Nothing changed; the reason is not worth interrupting the user over
    NoOp(Precondition),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Mutated { sheet: Option<SheetId>, description: String },
    Skipped { reason: Precondition },
    Undone { description: String },
    Redone { description: Option<String> },
}

type Listener = Box<dyn FnMut(&EditorEvent)>;

pub struct Editor<G: IdGenerator = RandomIds> {
    config: EditorConfig,
    workspace: Workspace,
    active: Option<SheetId>,
    cursor: Cursor,
    clipboard: Option<Clipboard>,
    history: History,
    ids: G,
    levels: LevelCache,
    revision: u64,
    listeners: Vec<Listener>,
}

impl Editor<RandomIds> {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_ids(config, RandomIds)
    }
}

impl Default for Editor<RandomIds> {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl<G: IdGenerator> fmt::Debug for Editor<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("config", &self.config)
            .field("sheets", &self.workspace.len())
            .field("active", &self.active)
            .field("cursor", &self.cursor)
            .field("history", &self.history.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<G: IdGenerator> Editor<G> {
    pub fn with_ids(config: EditorConfig, ids: G) -> Self {
        Self::from_workspace(Workspace::new(), config, ids)
    }

    /// Start a session over an existing workspace, e.g. one just loaded.
    pub fn from_workspace(workspace: Workspace, config: EditorConfig, ids: G) -> Self {
        let history = History::with_limit(config.history_limit);
        let mut editor = Self {
            config,
            workspace,
            active: None,
            cursor: Cursor::new(),
            clipboard: None,
            history,
            ids,
            levels: LevelCache::new(),
            revision: 0,
            listeners: Vec::new(),
        };
        let sheet_ids: Vec<SheetId> = editor.workspace.sheets().map(|s| s.id).collect();
        for id in sheet_ids {
            let revision = editor.next_revision();
            if let Ok(sheet) = editor.workspace.sheet_mut(id) {
                sheet.stamp(revision);
            }
        }
        editor.active = editor.workspace.sheets().next().map(|s| s.id);
        editor.resync_cursor();
        editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn into_workspace(self) -> Workspace {
        self.workspace
    }

    pub fn sheet(&self, id: SheetId) -> Result<&Sheet, EditError> {
        self.workspace.sheet(id)
    }

    pub fn node(&self, sheet: SheetId, id: NodeId) -> Result<&Node, EditError> {
        self.workspace.sheet(sheet)?.get_node(id)
    }

    pub fn active_sheet(&self) -> Option<SheetId> {
        self.active
    }

    pub fn set_active(&mut self, sheet: SheetId) -> Result<(), EditError> {
        self.workspace.sheet(sheet)?;
        if self.active != Some(sheet) {
            self.active = Some(sheet);
            self.cursor.clear();
            self.resync_cursor();
        }
        Ok(())
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Display levels of a sheet, memoized per revision.
    pub fn levels(&mut self, sheet: SheetId) -> Result<Arc<Vec<Level>>, EditError> {
        let sheet = self.workspace.sheet(sheet)?;
        Ok(self.levels.get(sheet))
    }

    /// Lints for a sheet, minus those the configuration switches off.
    pub fn lints(&self, sheet: SheetId) -> Result<Vec<Lint>, EditError> {
        Ok(self.reported_lints(self.workspace.sheet(sheet)?))
    }

    fn reported_lints(&self, sheet: &Sheet) -> Vec<Lint> {
        let mut lints = validate::lint(sheet);
        if !self.config.lint_multiple_roots {
            lints.retain(|lint| !matches!(lint, Lint::MultipleRoots(_)));
        }
        lints
    }

    pub fn select(&mut self, sheet: SheetId, node: NodeId) -> Result<(), EditError> {
        self.workspace.sheet(sheet)?.get_node(node)?;
        self.active = Some(sheet);
        self.place_cursor(sheet, Some(node));
        Ok(())
    }

    /// Move the cursor within the active sheet.
    pub fn navigate(&mut self, movement: Move) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let Ok(sheet) = self.workspace.sheet(active) else {
            return false;
        };
        let levels = self.levels.get(sheet);
        self.cursor.step(movement, &levels)
    }

    // ---- sheets ----

    /// Create a sheet holding one start node and make it active.
    pub fn create_sheet(
        &mut self,
        job: JobId,
        name: impl Into<String>,
        root: NodeContent,
    ) -> (SheetId, NodeId) {
        let sheet_id: SheetId = self.ids.next_id();
        let root_id: NodeId = self.ids.next_id();
        let name = name.into();
        let description = format!("create sheet {name}");
        let mut sheet = Sheet::with_root(sheet_id, job, name, root_id, root);
        sheet.stamp(self.next_revision());

        self.history.record(self.workspace.clone(), description.clone());
        self.workspace.insert(sheet);
        self.active = Some(sheet_id);
        self.place_cursor(sheet_id, Some(root_id));
        tracing::debug!(sheet = %sheet_id, "{description}");
        self.emit(EditorEvent::Mutated {
            sheet: Some(sheet_id),
            description,
        });
        (sheet_id, root_id)
    }

    pub fn rename_sheet(
        &mut self,
        sheet: SheetId,
        name: impl Into<String>,
    ) -> Result<Outcome, EditError> {
        let name = name.into();
        let description = format!("rename sheet to {name}");
        self.commit(sheet, description, |s| {
            if s.name == name {
                return Err(Precondition::SheetUnchanged(s.id).into());
            }
            Ok(Applied {
                sheet: s.renamed(name),
                selected: None,
            })
        })
    }

    pub fn remove_sheet(&mut self, sheet: SheetId) -> Result<Outcome, EditError> {
        let removed_name = self.workspace.sheet(sheet)?.name.clone();
        let description = format!("remove sheet {removed_name}");
        self.history.record(self.workspace.clone(), description.clone());
        self.workspace.remove(sheet);
        if self.active == Some(sheet) {
            self.active = self.workspace.sheets().next().map(|s| s.id);
            self.cursor.clear();
        }
        self.resync_cursor();
        tracing::debug!(sheet = %sheet, "{description}");
        self.emit(EditorEvent::Mutated {
            sheet: None,
            description,
        });
        Ok(Outcome::Applied {
            selected: self.cursor.node(),
        })
    }

    // ---- graph shape ----

    pub fn insert_after(
        &mut self,
        sheet: SheetId,
        target: NodeId,
        content: NodeContent,
    ) -> Result<Outcome, EditError> {
        let new_id: NodeId = self.ids.next_id();
        let description = format!("insert {} after", content.name);
        self.commit(sheet, description, |s| ops::insert_after(s, target, new_id, content))
    }

    pub fn insert_before(
        &mut self,
        sheet: SheetId,
        target: NodeId,
        content: NodeContent,
    ) -> Result<Outcome, EditError> {
        let new_id: NodeId = self.ids.next_id();
        let description = format!("insert {} before", content.name);
        self.commit(sheet, description, |s| ops::insert_before(s, target, new_id, content))
    }

    pub fn insert_sibling(
        &mut self,
        sheet: SheetId,
        target: NodeId,
        side: Side,
        content: NodeContent,
    ) -> Result<Outcome, EditError> {
        let new_id: NodeId = self.ids.next_id();
        let description = format!("insert sibling {}", content.name);
        self.commit(sheet, description, |s| {
            ops::insert_sibling(s, target, side, new_id, content)
        })
    }

    pub fn split(
        &mut self,
        sheet: SheetId,
        target: NodeId,
        content: NodeContent,
    ) -> Result<Outcome, EditError> {
        let new_id: NodeId = self.ids.next_id();
        let description = format!("split into {}", content.name);
        self.commit(sheet, description, |s| ops::split(s, target, new_id, content))
    }

    pub fn join(
        &mut self,
        sheet: SheetId,
        sources: &[NodeId],
        target: NodeId,
    ) -> Result<Outcome, EditError> {
        let description = format!("join {} branches", sources.len());
        self.commit(sheet, description, |s| ops::join(s, sources, target))
    }

    pub fn delete_node(&mut self, sheet: SheetId, id: NodeId) -> Result<Outcome, EditError> {
        let description = format!("delete {}", self.node_name(sheet, id));
        self.commit(sheet, description, |s| ops::delete_node(s, id))
    }

    /// Delete a node and keep its content for pasting.
    pub fn cut_node(&mut self, sheet: SheetId, id: NodeId) -> Result<Outcome, EditError> {
        let description = format!("cut {}", self.node_name(sheet, id));
        let mut cut = None;
        let outcome = self.commit(sheet, description, |s| {
            let (applied, content) = ops::cut_node(s, id)?;
            cut = Some(content);
            Ok(applied)
        })?;
        if let Some(content) = cut {
            self.clipboard = Some(Clipboard::new(content, sheet));
        }
        Ok(outcome)
    }

    /// Paste the clipboard as a fresh node. The clipboard is kept.
    pub fn paste_node(
        &mut self,
        sheet: SheetId,
        target: NodeId,
        position: PastePosition,
    ) -> Result<Outcome, EditError> {
        let Some(clipboard) = self.clipboard.clone() else {
            return self.reject(Precondition::EmptyClipboard.into(), "paste");
        };
        let new_id: NodeId = self.ids.next_id();
        let description = format!("paste {}", clipboard.content.name);
        self.commit(sheet, description, |s| {
            ops::paste_node(s, target, position, new_id, clipboard.content)
        })
    }

    // ---- node content ----

    pub fn rename(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        name: impl Into<String>,
    ) -> Result<Outcome, EditError> {
        let name = name.into();
        let description = format!("rename to {name}");
        self.commit(sheet, description, |s| ops::rename(s, id, name))
    }

    pub fn set_kind(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        kind: NodeKind,
    ) -> Result<Outcome, EditError> {
        let description = format!("set type {}", kind.label());
        self.commit(sheet, description, |s| ops::set_kind(s, id, kind))
    }

    pub fn set_status(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        status: NodeStatus,
    ) -> Result<Outcome, EditError> {
        let description = format!("set status {}", status.label());
        self.commit(sheet, description, |s| ops::set_status(s, id, status))
    }

    pub fn assign(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        person: PersonId,
    ) -> Result<Outcome, EditError> {
        let description = format!("assign {person}");
        self.commit(sheet, description, |s| ops::assign(s, id, person))
    }

    pub fn unassign(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        person: &PersonId,
    ) -> Result<Outcome, EditError> {
        let description = format!("unassign {person}");
        self.commit(sheet, description, |s| ops::unassign(s, id, person))
    }

    /// Attach a new unresolved blocker; returns its id when applied.
    pub fn add_blocker(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        kind: BlockerKind,
        description: impl Into<String>,
        owner: impl Into<String>,
        expected_resolution: Option<NaiveDate>,
    ) -> Result<BlockerId, EditError> {
        let blocker_id: BlockerId = self.ids.next_id();
        let mut blocker = Blocker::new(blocker_id, kind, description, owner, now_timestamp());
        blocker.expected_resolution = expected_resolution;
        let label = format!("block on {}", blocker.description);
        self.commit(sheet, label, |s| ops::add_blocker(s, id, blocker))?;
        Ok(blocker_id)
    }

    pub fn resolve_blocker(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        blocker: BlockerId,
    ) -> Result<Outcome, EditError> {
        self.commit(sheet, "resolve blocker".to_string(), |s| {
            ops::resolve_blocker(s, id, blocker, now_timestamp())
        })
    }

    pub fn remove_blocker(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        blocker: BlockerId,
    ) -> Result<Outcome, EditError> {
        self.commit(sheet, "remove blocker".to_string(), |s| {
            ops::remove_blocker(s, id, blocker)
        })
    }

    pub fn add_note(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        text: impl Into<String>,
        author: impl Into<String>,
        source: Option<String>,
    ) -> Result<NoteId, EditError> {
        let note_id: NoteId = self.ids.next_id();
        let mut note = Note::new(note_id, text, author, now_timestamp());
        note.source = source;
        self.commit(sheet, "add note".to_string(), |s| ops::add_note(s, id, note))?;
        Ok(note_id)
    }

    pub fn edit_note(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        note: NoteId,
        text: impl Into<String>,
    ) -> Result<Outcome, EditError> {
        let text = text.into();
        self.commit(sheet, "edit note".to_string(), |s| {
            ops::edit_note(s, id, note, text, now_timestamp())
        })
    }

    pub fn delete_note(
        &mut self,
        sheet: SheetId,
        id: NodeId,
        note: NoteId,
    ) -> Result<Outcome, EditError> {
        self.commit(sheet, "delete note".to_string(), |s| ops::delete_note(s, id, note))
    }

    // ---- history ----

    pub fn undo(&mut self) -> Outcome {
        let Some(entry) = self.history.undo(&self.workspace) else {
            return Outcome::NoOp(Precondition::NothingToUndo);
        };
        let description = entry.description.clone();
        self.workspace = entry.workspace.clone();
        self.after_restore();
        tracing::debug!("undo {description}");
        self.emit(EditorEvent::Undone { description });
        Outcome::Applied {
            selected: self.cursor.node(),
        }
    }

    pub fn redo(&mut self) -> Outcome {
        let description = self.history.redo_description().map(str::to_string);
        let Some(workspace) = self.history.redo() else {
            return Outcome::NoOp(Precondition::NothingToRedo);
        };
        self.workspace = workspace;
        self.after_restore();
        tracing::debug!(?description, "redo");
        self.emit(EditorEvent::Redone { description });
        Outcome::Applied {
            selected: self.cursor.node(),
        }
    }

    // ---- internals ----

    fn commit<F>(
        &mut self,
        sheet: SheetId,
        description: String,
        op: F,
    ) -> Result<Outcome, EditError>
    where
        F: FnOnce(&Sheet) -> Result<Applied, EditError>,
    {
        let current = self.workspace.sheet(sheet)?;
        let strict = self.config.check_acyclic_on_every_commit;
        let result = op(current).and_then(|applied| {
            if strict {
                validate::check_acyclic(applied.sheet.node_table())?;
            }
            Ok(applied)
        });
        match result {
            Ok(applied) => Ok(self.accept(applied, description)),
            Err(err) => self.reject(err, &description),
        }
    }

    fn accept(&mut self, applied: Applied, description: String) -> Outcome {
        let Applied { mut sheet, selected } = applied;
        let sheet_id = sheet.id;
        sheet.stamp(self.next_revision());

        for lint in self.reported_lints(&sheet) {
            tracing::warn!(sheet = %sheet_id, "{lint}");
        }

        self.history.record(self.workspace.clone(), description.clone());
        self.workspace.insert(sheet);
        self.active = Some(sheet_id);
        self.place_cursor(sheet_id, selected);
        tracing::debug!(sheet = %sheet_id, ?selected, "{description}");
        self.emit(EditorEvent::Mutated {
            sheet: Some(sheet_id),
            description,
        });
        Outcome::Applied { selected }
    }

    fn reject(&mut self, err: EditError, description: &str) -> Result<Outcome, EditError> {
        match err {
            EditError::Precondition(reason) => {
                tracing::debug!(%reason, "{description} skipped");
                self.emit(EditorEvent::Skipped {
                    reason: reason.clone(),
                });
                Ok(Outcome::NoOp(reason))
            }
            EditError::Invariant(ref violation) => {
                tracing::error!(%violation, "{description} rejected");
                #[cfg(feature = "strict-debug")]
                panic!("invariant violation during {description}: {violation}");

                Err(err)
            }
            other => {
                tracing::warn!(error = %other, "{description} failed");
                Err(other)
            }
        }
    }

    fn after_restore(&mut self) {
        if self.active.map_or(true, |id| !self.workspace.contains(id)) {
            self.active = self.workspace.sheets().next().map(|s| s.id);
        }
        self.resync_cursor();
    }

    fn place_cursor(&mut self, sheet: SheetId, selected: Option<NodeId>) {
        let Ok(current) = self.workspace.sheet(sheet) else {
            self.cursor.clear();
            return;
        };
        let levels = self.levels.get(current);
        match selected {
            Some(node) => self.cursor.select(node, &levels),
            None => self.cursor.resync(&levels),
        }
    }

    fn resync_cursor(&mut self) {
        let Some(active) = self.active else {
            self.cursor.clear();
            return;
        };
        let Ok(current) = self.workspace.sheet(active) else {
            self.cursor.clear();
            return;
        };
        let levels = self.levels.get(current);
        self.cursor.resync(&levels);
    }

    fn node_name(&self, sheet: SheetId, id: NodeId) -> String {
        self.node(sheet, id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn emit(&mut self, event: EditorEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}
