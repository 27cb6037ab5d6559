//! MillFlow workflow graph core
//!
//! Job workflows in a woodworking shop are drawn as sheets of operations
//! linked into a directed acyclic graph. This crate holds:
//! - graph storage with parent/child consistency enforced on every commit
//! - the structural edits (insert, split, join, delete, cut/paste) as pure
//!   functions from one sheet to the next
//! - the linearizer that lays a sheet out as display levels
//! - an editing session with bounded undo/redo, clipboard and cursor
//!
//! # Example
//!
//! ```rust
//! use millflow_dag::prelude::*;
//!
//! let mut editor = Editor::default();
//! let (sheet, start) =
//!     editor.create_sheet(JobId::new("J-1"), "Cabinets", NodeContent::named("Cut"));
//! editor.insert_after(sheet, start, NodeContent::named("Sand")).unwrap();
//!
//! let levels = editor.levels(sheet).unwrap();
//! assert_eq!(levels.len(), 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod clipboard;
pub mod config;
pub mod cursor;
pub mod demo;
pub mod editor;
pub mod error;
pub mod history;
pub mod ids;
pub mod linearize;
pub mod node;
pub mod ops;
pub mod persist;
pub mod sheet;
pub mod simulator;
pub mod types;
pub mod validate;

pub use clipboard::Clipboard;
pub use config::EditorConfig;
pub use cursor::{Cursor, Move};
pub use editor::{Editor, EditorEvent, Outcome};
pub use error::{ConfigError, EditError, InvariantViolation, LoadError, Precondition};
pub use history::{History, HistoryEntry, DEFAULT_HISTORY_LIMIT};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use linearize::{levels, linearize, Level, LevelCache, Levels};
pub use node::{Blocker, Node, NodeContent, Note};
pub use ops::Applied;
pub use sheet::{NodeTable, Sheet, Workspace};
pub use simulator::{run_simulator, SimulatorConfig, SimulatorReport};
pub use types::{
    BlockerId, BlockerKind, JobId, NodeId, NodeKind, NodeStatus, NoteId, PastePosition,
    PersonId, SheetId, Side, Timestamp,
};
pub use validate::Lint;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving an editing session
    pub use crate::{
        EditError, Editor, EditorConfig, JobId, Level, Move, NodeContent, NodeId, NodeKind,
        NodeStatus, Outcome, PastePosition, SheetId, Side,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
