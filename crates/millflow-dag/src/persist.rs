//! JSON import/export of a workspace.
//!
//! The shape mirrors the data model directly: a versioned envelope holding a
//! list of sheets, each with its node list. Anything loaded is validated as a
//! whole graph before it reaches an editor.

use crate::error::LoadError;
use crate::sheet::{Sheet, Workspace};
use crate::validate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Read, Write};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct WorkspaceOut<'a> {
    version: u32,
    sheets: Vec<&'a Sheet>,
}

#[derive(Deserialize)]
struct WorkspaceIn {
    #[serde(default = "default_version")]
    version: u32,
    sheets: Vec<Sheet>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

pub fn to_json(workspace: &Workspace) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&envelope(workspace))
}

pub fn to_writer<W: Write>(workspace: &Workspace, writer: W) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(writer, &envelope(workspace))
}

pub fn from_json(source: &str) -> Result<Workspace, LoadError> {
    checked(serde_json::from_str(source)?)
}

pub fn from_reader<R: Read>(reader: R) -> Result<Workspace, LoadError> {
    checked(serde_json::from_reader(reader)?)
}

fn envelope(workspace: &Workspace) -> WorkspaceOut<'_> {
    WorkspaceOut {
        version: FORMAT_VERSION,
        sheets: workspace.sheets().collect(),
    }
}

fn checked(parsed: WorkspaceIn) -> Result<Workspace, LoadError> {
    if parsed.version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion {
            found: parsed.version,
            expected: FORMAT_VERSION,
        });
    }
    let sheets = parsed.sheets;
    let mut seen = HashSet::with_capacity(sheets.len());
    for sheet in &sheets {
        if !seen.insert(sheet.id) {
            return Err(LoadError::DuplicateSheet(sheet.id));
        }
        validate::check_sheet(sheet).map_err(|source| LoadError::InvalidSheet {
            sheet: sheet.id,
            source,
        })?;
    }
    Ok(sheets.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::error::InvariantViolation;
    use crate::ids::SequentialIds;
    use pretty_assertions::assert_eq;

    #[test]
    fn demo_workspace_survives_json() {
        let workspace = demo::demo_workspace(&mut SequentialIds::new()).unwrap();
        let json = to_json(&workspace).unwrap();
        let loaded = from_json(&json).unwrap();
        assert_eq!(loaded, workspace);
    }

    #[test]
    fn one_sided_edge_is_rejected_on_load() {
        let json = serde_json::json!({
            "version": 1,
            "sheets": [{
                "id": "00000000-0000-0000-0000-000000000001",
                "job": "j",
                "name": "s",
                "nodes": [
                    { "id": "00000000-0000-0000-0000-00000000000a", "name": "a", "type": "external",
                      "status": "ready", "children": ["00000000-0000-0000-0000-00000000000b"] },
                    { "id": "00000000-0000-0000-0000-00000000000b", "name": "b", "type": "external",
                      "status": "ready" }
                ]
            }]
        });
        let err = from_json(&json.to_string()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidSheet {
                source: InvariantViolation::AsymmetricEdge { .. },
                ..
            }
        ));
    }

    #[test]
    fn writer_output_loads_through_reader() {
        let workspace = demo::demo_workspace(&mut SequentialIds::new()).unwrap();
        let mut buffer = Vec::new();
        to_writer(&workspace, &mut buffer).unwrap();
        let loaded = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(loaded, workspace);
    }

    #[test]
    fn unknown_format_version_is_rejected() {
        let err = from_json(r#"{ "version": 99, "sheets": [] }"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnsupportedVersion {
                found: 99,
                expected: FORMAT_VERSION
            }
        ));
    }

    #[test]
    fn missing_version_reads_as_current() {
        let loaded = from_json(r#"{ "sheets": [] }"#).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(from_json("{"), Err(LoadError::Json(_))));
    }
}
