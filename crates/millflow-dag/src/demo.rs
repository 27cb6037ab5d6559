//! Demo data: one cabinet job laid out as a workflow sheet.
//!
//! Built through the same operations the editor uses, so the result is a
//! valid graph by construction.

use crate::error::EditError;
use crate::ids::IdGenerator;
use crate::node::{Blocker, NodeContent, Note};
use crate::ops;
use crate::sheet::{Sheet, Workspace};
use crate::types::{now_timestamp, BlockerKind, JobId, NodeId, NodeKind, NodeStatus, PersonId, Side};

pub const DEMO_JOB: &str = "J-1042";

/// ```text
/// cut stock
///  ├─ machine panels ─┐
///  └─ order hinges ───┴─ assemble ─ quality check ─ deliver ─ install
/// ```
pub fn demo_sheet(ids: &mut impl IdGenerator) -> Result<Sheet, EditError> {
    let now = now_timestamp();
    let sheet_id = ids.next_id();
    let cut: NodeId = ids.next_id();
    let sheet = Sheet::with_root(
        sheet_id,
        JobId::new(DEMO_JOB),
        "Kitchen cabinets",
        cut,
        NodeContent::named("Cut stock")
            .with_status(NodeStatus::Done)
            .with_assignee(PersonId::new("dana")),
    );

    let machine: NodeId = ids.next_id();
    let sheet = ops::insert_after(
        &sheet,
        cut,
        machine,
        NodeContent::named("Machine panels")
            .with_status(NodeStatus::InProgress)
            .with_assignee(PersonId::new("dana")),
    )?
    .sheet;

    let assemble: NodeId = ids.next_id();
    let sheet = ops::insert_after(&sheet, machine, assemble, NodeContent::named("Assemble"))?.sheet;

    let hinges: NodeId = ids.next_id();
    let backorder = Blocker::new(
        ids.next_id(),
        BlockerKind::Material,
        "Hinges backordered",
        "purchasing",
        now,
    )
    .expected_by(now.date_naive() + chrono::Duration::days(14));
    let sheet = ops::insert_sibling(
        &sheet,
        machine,
        Side::Right,
        hinges,
        NodeContent::named("Order hinges")
            .with_kind(NodeKind::Material)
            .with_blocker(backorder)
            .with_note(Note::new(ids.next_id(), "Supplier quoted two weeks", "sam", now)),
    )?
    .sheet;

    let qc: NodeId = ids.next_id();
    let sheet = ops::insert_after(
        &sheet,
        assemble,
        qc,
        NodeContent::named("Quality check").with_kind(NodeKind::QualityCheck),
    )?
    .sheet;

    let deliver: NodeId = ids.next_id();
    let sheet = ops::insert_after(
        &sheet,
        qc,
        deliver,
        NodeContent::named("Deliver").with_kind(NodeKind::Delivery),
    )?
    .sheet;

    let install: NodeId = ids.next_id();
    let sheet = ops::insert_after(
        &sheet,
        deliver,
        install,
        NodeContent::named("Install on site").with_kind(NodeKind::Install),
    )?
    .sheet;

    Ok(sheet)
}

/// Fresh workspace holding only the demo sheet.
pub fn demo_workspace(ids: &mut impl IdGenerator) -> Result<Workspace, EditError> {
    Ok(std::iter::once(demo_sheet(ids)?).collect())
}
