//! Seeded random-operation harness.
//!
//! Drives an [`Editor`] with a reproducible stream of edits, undos and
//! deliberately bad requests, and checks the graph invariants after every
//! step.

use crate::config::EditorConfig;
use crate::editor::{Editor, Outcome};
use crate::error::{EditError, InvariantViolation};
use crate::ids::SequentialIds;
use crate::linearize::linearize;
use crate::node::NodeContent;
use crate::sheet::Sheet;
use crate::types::{
    BlockerId, BlockerKind, JobId, NodeId, NodeStatus, PastePosition, SheetId, Side,
};
use crate::validate;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub total_operations: u64,
    /// Share of steps that reference a node that does not exist
    pub invalid_op_rate: f64,
    /// Above this size a sheet is only shrunk
    pub max_nodes_per_sheet: usize,
    pub max_sheets: usize,
    pub stop_on_first_violation: bool,
    pub editor: EditorConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            total_operations: 10_000,
            invalid_op_rate: 0.05,
            max_nodes_per_sheet: 40,
            max_sheets: 3,
            stop_on_first_violation: true,
            editor: EditorConfig::default(),
        }
    }
}

/// Everything the simulator can ask of the editor
#[derive(Debug, Clone)]
pub enum SimulatedOperation {
    CreateSheet,
    InsertAfter(SheetId, NodeId),
    InsertBefore(SheetId, NodeId),
    InsertSibling(SheetId, NodeId, Side),
    Split(SheetId, NodeId),
    Join(SheetId, Vec<NodeId>, NodeId),
    Delete(SheetId, NodeId),
    Cut(SheetId, NodeId),
    Paste(SheetId, NodeId, PastePosition),
    SetStatus(SheetId, NodeId, NodeStatus),
    AddBlocker(SheetId, NodeId),
    ResolveBlocker(SheetId, NodeId, BlockerId),
    Undo,
    Redo,
    /// Edit aimed at an id that was never minted
    DeleteMissing(SheetId, NodeId),
}

impl SimulatedOperation {
    pub fn name(&self) -> &'static str {
        match self {
            SimulatedOperation::CreateSheet => "create_sheet",
            SimulatedOperation::InsertAfter(..) => "insert_after",
            SimulatedOperation::InsertBefore(..) => "insert_before",
            SimulatedOperation::InsertSibling(..) => "insert_sibling",
            SimulatedOperation::Split(..) => "split",
            SimulatedOperation::Join(..) => "join",
            SimulatedOperation::Delete(..) => "delete",
            SimulatedOperation::Cut(..) => "cut",
            SimulatedOperation::Paste(..) => "paste",
            SimulatedOperation::SetStatus(..) => "set_status",
            SimulatedOperation::AddBlocker(..) => "add_blocker",
            SimulatedOperation::ResolveBlocker(..) => "resolve_blocker",
            SimulatedOperation::Undo => "undo",
            SimulatedOperation::Redo => "redo",
            SimulatedOperation::DeleteMissing(..) => "delete_missing",
        }
    }

    fn expected(&self) -> ExpectedResult {
        match self {
            SimulatedOperation::DeleteMissing(..) => ExpectedResult::NotFound,
            _ => ExpectedResult::Accepted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedResult {
    /// Applied or a no-op
    Accepted,
    NotFound,
}

#[derive(Debug, Clone)]
pub enum Violation {
    UnexpectedOutcome {
        operation_index: u64,
        operation: SimulatedOperation,
        expected: ExpectedResult,
        actual: Result<Outcome, EditError>,
    },
    Invariant {
        operation_index: u64,
        check: InvariantCheck,
        details: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantCheck {
    EdgesMirroredAndResolvable,
    SheetsAcyclic,
    EveryNodeLinearized,
    HistoryWithinLimit,
    CursorOnLiveNode,
}

#[derive(Debug, Clone, Default)]
pub struct OperationStats {
    pub total_operations: u64,
    pub applied: u64,
    pub no_ops: u64,
    pub errors: u64,
    pub operations_by_type: BTreeMap<&'static str, u64>,
}

impl OperationStats {
    pub fn record(&mut self, operation: &SimulatedOperation, result: &Result<Outcome, EditError>) {
        self.total_operations += 1;
        *self.operations_by_type.entry(operation.name()).or_insert(0) += 1;
        match result {
            Ok(Outcome::Applied { .. }) => self.applied += 1,
            Ok(Outcome::NoOp(_)) => self.no_ops += 1,
            Err(_) => self.errors += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: OperationStats,
    pub violations: Vec<Violation>,
    pub final_sheet_count: usize,
    pub final_node_count: usize,
}

impl SimulatorReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn generate_text(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "=== MillFlow Simulator Report ===\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Total Operations: {}", self.stats.total_operations);
        let _ = writeln!(report, "Applied: {}", self.stats.applied);
        let _ = writeln!(report, "No-ops: {}", self.stats.no_ops);
        let _ = writeln!(report, "Errors: {}", self.stats.errors);
        let _ = writeln!(report, "Violations: {}", self.violations.len());
        let _ = writeln!(report, "Final Sheets: {}", self.final_sheet_count);
        let _ = writeln!(report, "Final Nodes: {}", self.final_node_count);

        report.push_str("\n=== Operations ===\n");
        for (name, count) in &self.stats.operations_by_type {
            let _ = writeln!(report, "{name:>16}: {count}");
        }

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. {:?}", i + 1, v);
            }
        }

        let _ = writeln!(
            report,
            "\n=== Result: {} ===",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

pub fn run_simulator(config: SimulatorConfig) -> SimulatorReport {
    let mut editor = Editor::with_ids(config.editor.clone(), SequentialIds::new());
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = OperationStats::default();
    let mut violations = Vec::new();

    for i in 0..config.total_operations {
        let operation = generate_operation(&mut rng, &editor, &config);
        let result = execute_operation(&mut editor, &operation, i);
        stats.record(&operation, &result);

        let expected = operation.expected();
        let outcome_matches = match (expected, &result) {
            (ExpectedResult::Accepted, Ok(_)) => true,
            (ExpectedResult::NotFound, Err(err)) => err.is_not_found(),
            _ => false,
        };
        if !outcome_matches {
            tracing::warn!(step = i, op = operation.name(), "unexpected outcome");
            violations.push(Violation::UnexpectedOutcome {
                operation_index: i,
                operation,
                expected,
                actual: result,
            });
            if config.stop_on_first_violation {
                break;
            }
        }

        let broken = check_invariants(&editor);
        if !broken.is_empty() {
            violations.extend(broken.into_iter().map(|(check, details)| Violation::Invariant {
                operation_index: i,
                check,
                details,
            }));
            if config.stop_on_first_violation {
                break;
            }
        }
    }

    let workspace = editor.workspace();
    SimulatorReport {
        final_sheet_count: workspace.len(),
        final_node_count: workspace.sheets().map(Sheet::len).sum(),
        config,
        stats,
        violations,
    }
}

fn generate_operation(
    rng: &mut StdRng,
    editor: &Editor<SequentialIds>,
    config: &SimulatorConfig,
) -> SimulatedOperation {
    let sheets: Vec<&Sheet> = editor.workspace().sheets().collect();
    if sheets.is_empty() {
        return if rng.gen_bool(0.2) {
            SimulatedOperation::Undo
        } else {
            SimulatedOperation::CreateSheet
        };
    }
    let sheet = sheets[rng.gen_range(0..sheets.len())];
    let nodes: Vec<NodeId> = sheet.nodes().map(|n| n.id).collect();

    if rng.gen_bool(config.invalid_op_rate) {
        let missing = NodeId::from_u128(u128::MAX - rng.gen_range(0..1024u128));
        return SimulatedOperation::DeleteMissing(sheet.id, missing);
    }
    if nodes.is_empty() {
        return match rng.gen_range(0..3) {
            0 => SimulatedOperation::Undo,
            1 if sheets.len() < config.max_sheets => SimulatedOperation::CreateSheet,
            _ => SimulatedOperation::Redo,
        };
    }

    let node = nodes[rng.gen_range(0..nodes.len())];
    let side = if rng.gen_bool(0.5) { Side::Left } else { Side::Right };
    let full = nodes.len() >= config.max_nodes_per_sheet;

    match rng.gen_range(0..14) {
        0 if sheets.len() < config.max_sheets => SimulatedOperation::CreateSheet,
        1 | 2 if !full => SimulatedOperation::InsertAfter(sheet.id, node),
        3 if !full => SimulatedOperation::InsertBefore(sheet.id, node),
        4 if !full => SimulatedOperation::InsertSibling(sheet.id, node, side),
        5 if !full => SimulatedOperation::Split(sheet.id, node),
        6 => generate_join(rng, sheet).unwrap_or(SimulatedOperation::Delete(sheet.id, node)),
        7 => SimulatedOperation::Delete(sheet.id, node),
        8 => SimulatedOperation::Cut(sheet.id, node),
        9 if !full => {
            let position = match rng.gen_range(0..3) {
                0 => PastePosition::Before,
                1 => PastePosition::After,
                _ => PastePosition::Sibling(side),
            };
            SimulatedOperation::Paste(sheet.id, node, position)
        }
        10 => {
            let status = NodeStatus::ALL[rng.gen_range(0..NodeStatus::ALL.len())];
            SimulatedOperation::SetStatus(sheet.id, node, status)
        }
        11 => {
            let blocked = sheet
                .nodes()
                .find_map(|n| n.unresolved_blockers().next().map(|b| (n.id, b.id)));
            match blocked {
                Some((node, blocker)) if rng.gen_bool(0.7) => {
                    SimulatedOperation::ResolveBlocker(sheet.id, node, blocker)
                }
                _ => SimulatedOperation::AddBlocker(sheet.id, node),
            }
        }
        12 => SimulatedOperation::Undo,
        13 => SimulatedOperation::Redo,
        _ => SimulatedOperation::Delete(sheet.id, node),
    }
}

/// Join a parallel level into some node strictly below it. Ancestors always
/// sit on shallower levels, so this never closes a cycle.
fn generate_join(rng: &mut StdRng, sheet: &Sheet) -> Option<SimulatedOperation> {
    let levels = linearize(sheet);
    let candidates: Vec<usize> = levels
        .iter()
        .enumerate()
        .filter(|(i, level)| level.is_parallel() && i + 1 < levels.len())
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let source_level = candidates[rng.gen_range(0..candidates.len())];
    let sources = levels[source_level].nodes.clone();
    let below = &levels[rng.gen_range(source_level + 1..levels.len())].nodes;
    let target = below[rng.gen_range(0..below.len())];
    Some(SimulatedOperation::Join(sheet.id, sources, target))
}

fn execute_operation(
    editor: &mut Editor<SequentialIds>,
    operation: &SimulatedOperation,
    index: u64,
) -> Result<Outcome, EditError> {
    let step = || NodeContent::named(format!("step {index}"));
    match operation {
        SimulatedOperation::CreateSheet => {
            let (_, root) = editor.create_sheet(
                JobId::new(format!("SIM-{index}")),
                format!("sheet {index}"),
                NodeContent::named("start"),
            );
            Ok(Outcome::Applied { selected: Some(root) })
        }
        SimulatedOperation::InsertAfter(s, n) => editor.insert_after(*s, *n, step()),
        SimulatedOperation::InsertBefore(s, n) => editor.insert_before(*s, *n, step()),
        SimulatedOperation::InsertSibling(s, n, side) => {
            editor.insert_sibling(*s, *n, *side, step())
        }
        SimulatedOperation::Split(s, n) => editor.split(*s, *n, step()),
        SimulatedOperation::Join(s, sources, target) => editor.join(*s, sources, *target),
        SimulatedOperation::Delete(s, n) | SimulatedOperation::DeleteMissing(s, n) => {
            editor.delete_node(*s, *n)
        }
        SimulatedOperation::Cut(s, n) => editor.cut_node(*s, *n),
        SimulatedOperation::Paste(s, n, position) => editor.paste_node(*s, *n, *position),
        SimulatedOperation::SetStatus(s, n, status) => editor.set_status(*s, *n, *status),
        SimulatedOperation::AddBlocker(s, n) => editor
            .add_blocker(*s, *n, BlockerKind::Internal, "simulated hold", "sim", None)
            .map(|_| Outcome::Applied { selected: Some(*n) }),
        SimulatedOperation::ResolveBlocker(s, n, b) => editor.resolve_blocker(*s, *n, *b),
        SimulatedOperation::Undo => Ok(editor.undo()),
        SimulatedOperation::Redo => Ok(editor.redo()),
    }
}

fn check_invariants(editor: &Editor<SequentialIds>) -> Vec<(InvariantCheck, String)> {
    let mut broken = Vec::new();
    for sheet in editor.workspace().sheets() {
        if let Err(violation) = validate::check_references(sheet.node_table()) {
            broken.push((InvariantCheck::EdgesMirroredAndResolvable, describe(sheet, &violation)));
        }
        if let Err(violation) = validate::check_acyclic(sheet.node_table()) {
            broken.push((InvariantCheck::SheetsAcyclic, describe(sheet, &violation)));
        }
        let placed: usize = linearize(sheet).iter().map(|l| l.nodes.len()).sum();
        if placed != sheet.len() {
            broken.push((
                InvariantCheck::EveryNodeLinearized,
                format!("sheet {}: {placed} of {} nodes placed", sheet.id, sheet.len()),
            ));
        }
    }

    let history = editor.history();
    if history.len() > history.limit() {
        broken.push((
            InvariantCheck::HistoryWithinLimit,
            format!("{} entries, limit {}", history.len(), history.limit()),
        ));
    }

    if let (Some(node), Some(active)) = (editor.cursor().node(), editor.active_sheet()) {
        if editor.node(active, node).is_err() {
            broken.push((
                InvariantCheck::CursorOnLiveNode,
                format!("cursor on {node}, not in sheet {active}"),
            ));
        }
    }
    broken
}

fn describe(sheet: &Sheet, violation: &InvariantViolation) -> String {
    format!("sheet {}: {violation}", sheet.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_run_passes() {
        let report = run_simulator(SimulatorConfig {
            total_operations: 500,
            ..Default::default()
        });
        assert!(report.passed(), "{}", report.generate_text());
        assert_eq!(report.stats.total_operations, 500);
    }

    #[test]
    fn same_seed_same_shape() {
        let config = SimulatorConfig {
            seed: 7,
            total_operations: 300,
            ..Default::default()
        };
        let a = run_simulator(config.clone());
        let b = run_simulator(config);
        assert_eq!(a.stats.operations_by_type, b.stats.operations_by_type);
        assert_eq!(a.final_node_count, b.final_node_count);
    }

    #[test]
    fn missing_nodes_are_reported_not_found() {
        let report = run_simulator(SimulatorConfig {
            total_operations: 200,
            invalid_op_rate: 0.5,
            ..Default::default()
        });
        assert!(report.passed(), "{}", report.generate_text());
        assert!(report.stats.errors > 0);
    }
}
