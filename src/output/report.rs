use std::collections::HashMap;
use std::fmt::Write;

use crate::classifier::role_types::RoleType;
use crate::diff::grant_diff::{DiffReport, DifferenceKind};
use crate::graph::ancestry::RoleHierarchyEdge;
use crate::graph::arena::RoleGraph;
use crate::normalizer::grants::Grant;
use crate::pivot::engine::PivotTable;

/// Fixed section order for the role type summary.
const ROLE_TYPE_ORDER: &[RoleType] = &[
    RoleType::BuiltIn,
    RoleType::Scim,
    RoleType::RoleManagement,
    RoleType::Functional,
    RoleType::Access,
    RoleType::NotUnderAccountAdmin,
    RoleType::FunctionalNotUnderSysadmin,
    RoleType::AccessNotUnderSysadmin,
    RoleType::Unknown,
];

/// Build a markdown audit report.
pub fn build_report(
    graph: &RoleGraph,
    grants: &[Grant],
    tables: &[PivotTable],
    edges: &[RoleHierarchyEdge],
    diff: Option<&DiffReport>,
) -> String {
    let mut report = String::new();

    writeln!(report, "# Grant Audit Report").unwrap();
    writeln!(report).unwrap();
    writeln!(
        report,
        "{} canonical grants, {} roles.",
        grants.len(),
        graph.len()
    )
    .unwrap();

    // Role type summary
    writeln!(report).unwrap();
    writeln!(report, "## Role Type Summary").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "| Type | Count |").unwrap();
    writeln!(report, "|------|-------|").unwrap();
    let mut counts: HashMap<RoleType, usize> = HashMap::new();
    for (_, role) in graph.roles() {
        *counts.entry(role.role_type).or_insert(0) += 1;
    }
    for role_type in ROLE_TYPE_ORDER {
        let count = counts.get(role_type).copied().unwrap_or(0);
        if count > 0 {
            writeln!(report, "| {role_type} | {count} |").unwrap();
        }
    }

    // Grants per object type, with the assigned column count
    writeln!(report).unwrap();
    writeln!(report, "## Grants by Object Type").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "| Object Type | Rows | Privilege Columns |").unwrap();
    writeln!(report, "|-------------|------|-------------------|").unwrap();
    for table in tables {
        writeln!(
            report,
            "| {} | {} | {} |",
            table.object_type,
            table.rows.len(),
            table.columns.len()
        )
        .unwrap();
    }

    // Hierarchy edges
    if !edges.is_empty() {
        writeln!(report).unwrap();
        writeln!(report, "## Role Hierarchy").unwrap();
        writeln!(report).unwrap();
        writeln!(report, "| Parent | Child | Important Ancestor |").unwrap();
        writeln!(report, "|--------|-------|--------------------|").unwrap();
        for edge in edges {
            writeln!(
                report,
                "| {} | {} | {} |",
                edge.parent_name, edge.child_name, edge.important_ancestor
            )
            .unwrap();
        }
    }

    // Snapshot comparison
    if let Some(diff) = diff {
        writeln!(report).unwrap();
        writeln!(report, "## Snapshot Comparison").unwrap();
        writeln!(report).unwrap();
        writeln!(
            report,
            "Compared `{}` ({} grants) against `{}` ({} grants): {} differences.",
            diff.left_label,
            diff.left_total,
            diff.right_label,
            diff.right_total,
            diff.differences.len()
        )
        .unwrap();
        writeln!(report).unwrap();
        writeln!(report, "| Outcome | Count |").unwrap();
        writeln!(report, "|---------|-------|").unwrap();
        for kind in [
            DifferenceKind::Different,
            DifferenceKind::Missing,
            DifferenceKind::Extra,
        ] {
            writeln!(report, "| {kind} | {} |", diff.count_of(kind)).unwrap();
        }
    }

    report
}
