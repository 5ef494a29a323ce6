//! Privilege column assignment.
//!
//! Columns are assigned once per object-type batch and stay stable across
//! every row of that batch: distinct privileges sorted alphabetically, then
//! reordered so the most security-relevant privileges come first. The column
//! count is capped; excess privileges are dropped with a warning, a known
//! capacity limit rather than an error.

use std::collections::BTreeSet;

use tracing::warn;

use crate::normalizer::grants::Grant;

/// Fixed maximum number of privilege columns per object type.
pub const MAX_PRIVILEGE_COLUMNS: usize = 20;

/// Container-like object types: OWNERSHIP moves to column 0 and USAGE to
/// column 1.
const CONTAINER_OBJECT_TYPES: &[&str] = &[
    "DATABASE",
    "SCHEMA",
    "WAREHOUSE",
    "ROLE",
    "USER",
    "INTEGRATION",
    "RESOURCE_MONITOR",
];

/// Assign the ordered privilege columns for one object-type batch.
pub fn assign_privilege_columns(object_type: &str, grants: &[&Grant]) -> Vec<String> {
    let distinct: BTreeSet<&str> = grants.iter().map(|g| g.privilege.as_str()).collect();
    let mut columns: Vec<String> = distinct.into_iter().map(str::to_string).collect();

    match object_type {
        "ACCOUNT" => {}
        t if CONTAINER_OBJECT_TYPES.contains(&t) => {
            move_to_front(&mut columns, "USAGE");
            move_to_front(&mut columns, "OWNERSHIP");
        }
        _ => move_to_front(&mut columns, "OWNERSHIP"),
    }

    if columns.len() > MAX_PRIVILEGE_COLUMNS {
        let dropped = columns.split_off(MAX_PRIVILEGE_COLUMNS);
        warn!(
            object_type,
            dropped = %dropped.join(", "),
            "more than {MAX_PRIVILEGE_COLUMNS} distinct privileges; excess columns dropped"
        );
    }
    columns
}

fn move_to_front(columns: &mut Vec<String>, privilege: &str) {
    if let Some(position) = columns.iter().position(|c| c == privilege) {
        let found = columns.remove(position);
        columns.insert(0, found);
    }
}
