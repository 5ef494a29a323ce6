//! Wide-table privilege pivoting.
//!
//! Long-form grants for one object type become one row per
//! `(object_name, granted_to)` with one flag cell per assigned privilege
//! column: `""` for absent, `"X"` for granted, `"X+"` for granted with grant
//! option. Rows are produced by a streaming group-by over sorted input; the
//! engine sorts its input itself so grouping is self-contained.

use std::collections::BTreeMap;

use crate::normalizer::grants::Grant;
use crate::pivot::columns::assign_privilege_columns;

/// One pivoted `(object, principal)` row.
#[derive(Debug, Clone)]
pub struct PivotedObjectRow {
    /// Object type of the batch.
    pub object_type: String,
    /// Canonical object name.
    pub object_name: String,
    /// Grantee principal.
    pub granted_to: String,
    /// Database segment.
    pub db_name: String,
    /// Schema segment.
    pub schema_name: String,
    /// Entity segment.
    pub entity_name: String,
    /// Flag cells, aligned with the batch's column assignment.
    pub cells: Vec<String>,
}

/// The pivoted table for one object type.
#[derive(Debug, Clone)]
pub struct PivotTable {
    /// Object type of the batch.
    pub object_type: String,
    /// Ordered privilege column headers, assigned once per batch.
    pub columns: Vec<String>,
    /// Pivoted rows in `(object_name, granted_to)` order.
    pub rows: Vec<PivotedObjectRow>,
}

/// Pivot all grants of one object type.
pub fn pivot_object_type(object_type: &str, grants: &[&Grant]) -> PivotTable {
    let columns = assign_privilege_columns(object_type, grants);

    let mut sorted: Vec<&Grant> = grants.to_vec();
    sorted.sort_by(|a, b| {
        (&a.object_name, &a.granted_to).cmp(&(&b.object_name, &b.granted_to))
    });

    let mut rows: Vec<PivotedObjectRow> = Vec::new();
    for grant in sorted {
        let starts_new_row = rows.last().is_none_or(|row| {
            row.object_name != grant.object_name || row.granted_to != grant.granted_to
        });
        if starts_new_row {
            rows.push(PivotedObjectRow {
                object_type: object_type.to_string(),
                object_name: grant.object_name.clone(),
                granted_to: grant.granted_to.clone(),
                db_name: grant.db_name.clone(),
                schema_name: grant.schema_name.clone(),
                entity_name: grant.entity_name.clone(),
                cells: vec![String::new(); columns.len()],
            });
        }
        let row = rows.last_mut().expect("row was just pushed");
        if let Some(column) = columns.iter().position(|c| c == &grant.privilege) {
            let cell = &mut row.cells[column];
            if grant.with_grant_option {
                *cell = "X+".to_string();
            } else if cell.is_empty() {
                *cell = "X".to_string();
            }
        }
    }

    PivotTable {
        object_type: object_type.to_string(),
        columns,
        rows,
    }
}

/// Pivot an entire grant set, one table per object type, in object-type
/// order.
pub fn pivot_all(grants: &[Grant]) -> Vec<PivotTable> {
    let mut by_type: BTreeMap<&str, Vec<&Grant>> = BTreeMap::new();
    for grant in grants {
        by_type.entry(grant.object_type.as_str()).or_default().push(grant);
    }
    by_type
        .into_iter()
        .map(|(object_type, batch)| pivot_object_type(object_type, &batch))
        .collect()
}
