//! CSV rendering of the canonical table contracts.
//!
//! Fixed column sets per record kind; host code decides where the text goes.
//! Fields containing commas, quotes, or newlines are double-quote escaped.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Utc};

use crate::diff::grant_diff::DiffReport;
use crate::error::AuditError;
use crate::graph::ancestry::ancestry_paths;
use crate::graph::arena::RoleGraph;
use crate::normalizer::grants::Grant;
use crate::normalizer::names::has_special_identifier_characters;
use crate::pivot::engine::PivotTable;

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn timestamp(ts: Option<DateTime<FixedOffset>>) -> String {
    ts.map(|t| t.to_rfc3339()).unwrap_or_default()
}

fn timestamp_utc(ts: Option<DateTime<FixedOffset>>) -> String {
    ts.map(|t| t.with_timezone(&Utc).to_rfc3339())
        .unwrap_or_default()
}

/// Render the canonical grant table.
pub fn grants_table(grants: &[Grant]) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "Privilege,ObjectType,ObjectName,GrantedTo,DBName,SchemaName,EntityName,GrantedBy,WithGrantOption,CreatedOn,CreatedOnUTC"
    )
    .unwrap();
    for grant in grants {
        let fields = vec![
            grant.privilege.clone(),
            grant.object_type.clone(),
            grant.object_name.clone(),
            grant.granted_to.clone(),
            grant.db_name.clone(),
            grant.schema_name.clone(),
            grant.entity_name.clone(),
            grant.granted_by.clone(),
            grant.with_grant_option.to_string(),
            timestamp(grant.created_at),
            timestamp_utc(grant.created_at),
        ];
        writeln!(out, "{}", csv_row(&fields)).unwrap();
    }
    out
}

/// Render the canonical role table, including derived hierarchy columns.
pub fn roles_table(graph: &RoleGraph, max_paths: Option<usize>) -> Result<String, AuditError> {
    let mut out = String::new();
    writeln!(
        out,
        "Name,Owner,Type,IsInherited,NumAssignedUsers,NumChildRoles,NumParentRoles,AssignedUsers,ChildRoles,ParentRoles,AncestryPaths,NumAncestryPaths,Comment,IsObjectIdentifierSpecialCharacters,CreatedOn,CreatedOnUTC"
    )
    .unwrap();

    for (id, role) in graph.roles() {
        let paths = ancestry_paths(graph, id, max_paths)?;
        let child_names: Vec<&str> = role
            .children
            .iter()
            .map(|&c| graph.role(c).name.as_str())
            .collect();
        let parent_names: Vec<&str> = role
            .parents
            .iter()
            .map(|&p| graph.role(p).name.as_str())
            .collect();
        let fields = vec![
            role.name.clone(),
            role.owner.clone(),
            role.role_type.to_string(),
            (!role.parents.is_empty()).to_string(),
            role.assigned_users.len().to_string(),
            role.children.len().to_string(),
            role.parents.len().to_string(),
            role.assigned_users.join(","),
            child_names.join(","),
            parent_names.join(","),
            paths.join("\n"),
            paths.len().to_string(),
            role.comment.clone(),
            has_special_identifier_characters(&role.name).to_string(),
            timestamp(role.created_at),
            timestamp_utc(role.created_at),
        ];
        writeln!(out, "{}", csv_row(&fields)).unwrap();
    }
    Ok(out)
}

/// Render one pivoted object-type table.
pub fn pivot_table(table: &PivotTable) -> String {
    let mut out = String::new();
    let mut header: Vec<String> = [
        "ObjectType",
        "ObjectName",
        "GrantedTo",
        "DBName",
        "SchemaName",
        "EntityName",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    header.extend(table.columns.iter().cloned());
    writeln!(out, "{}", csv_row(&header)).unwrap();

    for row in &table.rows {
        let mut fields = vec![
            row.object_type.clone(),
            row.object_name.clone(),
            row.granted_to.clone(),
            row.db_name.clone(),
            row.schema_name.clone(),
            row.entity_name.clone(),
        ];
        fields.extend(row.cells.iter().cloned());
        writeln!(out, "{}", csv_row(&fields)).unwrap();
    }
    out
}

/// Render the grant-difference table.
pub fn differences_table(report: &DiffReport) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "Privilege,ObjectType,ObjectName,GrantedTo,UniqueIdentifier,DBName,SchemaName,EntityName,ReportLeft,ReportRight,Difference,DifferenceDetails,GrantedByLeft,GrantedByRight,WithGrantOptionLeft,WithGrantOptionRight,CreatedOnUTCLeft,CreatedOnUTCRight"
    )
    .unwrap();

    for difference in &report.differences {
        let fields = vec![
            difference.key.privilege.clone(),
            difference.key.object_type.clone(),
            difference.key.object_name.clone(),
            difference.key.granted_to.clone(),
            difference.key.to_string(),
            difference.db_name.clone(),
            difference.schema_name.clone(),
            difference.entity_name.clone(),
            report.left_label.clone(),
            report.right_label.clone(),
            difference.kind.to_string(),
            difference.differing_fields.join(", "),
            difference.granted_by_left.clone().unwrap_or_default(),
            difference.granted_by_right.clone().unwrap_or_default(),
            difference
                .with_grant_option_left
                .map(|b| b.to_string())
                .unwrap_or_default(),
            difference
                .with_grant_option_right
                .map(|b| b.to_string())
                .unwrap_or_default(),
            timestamp_utc(difference.created_at_left),
            timestamp_utc(difference.created_at_right),
        ];
        writeln!(out, "{}", csv_row(&fields)).unwrap();
    }
    out
}
