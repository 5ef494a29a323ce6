//! Canonical grant records.
//!
//! A [`Grant`] is one privilege assignment, normalized from either raw
//! schema. Identity for dedup and diffing is the
//! `(privilege, object_type, object_name, granted_to, granted_by)` tuple —
//! reporting never double-counts an identical grant fact seen from two
//! angles. Normalization is partial-failure tolerant: malformed rows are
//! logged and skipped, the rest of the batch continues.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::normalizer::names::{
    derive_name_parts, serialize_name_parts, split_object_name, NameParts,
};
use crate::normalizer::raw::{
    RawExportGrantRow, RawGrantRow, RawRoleMembershipRow, RawSnapshotRow,
};

/// One canonical privilege assignment. Immutable once normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    /// Privilege name, uppercase (`USAGE`, `OWNERSHIP`, `SELECT`, ...).
    pub privilege: String,
    /// Object type, uppercase with underscores (`DATABASE`, `TABLE`, ...).
    pub object_type: String,
    /// Canonical fully-qualified object name, dot-quoted where needed.
    pub object_name: String,
    /// Database segment derived from the object name.
    pub db_name: String,
    /// Schema segment derived from the object name.
    pub schema_name: String,
    /// Entity segment derived from the object name.
    pub entity_name: String,
    /// Principal the privilege is granted to.
    pub granted_to: String,
    /// Principal that issued the grant.
    pub granted_by: String,
    /// Whether the grantee may re-grant the privilege.
    pub with_grant_option: bool,
    /// Grant creation timestamp, original offset preserved.
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// The identity of a grant fact for dedup and diff matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrantKey {
    /// Privilege name.
    pub privilege: String,
    /// Object type.
    pub object_type: String,
    /// Canonical object name.
    pub object_name: String,
    /// Grantee principal.
    pub granted_to: String,
    /// Granting principal.
    pub granted_by: String,
}

impl Grant {
    /// Identity key of this grant.
    pub fn key(&self) -> GrantKey {
        GrantKey {
            privilege: self.privilege.clone(),
            object_type: self.object_type.clone(),
            object_name: self.object_name.clone(),
            granted_to: self.granted_to.clone(),
            granted_by: self.granted_by.clone(),
        }
    }

    /// Creation timestamp projected to UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.map(|ts| ts.with_timezone(&Utc))
    }
}

impl std::fmt::Display for GrantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.privilege, self.object_type, self.object_name, self.granted_to, self.granted_by
        )
    }
}

/// Parse an ISO-8601-ish timestamp; empty input is a present-but-unset value.
///
/// Accepts RFC-3339, `YYYY-MM-DD HH:MM:SS[.fff] +ZZZZ`, and a naive
/// `YYYY-MM-DD HH:MM:SS[.fff]` assumed UTC. Anything else is an error and
/// causes the surrounding row to be skipped.
pub fn parse_timestamp(raw: &str) -> Result<Option<DateTime<FixedOffset>>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(ts));
    }
    if let Ok(ts) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Ok(Some(ts));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Some(naive.and_utc().fixed_offset()));
    }
    Err(format!("unparseable timestamp '{trimmed}'"))
}

fn canonical_object_type(raw: &str) -> String {
    raw.trim().replace(' ', "_").to_uppercase()
}

fn build_grant(
    privilege: &str,
    object_type: String,
    segments: &[String],
    granted_to: &str,
    granted_by: &str,
    with_grant_option: bool,
    created_at: Option<DateTime<FixedOffset>>,
) -> Grant {
    let parts = derive_name_parts(&object_type, segments);
    let object_name = serialize_name_parts(&object_type, &parts);
    let NameParts {
        db_name,
        schema_name,
        entity_name,
    } = parts;
    Grant {
        privilege: privilege.trim().to_uppercase(),
        object_type,
        object_name,
        db_name,
        schema_name,
        entity_name,
        granted_to: granted_to.trim().to_string(),
        granted_by: granted_by.trim().to_string(),
        with_grant_option,
        created_at,
    }
}

/// Normalize interactive-schema grant rows.
pub fn normalize_interactive(rows: &[RawGrantRow]) -> Vec<Grant> {
    let mut grants = Vec::with_capacity(rows.len());
    for row in rows {
        if row.name.trim().is_empty() {
            warn!(privilege = %row.privilege, "skipping grant row with empty object name");
            continue;
        }
        let created_at = match parse_timestamp(&row.created_on) {
            Ok(ts) => ts,
            Err(reason) => {
                warn!(object = %row.name, %reason, "skipping malformed grant row");
                continue;
            }
        };
        let object_type = canonical_object_type(&row.granted_on);
        let segments = split_object_name(row.name.trim());
        grants.push(build_grant(
            &row.privilege,
            object_type,
            &segments,
            &row.grantee_name,
            &row.granted_by,
            row.grant_option,
            created_at,
        ));
    }
    grants
}

/// Normalize historical-export grant rows.
///
/// Excludes soft-deleted records, folds embedded spaces in object types to
/// underscores, and re-derives the combined object name from the separately
/// columned components, quoting any component that embeds a dot.
pub fn normalize_export(rows: &[RawExportGrantRow]) -> Vec<Grant> {
    let mut grants = Vec::with_capacity(rows.len());
    let mut deleted = 0usize;
    for row in rows {
        if row.is_deleted() {
            deleted += 1;
            continue;
        }
        if row.name.trim().is_empty() {
            warn!(privilege = %row.privilege, "skipping grant row with empty object name");
            continue;
        }
        let created_at = match parse_timestamp(&row.created_on) {
            Ok(ts) => ts,
            Err(reason) => {
                warn!(object = %row.name, %reason, "skipping malformed grant row");
                continue;
            }
        };
        let object_type = canonical_object_type(&row.granted_on);
        let segments: Vec<String> = [&row.table_catalog, &row.table_schema, &row.name]
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        grants.push(build_grant(
            &row.privilege,
            object_type,
            &segments,
            &row.grantee_name,
            &row.granted_by,
            row.grant_option,
            created_at,
        ));
    }
    if deleted > 0 {
        debug!(deleted, "excluded soft-deleted grant rows");
    }
    grants
}

/// Normalize rows from either grant schema.
pub fn normalize_snapshot(rows: &[RawSnapshotRow]) -> Vec<Grant> {
    let mut interactive = Vec::new();
    let mut export = Vec::new();
    for row in rows {
        match row {
            RawSnapshotRow::Interactive(r) => interactive.push(r.clone()),
            RawSnapshotRow::Export(r) => export.push(r.clone()),
        }
    }
    let mut grants = normalize_interactive(&interactive);
    grants.extend(normalize_export(&export));
    grants
}

/// Normalize role membership rows into canonical grants.
///
/// Each row becomes a `USAGE` grant whose object type is the grantee kind
/// (`ROLE` or `USER`), whose object name is the granted role, and whose
/// grantee is the member principal. ROLE rows feed the hierarchy builder;
/// USER rows carry per-role user assignments.
pub fn normalize_role_memberships(rows: &[RawRoleMembershipRow]) -> Vec<Grant> {
    let mut grants = Vec::with_capacity(rows.len());
    for row in rows {
        if row.is_deleted() {
            continue;
        }
        if row.role.trim().is_empty() || row.grantee_name.trim().is_empty() {
            warn!(role = %row.role, "skipping role membership row with empty principal");
            continue;
        }
        let created_at = match parse_timestamp(&row.created_on) {
            Ok(ts) => ts,
            Err(reason) => {
                warn!(role = %row.role, %reason, "skipping malformed role membership row");
                continue;
            }
        };
        let object_type = canonical_object_type(&row.granted_to);
        let role_component = vec![row.role.trim().to_string()];
        grants.push(build_grant(
            "USAGE",
            object_type,
            &role_component,
            &row.grantee_name,
            &row.granted_by,
            false,
            created_at,
        ));
    }
    grants
}

/// Union grant batches into a set, keeping the first-seen representative per
/// identity key.
///
/// Raw sources can overlap (the same ROLE/USAGE fact surfaces from both the
/// "grants ON" and "grants TO" angles); the result is a set, never a
/// multiset.
pub fn dedup_grants<I: IntoIterator<Item = Grant>>(grants: I) -> Vec<Grant> {
    let mut seen: HashSet<GrantKey> = HashSet::new();
    let mut unique = Vec::new();
    let mut dropped = 0usize;
    for grant in grants {
        if seen.insert(grant.key()) {
            unique.push(grant);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!(dropped, kept = unique.len(), "deduplicated grant facts");
    }
    unique
}
