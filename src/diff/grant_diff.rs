//! Two-snapshot grant reconciliation.
//!
//! Both inputs are canonical grant sets, pre-deduplicated by identity key.
//! Pass 1 walks the left set: a key found on the right is compared field by
//! field (DIFFERENT on mismatch), a key absent on the right is MISSING, and
//! every compared right entry is marked consumed. Pass 2 yields EXTRA for
//! each right entry never consumed. Output order is pass-1 insertion order
//! followed by pass 2; presentation layers may re-sort.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset};

use crate::error::AuditError;
use crate::normalizer::grants::{Grant, GrantKey};

/// Comparison outcome kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferenceKind {
    /// Key matched but at least one compared field differs.
    Different,
    /// Present on the left, absent on the right.
    Missing,
    /// Present on the right, absent on the left.
    Extra,
}

impl std::fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DifferenceKind::Different => "DIFFERENT",
            DifferenceKind::Missing => "MISSING",
            DifferenceKind::Extra => "EXTRA",
        };
        write!(f, "{label}")
    }
}

/// One comparison outcome.
#[derive(Debug, Clone)]
pub struct GrantDifference {
    /// Identity key of the compared grant.
    pub key: GrantKey,
    /// Derived database segment, for reporting.
    pub db_name: String,
    /// Derived schema segment, for reporting.
    pub schema_name: String,
    /// Derived entity segment, for reporting.
    pub entity_name: String,
    /// Outcome kind.
    pub kind: DifferenceKind,
    /// Names of the fields that differed (DIFFERENT only).
    pub differing_fields: Vec<&'static str>,
    /// Left-side granting principal, when present on the left.
    pub granted_by_left: Option<String>,
    /// Right-side granting principal, when present on the right.
    pub granted_by_right: Option<String>,
    /// Left-side grant option flag.
    pub with_grant_option_left: Option<bool>,
    /// Right-side grant option flag.
    pub with_grant_option_right: Option<bool>,
    /// Left-side creation timestamp.
    pub created_at_left: Option<DateTime<FixedOffset>>,
    /// Right-side creation timestamp.
    pub created_at_right: Option<DateTime<FixedOffset>>,
}

/// The outcome of one snapshot comparison.
#[derive(Debug, Clone)]
pub struct DiffReport {
    /// Label of the left snapshot.
    pub left_label: String,
    /// Label of the right snapshot.
    pub right_label: String,
    /// Grant count of the left snapshot.
    pub left_total: usize,
    /// Grant count of the right snapshot.
    pub right_total: usize,
    /// All non-identical outcomes, pass-1 order then pass-2 order.
    pub differences: Vec<GrantDifference>,
}

impl DiffReport {
    /// Count of outcomes of one kind.
    pub fn count_of(&self, kind: DifferenceKind) -> usize {
        self.differences.iter().filter(|d| d.kind == kind).count()
    }
}

/// Compare two canonical grant snapshots.
///
/// An empty left or right set is a hard precondition failure: the diff does
/// not run and the caller is told no comparison occurred.
pub fn diff_snapshots(
    left_label: &str,
    left: &[Grant],
    right_label: &str,
    right: &[Grant],
) -> Result<DiffReport, AuditError> {
    if left.is_empty() {
        return Err(AuditError::EmptySnapshot { side: "left" });
    }
    if right.is_empty() {
        return Err(AuditError::EmptySnapshot { side: "right" });
    }

    let mut right_index: HashMap<GrantKey, usize> = HashMap::with_capacity(right.len());
    for (position, grant) in right.iter().enumerate() {
        right_index.entry(grant.key()).or_insert(position);
    }
    let mut consumed = vec![false; right.len()];
    let mut differences = Vec::new();

    for left_grant in left {
        let key = left_grant.key();
        let Some(&position) = right_index.get(&key) else {
            differences.push(one_sided(left_grant, DifferenceKind::Missing));
            continue;
        };
        consumed[position] = true;
        let right_grant = &right[position];

        let differing = compare_fields(left_grant, right_grant);
        if !differing.is_empty() {
            differences.push(GrantDifference {
                key,
                db_name: left_grant.db_name.clone(),
                schema_name: left_grant.schema_name.clone(),
                entity_name: left_grant.entity_name.clone(),
                kind: DifferenceKind::Different,
                differing_fields: differing,
                granted_by_left: Some(left_grant.granted_by.clone()),
                granted_by_right: Some(right_grant.granted_by.clone()),
                with_grant_option_left: Some(left_grant.with_grant_option),
                with_grant_option_right: Some(right_grant.with_grant_option),
                created_at_left: left_grant.created_at,
                created_at_right: right_grant.created_at,
            });
        }
    }

    for (position, right_grant) in right.iter().enumerate() {
        if !consumed[position] {
            differences.push(one_sided(right_grant, DifferenceKind::Extra));
        }
    }

    Ok(DiffReport {
        left_label: left_label.to_string(),
        right_label: right_label.to_string(),
        left_total: left.len(),
        right_total: right.len(),
        differences,
    })
}

/// Compare the non-key fields of two key-matched grants.
///
/// `granted_by` is part of the identity key yet still compared here; both
/// behaviors are preserved as specified. Timestamps are equal within a
/// one-second tolerance and only compared when both sides carry one.
fn compare_fields(left: &Grant, right: &Grant) -> Vec<&'static str> {
    let mut differing = Vec::new();

    if !left.granted_by.is_empty()
        && !right.granted_by.is_empty()
        && left.granted_by != right.granted_by
    {
        differing.push("GrantedBy");
    }
    if let (Some(l), Some(r)) = (left.created_at, right.created_at) {
        if (l - r).abs() > Duration::seconds(1) {
            differing.push("CreatedOn");
        }
    }
    if left.with_grant_option != right.with_grant_option {
        differing.push("WithGrantOption");
    }
    differing
}

fn one_sided(grant: &Grant, kind: DifferenceKind) -> GrantDifference {
    let on_left = kind == DifferenceKind::Missing;
    GrantDifference {
        key: grant.key(),
        db_name: grant.db_name.clone(),
        schema_name: grant.schema_name.clone(),
        entity_name: grant.entity_name.clone(),
        kind,
        differing_fields: Vec::new(),
        granted_by_left: on_left.then(|| grant.granted_by.clone()),
        granted_by_right: (!on_left).then(|| grant.granted_by.clone()),
        with_grant_option_left: on_left.then_some(grant.with_grant_option),
        with_grant_option_right: (!on_left).then_some(grant.with_grant_option),
        created_at_left: if on_left { grant.created_at } else { None },
        created_at_right: if on_left { None } else { grant.created_at },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::grants::parse_timestamp;

    fn grant(privilege: &str, name: &str, with_grant_option: bool, created: &str) -> Grant {
        Grant {
            privilege: privilege.to_string(),
            object_type: "TABLE".to_string(),
            object_name: name.to_string(),
            db_name: "DB".to_string(),
            schema_name: "S".to_string(),
            entity_name: name.rsplit('.').next().unwrap_or(name).to_string(),
            granted_to: "ROLE_A".to_string(),
            granted_by: "ROLE_B".to_string(),
            with_grant_option,
            created_at: parse_timestamp(created).expect("test timestamp"),
        }
    }

    #[test]
    fn empty_side_aborts_the_diff() {
        let populated = vec![grant("SELECT", "DB.S.T", false, "2024-01-01T00:00:00Z")];
        let err = diff_snapshots("l", &[], "r", &populated).expect_err("empty left");
        assert!(matches!(err, AuditError::EmptySnapshot { side: "left" }));
        let err = diff_snapshots("l", &populated, "r", &[]).expect_err("empty right");
        assert!(matches!(err, AuditError::EmptySnapshot { side: "right" }));
    }

    #[test]
    fn grant_option_mismatch_is_different() {
        let left = vec![grant("SELECT", "DB.S.T", false, "2024-01-01T00:00:00Z")];
        let right = vec![grant("SELECT", "DB.S.T", true, "2024-01-01T00:00:00Z")];
        let report = diff_snapshots("l", &left, "r", &right).expect("preconditions hold");
        assert_eq!(report.differences.len(), 1);
        let d = &report.differences[0];
        assert_eq!(d.kind, DifferenceKind::Different);
        assert_eq!(d.differing_fields, vec!["WithGrantOption"]);
        assert_eq!(d.with_grant_option_left, Some(false));
        assert_eq!(d.with_grant_option_right, Some(true));
    }

    #[test]
    fn sub_second_drift_is_tolerated_two_seconds_is_not() {
        let left = vec![grant("SELECT", "DB.S.T", false, "2024-01-01T00:00:00.000Z")];
        let close = vec![grant("SELECT", "DB.S.T", false, "2024-01-01T00:00:00.400Z")];
        let report = diff_snapshots("l", &left, "r", &close).expect("preconditions hold");
        assert!(report.differences.is_empty(), "400ms drift is equal");

        let far = vec![grant("SELECT", "DB.S.T", false, "2024-01-01T00:00:02.000Z")];
        let report = diff_snapshots("l", &left, "r", &far).expect("preconditions hold");
        assert_eq!(report.differences.len(), 1);
        assert_eq!(report.differences[0].differing_fields, vec!["CreatedOn"]);
    }

    #[test]
    fn missing_and_extra_counts_add_up() {
        let shared = grant("SELECT", "DB.S.T", false, "2024-01-01T00:00:00Z");
        let left = vec![
            shared.clone(),
            grant("INSERT", "DB.S.T", false, "2024-01-01T00:00:00Z"),
        ];
        let right = vec![
            shared,
            grant("DELETE", "DB.S.T", false, "2024-01-01T00:00:00Z"),
        ];
        let report = diff_snapshots("l", &left, "r", &right).expect("preconditions hold");
        assert_eq!(report.count_of(DifferenceKind::Missing), 1);
        assert_eq!(report.count_of(DifferenceKind::Extra), 1);
        assert_eq!(report.count_of(DifferenceKind::Different), 0);
        assert_eq!(report.differences.len(), 2);
        assert_eq!(report.differences[0].kind, DifferenceKind::Missing);
        assert_eq!(report.differences[1].kind, DifferenceKind::Extra);
    }

    #[test]
    fn swapping_sides_swaps_labels_but_not_the_key_set() {
        let left = vec![
            grant("SELECT", "DB.S.T", false, "2024-01-01T00:00:00Z"),
            grant("INSERT", "DB.S.T", false, "2024-01-01T00:00:00Z"),
        ];
        let right = vec![
            grant("SELECT", "DB.S.T", true, "2024-01-01T00:00:00Z"),
            grant("DELETE", "DB.S.T", false, "2024-01-01T00:00:00Z"),
        ];
        let forward = diff_snapshots("l", &left, "r", &right).expect("preconditions hold");
        let backward = diff_snapshots("r", &right, "l", &left).expect("preconditions hold");

        let mut forward_keys: Vec<String> =
            forward.differences.iter().map(|d| d.key.to_string()).collect();
        let mut backward_keys: Vec<String> =
            backward.differences.iter().map(|d| d.key.to_string()).collect();
        forward_keys.sort();
        backward_keys.sort();
        assert_eq!(forward_keys, backward_keys);

        assert_eq!(forward.count_of(DifferenceKind::Missing), 1);
        assert_eq!(forward.count_of(DifferenceKind::Extra), 1);
        assert_eq!(backward.count_of(DifferenceKind::Missing), 1);
        assert_eq!(backward.count_of(DifferenceKind::Extra), 1);
    }
}
