#![allow(dead_code)]

use std::path::PathBuf;

use grantscope::classifier::role_classifier::classify_roles;
use grantscope::graph::ancestry::{build_hierarchy, seed_roles};
use grantscope::graph::arena::RoleGraph;
use grantscope::normalizer::grants::{
    dedup_grants, normalize_role_memberships, normalize_snapshot, Grant,
};
use grantscope::normalizer::raw::{parse_rows, RawRoleMembershipRow, RawRoleRow, RawSnapshotRow};

pub(crate) fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(relative)
}

pub(crate) fn read_fixture(relative: &str) -> String {
    std::fs::read_to_string(fixture_path(relative)).expect("fixture should be readable")
}

pub(crate) fn load_snapshot(relative: &str) -> Vec<Grant> {
    let rows: Vec<RawSnapshotRow> =
        parse_rows(&read_fixture(relative)).expect("fixture rows should parse");
    dedup_grants(normalize_snapshot(&rows))
}

pub(crate) fn load_role_rows(relative: &str) -> Vec<RawRoleRow> {
    parse_rows(&read_fixture(relative)).expect("fixture role rows should parse")
}

pub(crate) fn load_membership_rows(relative: &str) -> Vec<RawRoleMembershipRow> {
    parse_rows(&read_fixture(relative)).expect("fixture membership rows should parse")
}

/// Normalized grant set of the small account fixture: snapshot grants plus
/// role memberships, deduplicated.
pub(crate) fn small_account_grants() -> Vec<Grant> {
    let rows: Vec<RawSnapshotRow> = parse_rows(&read_fixture("small_account/grants.json"))
        .expect("fixture rows should parse");
    let mut grants = normalize_snapshot(&rows);
    grants.extend(normalize_role_memberships(&load_membership_rows(
        "small_account/role_grants.json",
    )));
    dedup_grants(grants)
}

/// Fully built and classified graph of the small account fixture.
pub(crate) fn small_account() -> (RoleGraph, Vec<Grant>) {
    let grants = small_account_grants();
    let mut graph = RoleGraph::new();
    seed_roles(&mut graph, &load_role_rows("small_account/roles.json"));
    build_hierarchy(&mut graph, &grants);
    classify_roles(&mut graph, &grants);
    (graph, grants)
}
