use grantscope::error::AuditError;
use grantscope::graph::ancestry::{
    ancestry_paths, build_hierarchy, hierarchy_edges, important_ancestor, rolls_up_to,
    CANONICAL_ROOT,
};
use grantscope::graph::arena::RoleGraph;
use grantscope::normalizer::grants::normalize_role_memberships;
use grantscope::normalizer::raw::RawRoleMembershipRow;

mod support;

#[test]
fn fixture_hierarchy_resolves_expected_edges() {
    let (graph, _) = support::small_account();

    let sysadmin = graph.lookup("SYSADMIN").expect("role should exist");
    let fn_analytics = graph.lookup("FN_ANALYTICS").expect("role should exist");
    let access = graph.lookup("AR_ANALYTICS_R").expect("role should exist");
    let root = graph.lookup(CANONICAL_ROOT).expect("role should exist");

    assert_eq!(graph.role(fn_analytics).parents, vec![sysadmin]);
    assert_eq!(graph.role(fn_analytics).children, vec![access]);
    assert!(rolls_up_to(&graph, access, root));
    assert!(!rolls_up_to(&graph, root, access));
}

#[test]
fn fixture_ancestry_paths_reach_the_root() {
    let (graph, _) = support::small_account();
    let access = graph.lookup("AR_ANALYTICS_R").expect("role should exist");
    let paths = ancestry_paths(&graph, access, None).expect("fixture graph is acyclic");
    assert_eq!(
        paths,
        vec!["ACCOUNTADMIN->SYSADMIN->FN_ANALYTICS->AR_ANALYTICS_R".to_string()]
    );
}

#[test]
fn orphan_role_reports_itself_as_path_and_ancestor() {
    let (graph, _) = support::small_account();
    let orphan = graph.lookup("ORPHAN_ROLE").expect("role should exist");
    let paths = ancestry_paths(&graph, orphan, None).expect("fixture graph is acyclic");
    assert_eq!(paths, vec!["ORPHAN_ROLE".to_string()]);
    assert_eq!(important_ancestor(&graph, orphan, &paths), "ORPHAN_ROLE");
}

#[test]
fn access_role_reports_nearest_non_functional_ancestor() {
    let (graph, _) = support::small_account();
    let access = graph.lookup("AR_ANALYTICS_R").expect("role should exist");
    let paths = ancestry_paths(&graph, access, None).expect("fixture graph is acyclic");
    // FN_ANALYTICS is Functional, so the walk continues up to SYSADMIN.
    assert_eq!(important_ancestor(&graph, access, &paths), "SYSADMIN");
}

#[test]
fn user_assignments_attach_to_their_roles() {
    let (graph, _) = support::small_account();
    let access = graph.lookup("AR_ANALYTICS_R").expect("role should exist");
    let fn_analytics = graph.lookup("FN_ANALYTICS").expect("role should exist");
    assert_eq!(graph.role(access).assigned_users, vec!["ALICE".to_string()]);
    assert_eq!(
        graph.role(fn_analytics).assigned_users,
        vec!["BOB".to_string()]
    );
}

#[test]
fn hierarchy_edges_cover_every_parent_child_pair() {
    let (graph, _) = support::small_account();
    let edges = hierarchy_edges(&graph, None).expect("fixture graph is acyclic");
    // SECURITYADMIN, SYSADMIN, USERADMIN, FN_ANALYTICS, AR_ANALYTICS_R,
    // USER_MGMT each have exactly one parent.
    assert_eq!(edges.len(), 6);
    assert!(edges
        .iter()
        .any(|e| e.parent_name == "FN_ANALYTICS" && e.child_name == "AR_ANALYTICS_R"));
    let access_edge = edges
        .iter()
        .find(|e| e.child_name == "AR_ANALYTICS_R")
        .expect("edge should exist");
    assert_eq!(access_edge.important_ancestor, "SYSADMIN");
    assert_eq!(
        access_edge.ancestry_paths,
        "ACCOUNTADMIN->SYSADMIN->FN_ANALYTICS->AR_ANALYTICS_R"
    );
}

#[test]
fn cross_granted_hierarchy_multiplies_paths_and_caps_deterministically() {
    let mut graph = RoleGraph::new();
    let rows: Vec<RawRoleMembershipRow> = [
        ("L1_A", CANONICAL_ROOT),
        ("L1_B", CANONICAL_ROOT),
        ("L2", "L1_A"),
        ("L2", "L1_B"),
        ("L3", "L2"),
    ]
    .iter()
    .map(|(role, grantee)| RawRoleMembershipRow {
        created_on: String::new(),
        role: (*role).to_string(),
        granted_to: "ROLE".to_string(),
        grantee_name: (*grantee).to_string(),
        granted_by: String::new(),
        deleted_on: None,
    })
    .collect();
    let grants = normalize_role_memberships(&rows);
    for grant in &grants {
        graph.ensure_role(&grant.granted_to);
        graph.ensure_role(&grant.object_name);
    }
    build_hierarchy(&mut graph, &grants);

    let l3 = graph.lookup("L3").expect("role should exist");
    let paths = ancestry_paths(&graph, l3, None).expect("acyclic");
    assert_eq!(
        paths,
        vec![
            "ACCOUNTADMIN->L1_A->L2->L3".to_string(),
            "ACCOUNTADMIN->L1_B->L2->L3".to_string(),
        ]
    );

    let capped = ancestry_paths(&graph, l3, Some(1)).expect("cap must not fail");
    assert_eq!(capped, vec!["ACCOUNTADMIN->L1_A->L2->L3".to_string()]);
}

#[test]
fn role_cycle_is_a_reported_error() {
    let mut graph = RoleGraph::new();
    let a = graph.ensure_role("A");
    let b = graph.ensure_role("B");
    let c = graph.ensure_role("C");
    graph.add_edge(a, b);
    graph.add_edge(b, c);
    graph.add_edge(c, a);
    let err = hierarchy_edges(&graph, None).expect_err("cycle should surface");
    assert!(matches!(err, AuditError::RoleCycle { .. }));
}
