//! Role-type classification.
//!
//! Each role is evaluated against a strict-precedence rule chain (first
//! matching rule wins), then a set of ordered post-corrections that may
//! override the result. "Rolls up to" tests are memoized for the duration of
//! one classification pass; the reference behavior re-walks the graph on
//! every test, which is correct but not scalable.

use std::collections::{HashMap, HashSet};

use crate::classifier::role_types::RoleType;
use crate::graph::ancestry;
use crate::graph::arena::{RoleGraph, RoleId};
use crate::normalizer::grants::Grant;

/// The platform's built-in administration roles.
pub const BUILT_IN_ROLE_NAMES: &[&str] = &[
    "ACCOUNTADMIN",
    "SECURITYADMIN",
    "USERADMIN",
    "SYSADMIN",
    "PUBLIC",
];

/// Directory-sync provisioner roles.
pub const SCIM_PROVISIONER_NAMES: &[&str] = &[
    "OKTA_PROVISIONER",
    "AAD_PROVISIONER",
    "GENERIC_SCIM_PROVISIONER",
];

/// Privileges that do not make a role an access role on their own.
const ACCESS_EXCLUDED_PRIVILEGES: &[&str] =
    &["USAGE", "OWNERSHIP", "MONITOR", "REFERENCES", "REBUILD"];

/// Object types whose direct privileges make a role an access role.
const ACCESS_OBJECT_TYPES: &[&str] = &["SCHEMA", "TABLE", "VIEW"];

struct AdminRoles {
    accountadmin: RoleId,
    securityadmin: RoleId,
    useradmin: RoleId,
    sysadmin: RoleId,
}

fn resolve_admin_roles(graph: &RoleGraph) -> Option<AdminRoles> {
    Some(AdminRoles {
        accountadmin: graph.lookup("ACCOUNTADMIN")?,
        securityadmin: graph.lookup("SECURITYADMIN")?,
        useradmin: graph.lookup("USERADMIN")?,
        sysadmin: graph.lookup("SYSADMIN")?,
    })
}

/// Memoizes rollup results within one classification pass. No failure state
/// survives the pass; every call to [`classify_roles`] starts fresh.
struct RollupMemo {
    cache: HashMap<(RoleId, RoleId), bool>,
}

impl RollupMemo {
    fn new() -> Self {
        RollupMemo {
            cache: HashMap::new(),
        }
    }

    fn rolls_up(&mut self, graph: &RoleGraph, from: RoleId, to: RoleId) -> bool {
        if let Some(&hit) = self.cache.get(&(from, to)) {
            return hit;
        }
        let result = ancestry::rolls_up_to(graph, from, to);
        self.cache.insert((from, to), result);
        result
    }
}

/// Classify every role in the graph, mutating each role's `role_type`.
pub fn classify_roles(graph: &mut RoleGraph, grants: &[Grant]) {
    // Roles with at least one direct data privilege on an access object type.
    let access_holders: HashSet<&str> = grants
        .iter()
        .filter(|g| {
            ACCESS_OBJECT_TYPES.contains(&g.object_type.as_str())
                && !ACCESS_EXCLUDED_PRIVILEGES.contains(&g.privilege.as_str())
        })
        .map(|g| g.granted_to.as_str())
        .collect();

    // Roles granted USAGE on at least one other role.
    let usage_granters: HashSet<&str> = grants
        .iter()
        .filter(|g| {
            g.object_type == "ROLE" && g.privilege == "USAGE" && g.object_name != g.granted_to
        })
        .map(|g| g.granted_to.as_str())
        .collect();

    let mut memo = RollupMemo::new();
    let snapshot: &RoleGraph = graph;
    let admins = resolve_admin_roles(snapshot);

    let assignments: Vec<(RoleId, RoleType)> = snapshot
        .roles()
        .map(|(id, role)| {
            let role_type = classify_one(
                snapshot,
                id,
                &role.name,
                admins.as_ref(),
                &access_holders,
                &usage_granters,
                &mut memo,
            );
            (id, role_type)
        })
        .collect();

    for (id, role_type) in assignments {
        graph.set_role_type(id, role_type);
    }
}

fn classify_one(
    graph: &RoleGraph,
    id: RoleId,
    name: &str,
    admins: Option<&AdminRoles>,
    access_holders: &HashSet<&str>,
    usage_granters: &HashSet<&str>,
    memo: &mut RollupMemo,
) -> RoleType {
    // Rule 1: built-in names win over everything.
    if BUILT_IN_ROLE_NAMES.contains(&name) {
        return RoleType::BuiltIn;
    }
    // Rule 2: provisioner names.
    if SCIM_PROVISIONER_NAMES.contains(&name) {
        return RoleType::Scim;
    }
    // Rule 3: the remaining rules need all four admin roles resolvable.
    let Some(admins) = admins else {
        return RoleType::Unknown;
    };

    let under_sysadmin = memo.rolls_up(graph, id, admins.sysadmin);

    // Rule 4: user/security administration without system administration.
    let base = if (memo.rolls_up(graph, id, admins.useradmin)
        || memo.rolls_up(graph, id, admins.securityadmin))
        && !under_sysadmin
    {
        RoleType::RoleManagement
    // Rule 5: any direct data privilege beyond the excluded set.
    } else if access_holders.contains(name) {
        RoleType::Access
    // Rule 6: grants USAGE on at least one other role.
    } else if usage_granters.contains(name) {
        RoleType::Functional
    } else {
        RoleType::Unknown
    };

    // Rule 7: ordered corrections, each checked against the pre-correction
    // category, later ones overriding earlier ones.
    let mut result = base;
    if !memo.rolls_up(graph, id, admins.accountadmin) {
        result = RoleType::NotUnderAccountAdmin;
    }
    if base == RoleType::Functional && !under_sysadmin {
        result = RoleType::FunctionalNotUnderSysadmin;
    }
    if base == RoleType::Access && !under_sysadmin {
        result = RoleType::AccessNotUnderSysadmin;
    }
    result
}
