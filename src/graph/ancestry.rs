//! Hierarchy construction and ancestry analysis.
//!
//! Edges come from canonical ROLE/USAGE grants: the grantee contains the
//! granted role, so parent = `granted_to`, child = `object_name`. Ancestry
//! enumeration lists every simple path from a role to each root; the result
//! set size is the product of branching at every ancestor level, which is
//! combinatorial for densely cross-granted hierarchies — callers may cap it.
//! All traversals are guarded: a cycle in the input surfaces as
//! [`AuditError::RoleCycle`] instead of unbounded recursion.

use tracing::{debug, warn};

use crate::classifier::role_types::RoleType;
use crate::error::AuditError;
use crate::graph::arena::{RoleGraph, RoleId};
use crate::normalizer::grants::{parse_timestamp, Grant};
use crate::normalizer::raw::RawRoleRow;

/// The platform's canonical root role.
pub const CANONICAL_ROOT: &str = "ACCOUNTADMIN";

/// One parent→child relation surfaced for reporting.
#[derive(Debug, Clone)]
pub struct RoleHierarchyEdge {
    /// Contained role.
    pub child_name: String,
    /// Containing role.
    pub parent_name: String,
    /// Newline-joined `root->...->child` chains.
    pub ancestry_paths: String,
    /// Nearest governance-relevant ancestor.
    pub important_ancestor: String,
}

/// Seed the arena from role list rows; soft-deleted and malformed rows are
/// skipped.
pub fn seed_roles(graph: &mut RoleGraph, rows: &[RawRoleRow]) {
    for row in rows {
        if row.is_deleted() {
            continue;
        }
        let name = row.name.trim();
        if name.is_empty() {
            warn!("skipping role row with empty name");
            continue;
        }
        let created_at = match parse_timestamp(&row.created_on) {
            Ok(ts) => ts,
            Err(reason) => {
                warn!(role = %name, %reason, "skipping malformed role row");
                continue;
            }
        };
        graph.insert_role(name, row.owner.trim(), row.comment.trim(), created_at);
    }
}

/// Seed the arena from ROLE/USAGE grant endpoints.
///
/// Used when no role list is available; with an authoritative role list the
/// graph stays best-effort over the listed roles only.
pub fn infer_roles_from_grants(graph: &mut RoleGraph, grants: &[Grant]) {
    for grant in role_usage_grants(grants) {
        graph.ensure_role(&grant.granted_to);
        graph.ensure_role(&grant.object_name);
    }
}

/// Add a parent→child edge for every ROLE/USAGE grant whose endpoints both
/// resolve to known roles, and record user assignments from USER/USAGE
/// grants. Unresolved endpoints are skipped.
pub fn build_hierarchy(graph: &mut RoleGraph, grants: &[Grant]) {
    let mut skipped = 0usize;
    for grant in role_usage_grants(grants) {
        match (graph.lookup(&grant.granted_to), graph.lookup(&grant.object_name)) {
            (Some(parent), Some(child)) => graph.add_edge(parent, child),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "skipped role grants with unresolved endpoints");
    }

    for grant in grants {
        if grant.object_type == "USER" && grant.privilege == "USAGE" {
            if let Some(role) = graph.lookup(&grant.object_name) {
                graph.add_user_assignment(role, &grant.granted_to);
            }
        }
    }
}

fn role_usage_grants(grants: &[Grant]) -> impl Iterator<Item = &Grant> {
    grants
        .iter()
        .filter(|g| g.object_type == "ROLE" && g.privilege == "USAGE")
}

/// Enumerate every simple path from `role` to each root, as
/// `root->...->role` strings in first-listed-parent order.
///
/// A parentless role yields one single-element path. `max_paths` truncates
/// the enumeration deterministically (the first paths in parent order are
/// kept) with a warning. A cycle is reported as [`AuditError::RoleCycle`].
pub fn ancestry_paths(
    graph: &RoleGraph,
    role: RoleId,
    max_paths: Option<usize>,
) -> Result<Vec<String>, AuditError> {
    let mut paths = Vec::new();
    let mut chain = Vec::new();
    let mut on_path = vec![false; graph.len()];
    let mut truncated = false;
    walk_up(
        graph,
        role,
        &mut chain,
        &mut on_path,
        &mut paths,
        max_paths,
        &mut truncated,
    )?;
    if truncated {
        warn!(
            role = %graph.role(role).name,
            cap = max_paths.unwrap_or(0),
            "ancestry path enumeration truncated at cap"
        );
    }
    Ok(paths)
}

fn walk_up(
    graph: &RoleGraph,
    current: RoleId,
    chain: &mut Vec<RoleId>,
    on_path: &mut [bool],
    paths: &mut Vec<String>,
    max_paths: Option<usize>,
    truncated: &mut bool,
) -> Result<(), AuditError> {
    if on_path[current] {
        return Err(AuditError::RoleCycle {
            role: graph.role(current).name.clone(),
        });
    }
    if max_paths.is_some_and(|cap| paths.len() >= cap) {
        *truncated = true;
        return Ok(());
    }

    on_path[current] = true;
    chain.push(current);

    let parents = &graph.role(current).parents;
    if parents.is_empty() {
        let names: Vec<&str> = chain
            .iter()
            .rev()
            .map(|&id| graph.role(id).name.as_str())
            .collect();
        paths.push(names.join("->"));
    } else {
        for &parent in parents {
            walk_up(graph, parent, chain, on_path, paths, max_paths, truncated)?;
            if *truncated {
                break;
            }
        }
    }

    chain.pop();
    on_path[current] = false;
    Ok(())
}

/// Transitive ancestor-containment test over `parents`, short-circuiting on
/// first match. A role rolls up to itself; the visited set guarantees
/// termination even on malformed cyclic input.
pub fn rolls_up_to(graph: &RoleGraph, role: RoleId, ancestor: RoleId) -> bool {
    if role == ancestor {
        return true;
    }
    let mut visited = vec![false; graph.len()];
    let mut stack = vec![role];
    while let Some(current) = stack.pop() {
        if visited[current] {
            continue;
        }
        visited[current] = true;
        for &parent in &graph.role(current).parents {
            if parent == ancestor {
                return true;
            }
            if !visited[parent] {
                stack.push(parent);
            }
        }
    }
    false
}

/// Derive the nearest governance-relevant ancestor of a role.
///
/// When no ancestry path starts at the canonical root, the important
/// ancestor is whichever disconnected root the first path reached. For
/// Functional/Access roles it is the nearest non-Functional/non-Access
/// ancestor along the first-listed parent chain; every other category
/// defaults to the canonical root.
pub fn important_ancestor(graph: &RoleGraph, role: RoleId, paths: &[String]) -> String {
    let root_prefix = format!("{CANONICAL_ROOT}->");
    let reaches_root = paths
        .iter()
        .any(|p| p == CANONICAL_ROOT || p.starts_with(&root_prefix));
    if !reaches_root {
        return paths
            .first()
            .and_then(|p| p.split("->").next())
            .map(str::to_string)
            .unwrap_or_else(|| graph.role(role).name.clone());
    }

    match graph.role(role).role_type {
        RoleType::Functional | RoleType::Access => {
            let mut visited = vec![false; graph.len()];
            let mut current = role;
            loop {
                if visited[current] {
                    return CANONICAL_ROOT.to_string();
                }
                visited[current] = true;
                let Some(&parent) = graph.role(current).parents.first() else {
                    return graph.role(current).name.clone();
                };
                if !matches!(
                    graph.role(parent).role_type,
                    RoleType::Functional | RoleType::Access
                ) {
                    return graph.role(parent).name.clone();
                }
                current = parent;
            }
        }
        _ => CANONICAL_ROOT.to_string(),
    }
}

/// Surface one reporting row per parent→child relation.
pub fn hierarchy_edges(
    graph: &RoleGraph,
    max_paths: Option<usize>,
) -> Result<Vec<RoleHierarchyEdge>, AuditError> {
    let mut edges = Vec::new();
    for (id, role) in graph.roles() {
        if role.parents.is_empty() {
            continue;
        }
        let paths = ancestry_paths(graph, id, max_paths)?;
        let important = important_ancestor(graph, id, &paths);
        let joined = paths.join("\n");
        for &parent in &role.parents {
            edges.push(RoleHierarchyEdge {
                child_name: role.name.clone(),
                parent_name: graph.role(parent).name.clone(),
                ancestry_paths: joined.clone(),
                important_ancestor: important.clone(),
            });
        }
    }
    Ok(edges)
}
