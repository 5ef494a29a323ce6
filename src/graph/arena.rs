//! Arena-allocated role graph.
//!
//! Roles live in a flat `Vec` addressed by [`RoleId`]; parent/child edges are
//! adjacency lists of ids. This sidesteps the ownership cycles a
//! shared-node graph would create and gives every traversal a cheap
//! visited-set representation.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::classifier::role_types::RoleType;

/// Index of a role in the arena.
pub type RoleId = usize;

/// A principal node in the role-inheritance graph.
#[derive(Debug, Clone)]
pub struct Role {
    /// Role name.
    pub name: String,
    /// Owning principal.
    pub owner: String,
    /// Free-form comment from the role list.
    pub comment: String,
    /// Role creation timestamp.
    pub created_at: Option<DateTime<FixedOffset>>,
    /// Governance category, `Unknown` until classified.
    pub role_type: RoleType,
    /// Roles this role is granted to (the containing roles), insertion order.
    pub parents: Vec<RoleId>,
    /// Roles granted to this role (the contained roles), insertion order.
    pub children: Vec<RoleId>,
    /// Users directly assigned this role.
    pub assigned_users: Vec<String>,
}

impl Role {
    fn new(name: &str) -> Self {
        Role {
            name: name.to_string(),
            owner: String::new(),
            comment: String::new(),
            created_at: None,
            role_type: RoleType::Unknown,
            parents: Vec::new(),
            children: Vec::new(),
            assigned_users: Vec::new(),
        }
    }
}

/// The role arena plus a name index.
#[derive(Debug, Clone, Default)]
pub struct RoleGraph {
    roles: Vec<Role>,
    index: HashMap<String, RoleId>,
}

impl RoleGraph {
    /// Empty graph.
    pub fn new() -> Self {
        RoleGraph::default()
    }

    /// Number of roles in the arena.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// True when no roles are present.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Insert a role from the role list, or enrich the existing entry.
    pub fn insert_role(
        &mut self,
        name: &str,
        owner: &str,
        comment: &str,
        created_at: Option<DateTime<FixedOffset>>,
    ) -> RoleId {
        let id = self.ensure_role(name);
        let role = &mut self.roles[id];
        role.owner = owner.to_string();
        role.comment = comment.to_string();
        role.created_at = created_at;
        id
    }

    /// Look up a role id without creating it.
    pub fn lookup(&self, name: &str) -> Option<RoleId> {
        self.index.get(name).copied()
    }

    /// Get or create the role with this name.
    pub fn ensure_role(&mut self, name: &str) -> RoleId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.roles.len();
        self.roles.push(Role::new(name));
        self.index.insert(name.to_string(), id);
        id
    }

    /// Borrow a role by id.
    pub fn role(&self, id: RoleId) -> &Role {
        &self.roles[id]
    }

    /// Iterate roles in insertion order with their ids.
    pub fn roles(&self) -> impl Iterator<Item = (RoleId, &Role)> {
        self.roles.iter().enumerate()
    }

    /// Add a parent→child edge, ignoring duplicates. Insertion order of the
    /// adjacency lists is preserved; the first-listed parent drives the
    /// important-ancestor walk.
    pub fn add_edge(&mut self, parent: RoleId, child: RoleId) {
        if parent == child {
            return;
        }
        if !self.roles[child].parents.contains(&parent) {
            self.roles[child].parents.push(parent);
        }
        if !self.roles[parent].children.contains(&child) {
            self.roles[parent].children.push(child);
        }
    }

    /// Record a direct user assignment on a role, ignoring duplicates.
    pub fn add_user_assignment(&mut self, role: RoleId, user: &str) {
        let users = &mut self.roles[role].assigned_users;
        if !users.iter().any(|u| u == user) {
            users.push(user.to_string());
        }
    }

    /// Set the governance category of a role.
    pub fn set_role_type(&mut self, role: RoleId, role_type: RoleType) {
        self.roles[role].role_type = role_type;
    }
}
