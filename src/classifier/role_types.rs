use serde::{Deserialize, Serialize};
use std::fmt;

/// Governance category of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    /// Not yet classified, or no rule matched.
    Unknown,
    /// One of the platform's built-in administration roles.
    BuiltIn,
    /// A directory-sync provisioner role.
    Scim,
    /// Rolls up to user/security administration but not to system
    /// administration.
    RoleManagement,
    /// Holds direct data privileges on schemas, tables, or views.
    Access,
    /// Aggregates other roles without holding data privileges itself.
    Functional,
    /// Correction: does not roll up to the canonical root.
    NotUnderAccountAdmin,
    /// Correction: functional but not under system administration.
    FunctionalNotUnderSysadmin,
    /// Correction: access-holding but not under system administration.
    AccessNotUnderSysadmin,
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoleType::Unknown => "Unknown",
            RoleType::BuiltIn => "BuiltIn",
            RoleType::Scim => "SCIM",
            RoleType::RoleManagement => "RoleManagement",
            RoleType::Access => "Access",
            RoleType::Functional => "Functional",
            RoleType::NotUnderAccountAdmin => "NotUnderAccountAdmin",
            RoleType::FunctionalNotUnderSysadmin => "FunctionalNotUnderSysadmin",
            RoleType::AccessNotUnderSysadmin => "AccessNotUnderSysadmin",
        };
        write!(f, "{label}")
    }
}
