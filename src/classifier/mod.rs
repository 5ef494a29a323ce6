/// Rule-based role-type classification with strict precedence.
pub mod role_classifier;
/// Governance categories for roles.
pub mod role_types;
