/// Canonical [`Grant`](grants::Grant) records, normalization, and dedup.
pub mod grants;
/// Quote-aware object-name splitting and `(db, schema, entity)` derivation.
pub mod names;
/// Serde structs for the raw snapshot row schemas.
pub mod raw;
