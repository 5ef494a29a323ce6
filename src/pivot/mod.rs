/// Per-batch privilege column assignment and the column ceiling.
pub mod columns;
/// Streaming group-by pivot into wide per-object-type tables.
pub mod engine;
