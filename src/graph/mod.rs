/// Edge building, ancestry paths, rollup tests, and hierarchy edges.
pub mod ancestry;
/// Arena-allocated role graph.
pub mod arena;
