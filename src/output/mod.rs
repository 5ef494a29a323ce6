/// Output-name validation and file writing.
pub mod formatter;
/// Markdown summary report.
pub mod report;
/// CSV rendering of the canonical table contracts.
pub mod tables;
