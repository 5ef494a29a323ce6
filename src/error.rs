use thiserror::Error;

/// Errors the engine surfaces to its caller.
///
/// Skip-and-continue conditions (malformed rows, unresolved role references,
/// pivot column overflow) are logged and never reach this type; only the
/// conditions that abort a computation do.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A grant snapshot handed to the diff engine was empty; no comparison
    /// occurred.
    #[error("empty {side} grant snapshot: no comparison occurred")]
    EmptySnapshot {
        /// Which side of the comparison was empty (`"left"` or `"right"`).
        side: &'static str,
    },

    /// The role-inheritance graph contains a cycle, which the ingestion
    /// contract assumes away. Reported instead of recursing forever.
    #[error("role inheritance cycle detected at '{role}'")]
    RoleCycle {
        /// Role at which the cycle was detected.
        role: String,
    },

    /// An output artifact name would escape the output directory.
    #[error("invalid output name '{name}': {reason}")]
    OutputName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Writing an output artifact failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Path of the artifact that could not be written.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
