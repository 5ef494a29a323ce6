use std::path::{Component, Path};

use crate::error::AuditError;

/// Rendered artifacts for one audit run.
#[derive(Debug, Default)]
pub struct OutputArtifacts {
    /// Canonical grant table CSV.
    pub grants_csv: String,
    /// Canonical role table CSV.
    pub roles_csv: String,
    /// One `(object_type, csv)` pair per pivoted table.
    pub pivot_csvs: Vec<(String, String)>,
    /// Grant-difference table CSV, present in comparison mode.
    pub differences_csv: Option<String>,
    /// Markdown summary report.
    pub report_md: String,
}

/// Write all output files to the specified directory.
pub fn write_output(
    output_dir: &Path,
    name: &str,
    artifacts: &OutputArtifacts,
) -> Result<(), AuditError> {
    validate_output_name(name)?;

    std::fs::create_dir_all(output_dir).map_err(|e| AuditError::Io {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    write_file(output_dir, &format!("{name}_grants.csv"), &artifacts.grants_csv)?;
    write_file(output_dir, &format!("{name}_roles.csv"), &artifacts.roles_csv)?;
    for (object_type, csv) in &artifacts.pivot_csvs {
        let suffix = object_type.to_lowercase();
        write_file(output_dir, &format!("{name}_pivot_{suffix}.csv"), csv)?;
    }
    if let Some(differences) = &artifacts.differences_csv {
        write_file(output_dir, &format!("{name}_differences.csv"), differences)?;
    }
    write_file(output_dir, &format!("{name}_report.md"), &artifacts.report_md)?;

    Ok(())
}

fn write_file(output_dir: &Path, file_name: &str, content: &str) -> Result<(), AuditError> {
    let path = output_dir.join(file_name);
    std::fs::write(&path, content).map_err(|e| AuditError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn validate_output_name(name: &str) -> Result<(), AuditError> {
    let reject = |reason: &str| {
        Err(AuditError::OutputName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };
    if name.trim().is_empty() {
        return reject("must not be empty");
    }
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return reject("absolute paths are not allowed");
    }
    if candidate.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return reject("traversal segments are not allowed");
    }
    if name.contains('/') || name.contains('\\') {
        return reject("path separators are not allowed");
    }
    Ok(())
}
