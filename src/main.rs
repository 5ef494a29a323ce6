//! CLI entry point for `grantscope`.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use grantscope::classifier::role_classifier;
use grantscope::diff::grant_diff;
use grantscope::graph::ancestry;
use grantscope::graph::arena::RoleGraph;
use grantscope::normalizer::grants::{self, Grant};
use grantscope::normalizer::raw::{self, RawRoleMembershipRow, RawRoleRow, RawSnapshotRow};
use grantscope::output::formatter::{self, OutputArtifacts};
use grantscope::output::{report, tables};
use grantscope::pivot::engine;

#[derive(Parser)]
#[command(
    name = "grantscope",
    about = "Audit RBAC grants: role hierarchy, governance classification, privilege pivots, and snapshot diffing"
)]
struct Cli {
    /// Input grant snapshot JSON files (array or JSON-lines)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Role list JSON file
    #[arg(long)]
    roles: Option<PathBuf>,

    /// Role membership JSON file
    #[arg(long)]
    role_grants: Option<PathBuf>,

    /// Diff against a second snapshot instead of analyzing the hierarchy
    #[arg(long)]
    compare: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "grantscope-output")]
    output_dir: PathBuf,

    /// Output artifact base name (derived from the first input when omitted)
    #[arg(long)]
    name: Option<String>,

    /// Soft cap on enumerated ancestry paths per role
    #[arg(long)]
    max_ancestry_paths: Option<usize>,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Stage 1: read and normalize grant snapshots
    let mut collected = Vec::new();
    for path in &cli.input {
        collected.extend(read_snapshot(path));
    }
    if let Some(path) = &cli.role_grants {
        let rows: Vec<RawRoleMembershipRow> = read_rows(path);
        collected.extend(grants::normalize_role_memberships(&rows));
    }
    let left = grants::dedup_grants(collected);

    if cli.verbose {
        eprintln!("Normalized {} canonical grants", left.len());
    }

    let name = cli.name.clone().unwrap_or_else(|| {
        cli.input
            .first()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("audit")
            .to_string()
    });

    // Stage 2 (compare mode): diff the two snapshots and stop
    if let Some(compare_path) = &cli.compare {
        let right = grants::dedup_grants(read_snapshot(compare_path));
        let left_label = cli
            .input
            .first()
            .map_or_else(|| "left".to_string(), |p| p.display().to_string());
        let right_label = compare_path.display().to_string();

        let diff = match grant_diff::diff_snapshots(&left_label, &left, &right_label, &right) {
            Ok(diff) => diff,
            Err(e) => {
                eprintln!("Comparison failed: {e}");
                process::exit(2);
            }
        };

        let artifacts = OutputArtifacts {
            differences_csv: Some(tables::differences_table(&diff)),
            report_md: report::build_report(&RoleGraph::new(), &left, &[], &[], Some(&diff)),
            ..OutputArtifacts::default()
        };
        if let Err(e) = formatter::write_output(&cli.output_dir, &name, &artifacts) {
            eprintln!("Error writing output: {e}");
            process::exit(2);
        }
        if cli.verbose {
            eprintln!("Found {} differences", diff.differences.len());
        }
        if !diff.differences.is_empty() {
            process::exit(1);
        }
        return;
    }

    // Stage 3: seed roles from the role list, or infer them from grants
    let mut graph = RoleGraph::new();
    if let Some(path) = &cli.roles {
        let rows: Vec<RawRoleRow> = read_rows(path);
        ancestry::seed_roles(&mut graph, &rows);
    } else {
        ancestry::infer_roles_from_grants(&mut graph, &left);
    }

    // Stage 4: hierarchy edges and user assignments
    ancestry::build_hierarchy(&mut graph, &left);

    // Stage 5: classify governance posture
    role_classifier::classify_roles(&mut graph, &left);

    // Stage 6: pivot per object type
    let pivot_tables = engine::pivot_all(&left);

    // Stage 7: render and write
    let edges = match ancestry::hierarchy_edges(&graph, cli.max_ancestry_paths) {
        Ok(edges) => edges,
        Err(e) => {
            eprintln!("Hierarchy analysis failed: {e}");
            process::exit(2);
        }
    };
    let roles_csv = match tables::roles_table(&graph, cli.max_ancestry_paths) {
        Ok(csv) => csv,
        Err(e) => {
            eprintln!("Hierarchy analysis failed: {e}");
            process::exit(2);
        }
    };
    let artifacts = OutputArtifacts {
        grants_csv: tables::grants_table(&left),
        roles_csv,
        pivot_csvs: pivot_tables
            .iter()
            .map(|t| (t.object_type.clone(), tables::pivot_table(t)))
            .collect(),
        differences_csv: None,
        report_md: report::build_report(&graph, &left, &pivot_tables, &edges, None),
    };
    if let Err(e) = formatter::write_output(&cli.output_dir, &name, &artifacts) {
        eprintln!("Error writing output: {e}");
        process::exit(2);
    }
}

fn read_snapshot(path: &Path) -> Vec<Grant> {
    let rows: Vec<RawSnapshotRow> = read_rows(path);
    grants::normalize_snapshot(&rows)
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(2);
        }
    };
    match raw::parse_rows(&content) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", path.display());
            process::exit(2);
        }
    }
}
