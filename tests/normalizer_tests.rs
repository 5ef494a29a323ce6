use grantscope::normalizer::grants::dedup_grants;
use grantscope::normalizer::names::{derive_name_parts, serialize_name_parts, split_object_name};

mod support;

#[test]
fn overlapping_sources_dedup_to_a_set() {
    // The FN_ANALYTICS -> SYSADMIN role grant appears both in the grant
    // snapshot and in the role membership rows.
    let grants = support::small_account_grants();
    let fn_usage: Vec<_> = grants
        .iter()
        .filter(|g| {
            g.object_type == "ROLE" && g.object_name == "FN_ANALYTICS" && g.granted_to == "SYSADMIN"
        })
        .collect();
    assert_eq!(fn_usage.len(), 1, "the same fact must never be double-counted");
}

#[test]
fn normalizing_twice_changes_nothing() {
    let grants = support::small_account_grants();
    let again = dedup_grants(grants.clone());
    assert_eq!(grants.len(), again.len());
}

#[test]
fn name_parsing_is_idempotent_for_every_fixture_grant() {
    for grant in support::small_account_grants() {
        let segments = split_object_name(&grant.object_name);
        let parts = derive_name_parts(&grant.object_type, &segments);
        assert_eq!(parts.db_name, grant.db_name, "{}", grant.object_name);
        assert_eq!(parts.schema_name, grant.schema_name, "{}", grant.object_name);
        assert_eq!(parts.entity_name, grant.entity_name, "{}", grant.object_name);

        let serialized = serialize_name_parts(&grant.object_type, &parts);
        let reparsed = derive_name_parts(&grant.object_type, &split_object_name(&serialized));
        assert_eq!(parts, reparsed, "{}", grant.object_name);
    }
}

#[test]
fn historical_export_schema_normalizes_fully() {
    let grants = support::load_snapshot("historical_export.json");

    // The soft-deleted INSERT row is excluded.
    assert_eq!(grants.len(), 3);
    assert!(!grants.iter().any(|g| g.privilege == "INSERT"));

    // Multi-word object types are folded to underscores.
    let mv = grants
        .iter()
        .find(|g| g.object_type == "MATERIALIZED_VIEW")
        .expect("materialized view grant should survive");
    // The dotted name component is re-quoted in the combined name.
    assert_eq!(mv.object_name, r#"ANALYTICS.PUBLIC."DAILY.AGG""#);
    assert_eq!(mv.entity_name, "DAILY.AGG");
    assert_eq!(mv.db_name, "ANALYTICS");

    // Account-scoped rows carry no catalog/schema.
    let wh = grants
        .iter()
        .find(|g| g.object_type == "WAREHOUSE")
        .expect("warehouse grant should survive");
    assert_eq!(wh.object_name, "COMPUTE_WH");
    assert!(wh.db_name.is_empty());
    assert!(wh.with_grant_option);
}

#[test]
fn interactive_and_export_rows_normalize_to_the_same_fact() {
    let export = support::load_snapshot("historical_export.json");
    let interactive = support::load_snapshot("small_account/grants.json");

    let from_export = export
        .iter()
        .find(|g| g.privilege == "SELECT" && g.object_type == "TABLE")
        .expect("export SELECT grant");
    let from_interactive = interactive
        .iter()
        .find(|g| g.privilege == "SELECT" && g.object_type == "TABLE")
        .expect("interactive SELECT grant");
    assert_eq!(from_export.key(), from_interactive.key());
}
