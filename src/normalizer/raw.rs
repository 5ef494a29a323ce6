//! Raw snapshot row schemas.
//!
//! Two grant schemas exist in the wild: the interactive one (a single
//! combined object name) and the historical-export one (separately columned
//! catalog/schema/name plus a soft-delete marker). Role membership and role
//! list rows have one schema each, with uppercase aliases for their
//! historical variants.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// A raw grant row in the interactive schema.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGrantRow {
    /// Grant creation timestamp, ISO-8601.
    pub created_on: String,
    /// Privilege name, e.g. `USAGE` or `SELECT`.
    pub privilege: String,
    /// Object type the privilege applies to, e.g. `TABLE`.
    pub granted_on: String,
    /// Combined, possibly quoted object name.
    pub name: String,
    /// Principal the privilege is granted to.
    pub grantee_name: String,
    /// Principal that issued the grant.
    #[serde(default)]
    pub granted_by: String,
    /// Whether the grantee may re-grant the privilege.
    #[serde(default, deserialize_with = "flag")]
    pub grant_option: bool,
}

/// A raw grant row in the historical-export schema.
///
/// Multi-word object types arrive with spaces in this schema only, and name
/// components are columned separately.
#[derive(Debug, Clone, Deserialize)]
pub struct RawExportGrantRow {
    /// Grant creation timestamp, ISO-8601.
    #[serde(rename = "CREATED_ON", default)]
    pub created_on: String,
    /// Privilege name.
    #[serde(rename = "PRIVILEGE")]
    pub privilege: String,
    /// Object type, possibly with embedded spaces.
    #[serde(rename = "GRANTED_ON")]
    pub granted_on: String,
    /// Terminal object name component.
    #[serde(rename = "NAME")]
    pub name: String,
    /// Database component, empty for account-scoped objects.
    #[serde(rename = "TABLE_CATALOG", default)]
    pub table_catalog: String,
    /// Schema component, empty for database- and account-scoped objects.
    #[serde(rename = "TABLE_SCHEMA", default)]
    pub table_schema: String,
    /// Principal the privilege is granted to.
    #[serde(rename = "GRANTEE_NAME")]
    pub grantee_name: String,
    /// Principal that issued the grant.
    #[serde(rename = "GRANTED_BY", default)]
    pub granted_by: String,
    /// Whether the grantee may re-grant the privilege.
    #[serde(rename = "GRANT_OPTION", default, deserialize_with = "flag")]
    pub grant_option: bool,
    /// Soft-delete marker; a set value excludes the record.
    #[serde(rename = "DELETED_ON", default)]
    pub deleted_on: Option<String>,
}

impl RawExportGrantRow {
    /// True when the soft-delete marker is set.
    pub fn is_deleted(&self) -> bool {
        self.deleted_on.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// A raw grant row in either known schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSnapshotRow {
    /// Historical-export shape (uppercase columns, soft-delete marker).
    Export(RawExportGrantRow),
    /// Interactive shape (single combined object name).
    Interactive(RawGrantRow),
}

/// A raw role membership row: one role granted to a role or user.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoleMembershipRow {
    /// Membership creation timestamp, ISO-8601.
    #[serde(alias = "CREATED_ON", default)]
    pub created_on: String,
    /// Role being granted.
    #[serde(alias = "ROLE")]
    pub role: String,
    /// Kind of grantee: `ROLE` or `USER`.
    #[serde(alias = "GRANTED_TO")]
    pub granted_to: String,
    /// Name of the grantee principal.
    #[serde(alias = "GRANTEE_NAME")]
    pub grantee_name: String,
    /// Principal that issued the grant.
    #[serde(alias = "GRANTED_BY", default)]
    pub granted_by: String,
    /// Soft-delete marker of the historical variant.
    #[serde(alias = "DELETED_ON", default)]
    pub deleted_on: Option<String>,
}

impl RawRoleMembershipRow {
    /// True when the soft-delete marker is set.
    pub fn is_deleted(&self) -> bool {
        self.deleted_on.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// A raw role list row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoleRow {
    /// Role creation timestamp, ISO-8601.
    #[serde(alias = "CREATED_ON", default)]
    pub created_on: String,
    /// Role name.
    #[serde(alias = "NAME")]
    pub name: String,
    /// Owning principal.
    #[serde(alias = "OWNER", default)]
    pub owner: String,
    /// Free-form comment.
    #[serde(alias = "COMMENT", default)]
    pub comment: String,
    /// Soft-delete marker of the historical variant.
    #[serde(alias = "DELETED_ON", default)]
    pub deleted_on: Option<String>,
}

impl RawRoleRow {
    /// True when the soft-delete marker is set.
    pub fn is_deleted(&self) -> bool {
        self.deleted_on.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Parse raw rows from a JSON array or from JSON-lines input.
pub fn parse_rows<T: DeserializeOwned>(input: &str) -> Result<Vec<T>, serde_json::Error> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(input);
    }
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}

/// Accept both JSON booleans and `"true"` / `"false"` strings.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => Ok(s.trim().eq_ignore_ascii_case("true")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactive_row_parses_with_string_flag() {
        let json = r#"{
            "created_on": "2024-01-01T00:00:00Z",
            "privilege": "SELECT",
            "granted_on": "TABLE",
            "name": "DB.S.T",
            "grantee_name": "ANALYST",
            "granted_by": "SYSADMIN",
            "grant_option": "true"
        }"#;
        let row: RawGrantRow = serde_json::from_str(json).expect("row should parse");
        assert!(row.grant_option);
        assert_eq!(row.grantee_name, "ANALYST");
    }

    #[test]
    fn snapshot_row_distinguishes_schemas() {
        let export = r#"{
            "CREATED_ON": "2024-01-01T00:00:00Z",
            "PRIVILEGE": "SELECT",
            "GRANTED_ON": "MATERIALIZED VIEW",
            "NAME": "MV",
            "TABLE_CATALOG": "DB",
            "TABLE_SCHEMA": "S",
            "GRANTEE_NAME": "ANALYST",
            "GRANT_OPTION": false,
            "DELETED_ON": "2024-02-01T00:00:00Z"
        }"#;
        let row: RawSnapshotRow = serde_json::from_str(export).expect("row should parse");
        match row {
            RawSnapshotRow::Export(e) => assert!(e.is_deleted()),
            RawSnapshotRow::Interactive(_) => panic!("expected export schema"),
        }

        let interactive = r#"{
            "created_on": "2024-01-01T00:00:00Z",
            "privilege": "USAGE",
            "granted_on": "ROLE",
            "name": "ANALYST",
            "grantee_name": "SYSADMIN",
            "grant_option": false
        }"#;
        let row: RawSnapshotRow = serde_json::from_str(interactive).expect("row should parse");
        assert!(matches!(row, RawSnapshotRow::Interactive(_)));
    }

    #[test]
    fn parse_rows_accepts_arrays_and_json_lines() {
        let array = r#"[{"created_on":"","name":"R1","owner":"SYSADMIN","comment":""}]"#;
        let rows: Vec<RawRoleRow> = parse_rows(array).expect("array should parse");
        assert_eq!(rows.len(), 1);

        let lines = "{\"name\":\"R1\"}\n\n{\"NAME\":\"R2\",\"OWNER\":\"X\"}\n";
        let rows: Vec<RawRoleRow> = parse_rows(lines).expect("lines should parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "R2");
        assert_eq!(rows[1].owner, "X");
    }
}
