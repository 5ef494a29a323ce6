//! Object-name handling.
//!
//! An object name is logically a dot-separated sequence of 1–3 identifier
//! segments, but any segment may itself be a double-quoted identifier
//! containing literal dots (`"A.B".C` is the two segments `A.B` and `C`).
//! Parsing strips the quotes; serialization restores them for any part that
//! embeds a dot, so `split_object_name(join_object_name(parts)) == parts`.

/// Derived name parts of a canonical grant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    /// Database segment, empty for account-scoped objects.
    pub db_name: String,
    /// Schema segment, empty for database- and account-scoped objects.
    pub schema_name: String,
    /// Terminal entity segment.
    pub entity_name: String,
}

/// Object types whose names are a single account-level identifier.
const ACCOUNT_SCOPED_TYPES: &[&str] = &[
    "ACCOUNT",
    "ROLE",
    "USER",
    "WAREHOUSE",
    "INTEGRATION",
    "RESOURCE_MONITOR",
    "SHARE",
];

/// Split an object name into identifier segments, honoring quotes.
///
/// A dot is a separator only when not inside an unterminated double-quoted
/// token; quoting characters are stripped from the returned parts.
pub fn split_object_name(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in name.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

/// Join identifier segments back into an object name, quoting any segment
/// that embeds a dot.
pub fn join_object_name<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|part| quote_if_needed(part.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}

fn quote_if_needed(part: &str) -> String {
    if part.contains('.') {
        format!("\"{part}\"")
    } else {
        part.to_string()
    }
}

/// True when `object_type` names an account-scoped object (single-segment
/// name, no database/schema qualification).
pub fn is_account_scoped(object_type: &str) -> bool {
    ACCOUNT_SCOPED_TYPES.contains(&object_type)
}

/// Derive `(db, schema, entity)` from name segments, driven by object type.
///
/// - `DATABASE`: the single segment is both database and entity.
/// - `SCHEMA`: `db.schema`, with the schema segment doubling as entity.
/// - Account-scoped types: the last segment is the entity.
/// - Everything else is schema-scoped: `db.schema.entity`, tolerating
///   partially qualified names by filling from the right.
pub fn derive_name_parts(object_type: &str, segments: &[String]) -> NameParts {
    let mut parts = NameParts::default();
    let Some(last) = segments.last() else {
        return parts;
    };

    match object_type {
        "DATABASE" => {
            parts.db_name = segments[0].clone();
            parts.entity_name = segments[0].clone();
        }
        "SCHEMA" => {
            if segments.len() >= 2 {
                parts.db_name = segments[segments.len() - 2].clone();
            }
            parts.schema_name = last.clone();
            parts.entity_name = last.clone();
        }
        t if is_account_scoped(t) => {
            parts.entity_name = last.clone();
        }
        _ => match segments.len() {
            1 => parts.entity_name = last.clone(),
            2 => {
                parts.schema_name = segments[0].clone();
                parts.entity_name = segments[1].clone();
            }
            _ => {
                parts.db_name = segments[segments.len() - 3].clone();
                parts.schema_name = segments[segments.len() - 2].clone();
                parts.entity_name = last.clone();
            }
        },
    }
    parts
}

/// Serialize derived name parts back into a canonical object name.
///
/// Inverse of [`derive_name_parts`]: re-parsing the result and re-deriving
/// reproduces the same three parts.
pub fn serialize_name_parts(object_type: &str, parts: &NameParts) -> String {
    let segments: Vec<&str> = match object_type {
        "DATABASE" => vec![parts.db_name.as_str()],
        "SCHEMA" => [parts.db_name.as_str(), parts.schema_name.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect(),
        t if is_account_scoped(t) => vec![parts.entity_name.as_str()],
        _ => [
            parts.db_name.as_str(),
            parts.schema_name.as_str(),
            parts.entity_name.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect(),
    };
    join_object_name(&segments)
}

/// True when a role or object identifier contains characters that force
/// quoting (anything outside `[A-Za-z0-9_$]`).
pub fn has_special_identifier_characters(name: &str) -> bool {
    name.chars()
        .any(|ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_treats_quoted_dots_as_literal() {
        assert_eq!(
            split_object_name(r#""A.B".C"#),
            vec!["A.B".to_string(), "C".to_string()]
        );
        assert_eq!(
            split_object_name("DB.SCHEMA.TABLE"),
            vec!["DB".to_string(), "SCHEMA".to_string(), "TABLE".to_string()]
        );
        assert_eq!(split_object_name("MY_ROLE"), vec!["MY_ROLE".to_string()]);
    }

    #[test]
    fn join_requotes_embedded_dots() {
        let parts = vec!["A.B".to_string(), "C".to_string()];
        let joined = join_object_name(&parts);
        assert_eq!(joined, r#""A.B".C"#);
        assert_eq!(split_object_name(&joined), parts);
    }

    #[test]
    fn derive_is_idempotent_through_serialization() {
        let cases = [
            ("TABLE", "DB.S.T"),
            ("TABLE", "S.T"),
            ("TABLE", r#"DB."ODD.SCHEMA".T"#),
            ("SCHEMA", "DB.S"),
            ("DATABASE", "DB"),
            ("ROLE", "ANALYST"),
            ("ROLE", r#""A.ROLE""#),
            ("WAREHOUSE", "COMPUTE_WH"),
        ];
        for (object_type, raw) in cases {
            let parts = derive_name_parts(object_type, &split_object_name(raw));
            let serialized = serialize_name_parts(object_type, &parts);
            let reparsed = derive_name_parts(object_type, &split_object_name(&serialized));
            assert_eq!(parts, reparsed, "round trip for {object_type} {raw}");
        }
    }

    #[test]
    fn database_segment_doubles_as_entity() {
        let parts = derive_name_parts("DATABASE", &split_object_name("ANALYTICS"));
        assert_eq!(parts.db_name, "ANALYTICS");
        assert_eq!(parts.entity_name, "ANALYTICS");
        assert!(parts.schema_name.is_empty());
    }

    #[test]
    fn partially_qualified_leaf_fills_from_the_right() {
        let parts = derive_name_parts("TABLE", &split_object_name("S.T"));
        assert_eq!(parts.db_name, "");
        assert_eq!(parts.schema_name, "S");
        assert_eq!(parts.entity_name, "T");
    }

    #[test]
    fn special_identifier_detection() {
        assert!(!has_special_identifier_characters("PLAIN_ROLE$1"));
        assert!(has_special_identifier_characters("my role"));
        assert!(has_special_identifier_characters("A.B"));
    }
}
