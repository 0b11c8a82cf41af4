//! Data template validation and naming rules.
//!
//! [`validate_template`] gates a candidate template before it is created or
//! updated. It collects every violation instead of stopping at the first one
//! and never fails on malformed input: a `field_definitions` value that is
//! not an array only skips the per-field checks.

use std::collections::HashSet;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/* --------------------------------------------------------------------------
   Validation limits
   -------------------------------------------------------------------------- */

/// Maximum length for a template name, in characters.
pub const MAX_TEMPLATE_NAME_LEN: usize = 50;

/// Maximum length for a template description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Prefix used when copying a template without an explicit new name.
pub const COPY_NAME_PREFIX: &str = "Copy of ";

/* --------------------------------------------------------------------------
   Candidate and violations
   -------------------------------------------------------------------------- */

/// A template as submitted, before any of its parts are trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateCandidate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Value,
    #[serde(default)]
    pub field_definitions: Value,
}

/// One reason a candidate template is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateViolation {
    #[error("Template name is empty")]
    EmptyName,

    #[error("Template name is too long: {len} chars (max {max})", max = MAX_TEMPLATE_NAME_LEN)]
    NameTooLong { len: usize },

    #[error("Template description is too long: {len} chars (max {max})", max = MAX_DESCRIPTION_LEN)]
    DescriptionTooLong { len: usize },

    #[error("Schema must be a JSON object")]
    SchemaNotObject,

    #[error("Field definitions must be a JSON array")]
    FieldDefinitionsNotArray,

    #[error("Template needs at least one field")]
    NoFields,

    #[error("Field definition at index {index} must be an object")]
    FieldNotObject { index: usize },

    #[error("Field definition at index {index} has an empty name")]
    BlankFieldName { index: usize },

    #[error("Field definition at index {index} duplicates the name '{name}'")]
    DuplicateFieldName { index: usize, name: String },

    #[error("Field definition at index {index} is missing a type")]
    MissingFieldType { index: usize },

    #[error("Template needs at least one valid field")]
    NoValidFields,
}

/// Outcome of [`validate_template`].
///
/// Serializes as `{ "valid": bool, "errors": [string] }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<TemplateViolation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable messages, one per violation.
    pub fn errors(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 2)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors())?;
        state.end()
    }
}

/* --------------------------------------------------------------------------
   Validation
   -------------------------------------------------------------------------- */

/// Check a candidate template against all structural rules.
///
/// Only the top-level field list is inspected; nested `properties` and
/// `items.properties` are not re-validated here.
pub fn validate_template(candidate: &TemplateCandidate) -> ValidationReport {
    let mut violations = Vec::new();

    if candidate.name.trim().is_empty() {
        violations.push(TemplateViolation::EmptyName);
    }
    let name_len = candidate.name.chars().count();
    if name_len > MAX_TEMPLATE_NAME_LEN {
        violations.push(TemplateViolation::NameTooLong { len: name_len });
    }

    if let Some(description) = &candidate.description {
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            violations.push(TemplateViolation::DescriptionTooLong { len });
        }
    }

    if !candidate.schema.is_object() {
        violations.push(TemplateViolation::SchemaNotObject);
    }

    match candidate.field_definitions.as_array() {
        None => violations.push(TemplateViolation::FieldDefinitionsNotArray),
        Some(fields) if fields.is_empty() => violations.push(TemplateViolation::NoFields),
        Some(fields) => validate_fields(fields, &mut violations),
    }

    ValidationReport { violations }
}

fn validate_fields(fields: &[Value], violations: &mut Vec<TemplateViolation>) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut valid_count = 0usize;

    for (index, field) in fields.iter().enumerate() {
        let Some(obj) = field.as_object() else {
            violations.push(TemplateViolation::FieldNotObject { index });
            continue;
        };

        let mut ok = true;
        let name = obj.get("name").and_then(Value::as_str).map(str::trim);

        match name {
            None | Some("") => {
                violations.push(TemplateViolation::BlankFieldName { index });
                ok = false;
            }
            Some(name) => {
                if !seen.insert(name) {
                    violations.push(TemplateViolation::DuplicateFieldName {
                        index,
                        name: name.to_string(),
                    });
                    ok = false;
                }
            }
        }

        if obj.get("type").map_or(true, Value::is_null) {
            violations.push(TemplateViolation::MissingFieldType { index });
            ok = false;
        }

        if ok {
            valid_count += 1;
        }
    }

    if valid_count == 0 {
        violations.push(TemplateViolation::NoValidFields);
    }
}

/* --------------------------------------------------------------------------
   Helpers
   -------------------------------------------------------------------------- */

/// Number of top-level field definitions; 0 when the value is not an array.
pub fn field_count(field_definitions: &Value) -> usize {
    field_definitions.as_array().map_or(0, Vec::len)
}

/// Candidate names for a copied template, in the order they should be tried.
///
/// The base is `requested` (trimmed, if non-blank) or `"Copy of {source}"`.
/// The sequence is the base itself followed by `"{base} (1)"`,
/// `"{base} (2)"`, ... Every candidate fits [`MAX_TEMPLATE_NAME_LEN`]; the base
/// is shortened to make room for the counter suffix.
pub fn copy_name_candidates(
    source_name: &str,
    requested: Option<&str>,
) -> impl Iterator<Item = String> {
    let base = match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{COPY_NAME_PREFIX}{source_name}"),
    };

    (0u32..).map(move |counter| {
        if counter == 0 {
            clip(&base, MAX_TEMPLATE_NAME_LEN)
        } else {
            let suffix = format!(" ({counter})");
            let room = MAX_TEMPLATE_NAME_LEN.saturating_sub(suffix.chars().count());
            format!("{}{suffix}", clip(&base, room))
        }
    })
}

fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn candidate(name: &str, field_definitions: Value) -> TemplateCandidate {
        TemplateCandidate {
            name: name.to_string(),
            description: None,
            schema: json!({ "type": "object" }),
            field_definitions,
        }
    }

    #[test]
    fn valid_template_passes() {
        let report = validate_template(&candidate(
            "Users",
            json!([{ "name": "id", "type": "integer" }]),
        ));
        assert!(report.is_valid());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn empty_name_and_empty_fields_are_both_reported() {
        let report = validate_template(&candidate("", json!([])));
        assert!(!report.is_valid());
        assert!(report.violations.contains(&TemplateViolation::EmptyName));
        assert!(report.violations.contains(&TemplateViolation::NoFields));
    }

    #[test]
    fn whitespace_name_counts_as_empty() {
        let fields = json!([{ "name": "a", "type": "string" }]);
        let report = validate_template(&candidate("   ", fields));
        assert_eq!(report.violations, vec![TemplateViolation::EmptyName]);
    }

    #[test]
    fn name_over_limit_is_too_long() {
        let name = "n".repeat(MAX_TEMPLATE_NAME_LEN + 1);
        let fields = json!([{ "name": "a", "type": "string" }]);
        let report = validate_template(&candidate(&name, fields));
        assert_matches!(
            report.violations.as_slice(),
            [TemplateViolation::NameTooLong { len: 51 }]
        );
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        let name = "模".repeat(MAX_TEMPLATE_NAME_LEN);
        let fields = json!([{ "name": "a", "type": "string" }]);
        let report = validate_template(&candidate(&name, fields));
        assert!(report.is_valid());
    }

    #[test]
    fn long_description_is_rejected() {
        let mut c = candidate("Orders", json!([{ "name": "a", "type": "string" }]));
        c.description = Some("d".repeat(MAX_DESCRIPTION_LEN + 1));
        let report = validate_template(&c);
        assert_matches!(
            report.violations.as_slice(),
            [TemplateViolation::DescriptionTooLong { .. }]
        );
    }

    #[test]
    fn non_object_schema_is_rejected() {
        let mut c = candidate("Orders", json!([{ "name": "a", "type": "string" }]));
        c.schema = json!("not a schema");
        let report = validate_template(&c);
        assert_eq!(report.violations, vec![TemplateViolation::SchemaNotObject]);
    }

    #[test]
    fn non_array_fields_do_not_stop_other_checks() {
        let mut c = candidate("", json!({ "name": "a" }));
        c.schema = Value::Null;
        let report = validate_template(&c);
        assert_eq!(
            report.violations,
            vec![
                TemplateViolation::EmptyName,
                TemplateViolation::SchemaNotObject,
                TemplateViolation::FieldDefinitionsNotArray,
            ]
        );
    }

    #[test]
    fn duplicate_sibling_names_leave_one_valid_field() {
        let report = validate_template(&candidate(
            "ok",
            json!([
                { "name": "a", "type": "string" },
                { "name": "a", "type": "number" }
            ]),
        ));
        assert_eq!(
            report.violations,
            vec![TemplateViolation::DuplicateFieldName {
                index: 1,
                name: "a".to_string()
            }]
        );
    }

    #[test]
    fn all_invalid_fields_add_no_valid_fields_error() {
        let report = validate_template(&candidate(
            "ok",
            json!([
                { "name": "", "type": "string" },
                { "name": "b" },
                42
            ]),
        ));
        assert_eq!(
            report.violations,
            vec![
                TemplateViolation::BlankFieldName { index: 0 },
                TemplateViolation::MissingFieldType { index: 1 },
                TemplateViolation::FieldNotObject { index: 2 },
                TemplateViolation::NoValidFields,
            ]
        );
    }

    #[test]
    fn nested_duplicates_are_not_checked() {
        let report = validate_template(&candidate(
            "ok",
            json!([{
                "name": "addr",
                "type": "object",
                "properties": [
                    { "name": "x", "type": "string" },
                    { "name": "x", "type": "string" }
                ]
            }]),
        ));
        assert!(report.is_valid());
    }

    #[test]
    fn report_serializes_valid_and_error_strings() {
        let report = validate_template(&candidate("", json!([])));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(
            value["errors"],
            json!(["Template name is empty", "Template needs at least one field"])
        );
    }

    #[test]
    fn field_count_handles_non_arrays() {
        assert_eq!(field_count(&json!([{}, {}])), 2);
        assert_eq!(field_count(&json!({})), 0);
    }

    #[test]
    fn copy_names_default_to_copy_of_source() {
        let names: Vec<String> = copy_name_candidates("Users", None).take(3).collect();
        assert_eq!(names, ["Copy of Users", "Copy of Users (1)", "Copy of Users (2)"]);
    }

    #[test]
    fn copy_names_prefer_requested_name() {
        let first = copy_name_candidates("Users", Some("  Customers ")).next().unwrap();
        assert_eq!(first, "Customers");
        let blank = copy_name_candidates("Users", Some(" ")).next().unwrap();
        assert_eq!(blank, "Copy of Users");
    }

    #[test]
    fn copy_names_stay_within_limit() {
        let source = "s".repeat(MAX_TEMPLATE_NAME_LEN);
        for name in copy_name_candidates(&source, None).take(12) {
            assert!(name.chars().count() <= MAX_TEMPLATE_NAME_LEN, "{name}");
        }
        let tenth = copy_name_candidates(&source, None).nth(10).unwrap();
        assert!(tenth.ends_with(" (10)"));
    }
}
