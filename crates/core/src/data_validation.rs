//! Checking data records against a template schema.
//!
//! Template schemas name two types that JSON Schema does not know, `date`
//! and `datetime`. [`normalize_schema`] rewrites them to `string` with the
//! matching `format`, folds boolean `required` flags found on properties into
//! the parent's `required` list and drops repeated `required` entries. The
//! normalized schema is compiled as Draft 7 with format checks enabled.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Outcome of checking a payload against a schema.
///
/// `warnings` never affect `valid`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl DataValidationReport {
    fn failed(message: String) -> Self {
        Self {
            valid: false,
            errors: vec![message],
            warnings: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate `data` against a template schema.
///
/// A JSON string payload is parsed first. A list is checked record by record
/// (`item[0]`, `item[1]`, ...) unless the schema itself describes an array;
/// anything else is checked as a single `root` record. Keys a record carries
/// that the schema does not declare are reported as warnings.
pub fn validate_data(schema: &Value, data: &Value) -> DataValidationReport {
    if let Value::String(raw) = data {
        return match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => validate_data(schema, &parsed),
            Err(e) => DataValidationReport::failed(format!("Invalid JSON format: {e}")),
        };
    }

    let normalized = normalize_schema(schema);
    let validator = match jsonschema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .should_validate_formats(true)
        .build(&normalized)
    {
        Ok(validator) => validator,
        Err(e) => return DataValidationReport::failed(format!("Invalid schema: {e}")),
    };

    let mut report = DataValidationReport::default();
    let schema_is_array = normalized.get("type").and_then(Value::as_str) == Some("array");
    match data {
        Value::Array(records) if !schema_is_array => {
            if records.is_empty() {
                report.warnings.push("No records to validate".to_string());
            }
            for (idx, record) in records.iter().enumerate() {
                let prefix = format!("item[{idx}]");
                check_record(&validator, &normalized, record, &prefix, &mut report);
            }
        }
        record => check_record(&validator, &normalized, record, "root", &mut report),
    }
    report.valid = report.errors.is_empty();
    report
}

fn check_record(
    validator: &jsonschema::Validator,
    schema: &Value,
    record: &Value,
    prefix: &str,
    report: &mut DataValidationReport,
) {
    for error in validator.iter_errors(record) {
        let location = location(prefix, &error.instance_path.to_string());
        report.errors.push(format!("{location}: {error}"));
    }

    let declared = schema.get("properties").and_then(Value::as_object);
    if let (Some(declared), Value::Object(fields)) = (declared, record) {
        for key in fields.keys().filter(|k| !declared.contains_key(*k)) {
            report
                .warnings
                .push(format!("{prefix}.{key}: field is not defined in the schema"));
        }
    }
}

/// `item[2]` + `/orders/0/sku` → `item[2].orders[0].sku`.
fn location(prefix: &str, pointer: &str) -> String {
    let mut out = prefix.to_string();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if segment.parse::<usize>().is_ok() {
            out.push('[');
            out.push_str(&segment);
            out.push(']');
        } else {
            out.push('.');
            out.push_str(&segment);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Rewrite a template schema into standard JSON Schema.
///
/// Non-object values are returned unchanged.
pub fn normalize_schema(schema: &Value) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };
    let mut out = map.clone();

    match out.get("type").and_then(Value::as_str) {
        Some("date") => set_string_format(&mut out, "date"),
        Some("datetime") => set_string_format(&mut out, "date-time"),
        _ => {}
    }

    let mut lifted = Vec::new();
    if let Some(Value::Object(properties)) = out.get_mut("properties") {
        for (name, property) in properties.iter_mut() {
            let mut normalized = normalize_schema(property);
            if let Value::Object(inner) = &mut normalized {
                if let Some(flag) = inner.get("required").and_then(Value::as_bool) {
                    if flag {
                        lifted.push(name.clone());
                    }
                    inner.remove("required");
                }
            }
            *property = normalized;
        }
    }

    let mut required: Vec<String> = match out.get("required") {
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::Bool(true)) => out
            .get("properties")
            .and_then(Value::as_object)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    required.extend(lifted);
    let mut seen = HashSet::new();
    required.retain(|name| seen.insert(name.clone()));
    if required.is_empty() {
        out.remove("required");
    } else {
        out.insert("required".into(), json!(required));
    }

    if let Some(items) = out.get_mut("items") {
        *items = normalize_schema(items);
    }
    for keyword in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(branches)) = out.get_mut(keyword) {
            for branch in branches.iter_mut() {
                *branch = normalize_schema(branch);
            }
        }
    }

    Value::Object(out)
}

fn set_string_format(schema: &mut Map<String, Value>, format: &str) {
    schema.insert("type".into(), json!("string"));
    schema
        .entry("format")
        .or_insert_with(|| Value::String(format.to_string()));
}
