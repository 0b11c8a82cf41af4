//! Initial field definitions inferred from a pasted JSON sample.
//!
//! The result is a starting point for the editor, not a contract: types are
//! guessed from sample values and constraints are loose hints around them.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::CoreError;
use crate::field::{FieldDefinition, FieldShape, FieldType};
use crate::schema::generate_schema;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted sample size in bytes (1 MiB).
pub const MAX_SAMPLE_BYTES: usize = 1024 * 1024;

/// Objects nested deeper than this are imported without children.
pub const MAX_IMPORT_DEPTH: usize = 10;

/// Pattern attached to string fields whose sample looks like an e-mail.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

static DATETIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("JSON sample too large: {len} bytes (max {max})", max = MAX_SAMPLE_BYTES)]
    TooLarge { len: usize },

    #[error("Invalid JSON format: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<ImportError> for CoreError {
    fn from(err: ImportError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/// Field definitions guessed from a sample, with the schema they generate.
#[derive(Debug, Clone, Serialize)]
pub struct ImportedTemplate {
    pub schema: Value,
    pub field_definitions: Vec<FieldDefinition>,
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Parse a JSON sample and infer field definitions from it.
///
/// A root object yields one field per key. A root array is read through its
/// first element when that element is an object. Any other root yields no
/// fields.
pub fn import_sample(raw: &str) -> Result<ImportedTemplate, ImportError> {
    if raw.len() > MAX_SAMPLE_BYTES {
        return Err(ImportError::TooLarge { len: raw.len() });
    }
    let value: Value = serde_json::from_str(raw)?;
    let field_definitions = infer_fields(&value);
    let schema = generate_schema(&field_definitions);
    Ok(ImportedTemplate {
        schema,
        field_definitions,
    })
}

/// Infer field definitions from an already-parsed sample value.
pub fn infer_fields(sample: &Value) -> Vec<FieldDefinition> {
    match sample {
        Value::Object(obj) => fields_from_object(obj, 0),
        Value::Array(arr) => match arr.first() {
            Some(Value::Object(obj)) => fields_from_object(obj, 1),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn fields_from_object(obj: &Map<String, Value>, depth: usize) -> Vec<FieldDefinition> {
    if depth > MAX_IMPORT_DEPTH {
        return Vec::new();
    }
    obj.iter()
        .map(|(key, value)| infer_field(key, value, depth))
        .collect()
}

fn infer_field(name: &str, value: &Value, depth: usize) -> FieldDefinition {
    let field_type = infer_type(value);
    let shape = match value {
        Value::Object(obj) => {
            let children = fields_from_object(obj, depth + 1);
            FieldShape::Object {
                properties: (!children.is_empty()).then_some(children),
            }
        }
        Value::Array(arr) => FieldShape::Array {
            items: arr.first().map(|first| Box::new(infer_items(first, depth))),
        },
        _ => FieldShape::empty(field_type),
    };

    FieldDefinition {
        name: name.to_string(),
        shape,
        description: Some(humanize(name)),
        required: false,
        default: None,
        constraints: infer_constraints(value, field_type),
    }
}

fn infer_items(first: &Value, depth: usize) -> FieldShape {
    match first {
        Value::Object(obj) => {
            let children = fields_from_object(obj, depth + 1);
            FieldShape::Object {
                properties: (!children.is_empty()).then_some(children),
            }
        }
        // Nested arrays keep only their own element type.
        Value::Array(_) => FieldShape::Array { items: None },
        other => FieldShape::empty(infer_type(other)),
    }
}

/// Guess the field type of a sample value. `null` is treated as a string.
pub fn infer_type(value: &Value) -> FieldType {
    match value {
        Value::Null => FieldType::String,
        Value::Bool(_) => FieldType::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => FieldType::Integer,
        Value::Number(_) => FieldType::Number,
        Value::String(s) if DATE_RE.is_match(s) => FieldType::Date,
        Value::String(s) if DATETIME_RE.is_match(s) => FieldType::Datetime,
        Value::String(_) => FieldType::String,
        Value::Array(_) => FieldType::Array,
        Value::Object(_) => FieldType::Object,
    }
}

fn infer_constraints(value: &Value, field_type: FieldType) -> Map<String, Value> {
    let mut constraints = Map::new();

    match (field_type, value) {
        (FieldType::String, Value::String(s)) => {
            let len = s.chars().count();
            if len > 0 {
                constraints.insert("minLength".into(), json!(1));
                constraints.insert("maxLength".into(), json!(len * 2));
            }
            if s.contains('@') && s.contains('.') {
                constraints.insert("pattern".into(), json!(EMAIL_PATTERN));
            }
        }
        (FieldType::Integer, Value::Number(n)) => {
            let (min, max) = match (n.as_i64(), n.as_u64()) {
                (Some(v), _) if v > 0 => {
                    (Some(json!(v / 2)), Some(json!(v.saturating_mul(2))))
                }
                (Some(v), _) => (v.checked_sub(10).map(|m| json!(m)), Some(json!(v + 10))),
                (None, Some(v)) => (Some(json!(v / 2)), v.checked_mul(2).map(|m| json!(m))),
                (None, None) => (None, None),
            };
            if let Some(min) = min {
                constraints.insert("minimum".into(), min);
            }
            if let Some(max) = max {
                constraints.insert("maximum".into(), max);
            }
        }
        (FieldType::Number, Value::Number(n)) => {
            if let Some(v) = n.as_f64() {
                let (min, max) = if v > 0.0 { (v * 0.5, v * 2.0) } else { (v - 10.0, v + 10.0) };
                // Bounds that overflow to infinity would serialize as null.
                for (key, bound) in [("minimum", min), ("maximum", max)] {
                    if bound.is_finite() {
                        constraints.insert(key.into(), json!(bound));
                    }
                }
            }
        }
        (FieldType::Array, Value::Array(arr)) => {
            let max_items = if arr.is_empty() { 10 } else { arr.len() * 2 };
            constraints.insert("minItems".into(), json!(0));
            constraints.insert("maxItems".into(), json!(max_items));
        }
        _ => {}
    }

    constraints
}

/// `user_name` / `user-name` → `user name`.
fn humanize(name: &str) -> String {
    name.replace(['_', '-'], " ")
}
