//! Combining a template schema with a schema extracted from a document.
//!
//! The template has priority. A field present in both keeps the template's
//! type, pattern and description (the document fills a blank description),
//! length, value and item bounds take the stricter of the two, and nested
//! object properties are merged the same way. `required` is the union, in
//! template-first order.

use serde_json::{json, Map, Value};

/// Lower bounds keep the larger value, upper bounds the smaller.
const BOUNDS: [(&str, Stricter); 6] = [
    ("minLength", Stricter::Larger),
    ("maxLength", Stricter::Smaller),
    ("minimum", Stricter::Larger),
    ("maximum", Stricter::Smaller),
    ("minItems", Stricter::Larger),
    ("maxItems", Stricter::Smaller),
];

#[derive(Debug, Clone, Copy)]
enum Stricter {
    Larger,
    Smaller,
}

/// The schema used when neither side supplies one.
pub fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}

/// Merge a template schema with a document schema.
///
/// A missing, `null` or empty-object side is ignored; when only one side is
/// present it is returned as is.
pub fn merge_schemas(template: Option<&Value>, document: Option<&Value>) -> Value {
    match (non_empty(template), non_empty(document)) {
        (Some(template), Some(document)) => Value::Object(merge_level(template, document)),
        (Some(only), None) | (None, Some(only)) => Value::Object(only.clone()),
        (None, None) => empty_schema(),
    }
}

fn non_empty(schema: Option<&Value>) -> Option<&Map<String, Value>> {
    schema.and_then(Value::as_object).filter(|m| !m.is_empty())
}

/// `{ type: object, properties, required }` from two object levels.
fn merge_level(template: &Map<String, Value>, document: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = Map::new();
    merged.insert("type".into(), json!("object"));
    merged.insert("properties".into(), Value::Object(merge_properties(template, document)));
    merged.insert("required".into(), Value::Array(union_required(template, document)));
    merged
}

fn merge_properties(
    template: &Map<String, Value>,
    document: &Map<String, Value>,
) -> Map<String, Value> {
    let empty = Map::new();
    let t_props = properties(template).unwrap_or(&empty);
    let d_props = properties(document).unwrap_or(&empty);

    let mut merged = Map::new();
    for (name, t_field) in t_props {
        let field = match (t_field.as_object(), d_props.get(name).and_then(Value::as_object)) {
            (Some(t), Some(d)) => Value::Object(merge_field(t, d)),
            _ => t_field.clone(),
        };
        merged.insert(name.clone(), field);
    }
    for (name, d_field) in d_props {
        if !merged.contains_key(name) {
            merged.insert(name.clone(), d_field.clone());
        }
    }
    merged
}

fn merge_field(template: &Map<String, Value>, document: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = template.clone();

    for (key, rule) in BOUNDS {
        match (template.get(key), document.get(key)) {
            (Some(t), Some(d)) => {
                merged.insert(key.into(), stricter(t, d, rule));
            }
            (None, Some(d)) => {
                merged.insert(key.into(), d.clone());
            }
            _ => {}
        }
    }

    if !template.contains_key("pattern") {
        if let Some(pattern) = document.get("pattern") {
            merged.insert("pattern".into(), pattern.clone());
        }
    }

    if is_blank_str(template.get("description")) && !is_blank_str(document.get("description")) {
        if let Some(description) = document.get("description") {
            merged.insert("description".into(), description.clone());
        }
    }

    match template.get("type").and_then(Value::as_str) {
        Some("object") if properties(template).is_some() || properties(document).is_some() => {
            merge_nested(&mut merged, template, document);
        }
        Some("array") => {
            let t_items = template.get("items").and_then(Value::as_object);
            let d_items = document.get("items").and_then(Value::as_object);
            match (t_items, d_items) {
                (Some(t), Some(d)) if is_object_type(t) && is_object_type(d) => {
                    merged.insert("items".into(), Value::Object(merge_level(t, d)));
                }
                (None, Some(d)) => {
                    merged.insert("items".into(), Value::Object(d.clone()));
                }
                _ => {}
            }
        }
        _ => {}
    }

    merged
}

/// Merged `properties` always; merged `required` only when non-empty.
fn merge_nested(
    merged: &mut Map<String, Value>,
    template: &Map<String, Value>,
    document: &Map<String, Value>,
) {
    merged.insert("properties".into(), Value::Object(merge_properties(template, document)));
    let required = union_required(template, document);
    if !required.is_empty() {
        merged.insert("required".into(), Value::Array(required));
    }
}

fn properties(schema: &Map<String, Value>) -> Option<&Map<String, Value>> {
    schema.get("properties").and_then(Value::as_object)
}

fn union_required(template: &Map<String, Value>, document: &Map<String, Value>) -> Vec<Value> {
    let mut names: Vec<Value> = Vec::new();
    for schema in [template, document] {
        let listed = schema.get("required").and_then(Value::as_array);
        for name in listed.into_iter().flatten().filter(|v| v.is_string()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}

/// Non-numeric bounds leave the template's value in place.
fn stricter(template: &Value, document: &Value, rule: Stricter) -> Value {
    match (template.as_f64(), document.as_f64()) {
        (Some(t), Some(d)) => {
            let take_document = match rule {
                Stricter::Larger => d > t,
                Stricter::Smaller => d < t,
            };
            if take_document {
                document.clone()
            } else {
                template.clone()
            }
        }
        _ => template.clone(),
    }
}

fn is_object_type(schema: &Map<String, Value>) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("object")
}

fn is_blank_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .map_or(true, |s| s.trim().is_empty())
}
