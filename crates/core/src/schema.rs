//! JSON-Schema generation from field definitions.
//!
//! [`generate_schema`] folds one level of sibling fields into
//! `{ "type": "object", "properties": {...}, "required": [...] }`, recursing
//! into object properties and array items. Property order follows the input
//! order. Names are not checked here; see [`crate::template`] for that.

use serde_json::{json, Map, Value};

use crate::field::{FieldDefinition, FieldShape};

/// Generate a JSON-Schema object for a sequence of sibling fields.
///
/// The top-level `required` array is always present, even when empty.
pub fn generate_schema(fields: &[FieldDefinition]) -> Value {
    let (properties, required) = generate_level(fields);
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Build the `properties` map and `required` list for one nesting level.
fn generate_level(fields: &[FieldDefinition]) -> (Map<String, Value>, Vec<Value>) {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();

    // A repeated name takes the last definition, including its required flag.
    for field in fields {
        properties.insert(field.name.clone(), field_schema(field));
        let listed = required.iter().position(|name| *name == field.name);
        match (field.required, listed) {
            (true, None) => required.push(field.name.clone()),
            (false, Some(i)) => {
                required.remove(i);
            }
            _ => {}
        }
    }

    (properties, required.into_iter().map(Value::String).collect())
}

/// `{ type, description } ∪ constraints`, plus nested structure.
fn field_schema(field: &FieldDefinition) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), json!(field.field_type().as_str()));
    schema.insert(
        "description".into(),
        json!(field.description.as_deref().unwrap_or_default()),
    );
    for (key, value) in &field.constraints {
        schema.insert(key.clone(), value.clone());
    }

    match &field.shape {
        FieldShape::Object {
            properties: Some(children),
        } => attach_children(&mut schema, children),
        FieldShape::Array { items: Some(items) } => {
            schema.insert("items".into(), items_schema(items));
        }
        _ => {}
    }

    Value::Object(schema)
}

/// `{ type }` for array items, with nested properties for object items and
/// nested items for arrays of arrays.
fn items_schema(items: &FieldShape) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), json!(items.field_type().as_str()));

    match items {
        FieldShape::Object {
            properties: Some(children),
        } => attach_children(&mut schema, children),
        FieldShape::Array { items: Some(inner) } => {
            schema.insert("items".into(), items_schema(inner));
        }
        _ => {}
    }

    Value::Object(schema)
}

/// Nested `properties` always; nested `required` only when non-empty.
fn attach_children(schema: &mut Map<String, Value>, children: &[FieldDefinition]) {
    let (properties, required) = generate_level(children);
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
}
