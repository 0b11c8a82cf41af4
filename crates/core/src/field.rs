//! Recursive field-definition model used to author data template schemas.
//!
//! A [`FieldDefinition`] is one node of the authoring tree. Its [`FieldShape`]
//! is a tagged union: scalar shapes carry nothing, `object` carries its child
//! fields and `array` carries an [`ItemsDescriptor`] that may itself be an
//! object with children. Each parent owns its children outright.
//!
//! The serde representation is the flat JSON object exchanged with clients:
//!
//! ```json
//! { "name": "tags", "type": "array", "required": false,
//!   "constraints": { "maxItems": 5 }, "items": { "type": "string" } }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Field type tags
// ---------------------------------------------------------------------------

/// The type tag of a field, without any nested structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Date,
    Datetime,
}

impl FieldType {
    /// Every supported type, in the order the editor offers them.
    pub const ALL: [FieldType; 8] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Integer,
        FieldType::Boolean,
        FieldType::Array,
        FieldType::Object,
        FieldType::Date,
        FieldType::Datetime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
        }
    }

    /// `object` and `array` may hold nested field definitions.
    pub fn is_composite(self) -> bool {
        matches!(self, FieldType::Array | FieldType::Object)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// Type plus nested structure of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldShape {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Datetime,
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<Vec<FieldDefinition>>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Box<ItemsDescriptor>>,
    },
}

/// Describes the elements of an array field: `{ type, properties? }`.
pub type ItemsDescriptor = FieldShape;

impl FieldShape {
    /// Fresh shape for a type: objects start with no properties, arrays
    /// start with string items.
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => FieldShape::String,
            FieldType::Number => FieldShape::Number,
            FieldType::Integer => FieldShape::Integer,
            FieldType::Boolean => FieldShape::Boolean,
            FieldType::Date => FieldShape::Date,
            FieldType::Datetime => FieldShape::Datetime,
            FieldType::Object => FieldShape::Object {
                properties: Some(Vec::new()),
            },
            FieldType::Array => FieldShape::Array {
                items: Some(Box::new(FieldShape::String)),
            },
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldShape::String => FieldType::String,
            FieldShape::Number => FieldType::Number,
            FieldShape::Integer => FieldType::Integer,
            FieldShape::Boolean => FieldType::Boolean,
            FieldShape::Date => FieldType::Date,
            FieldShape::Datetime => FieldType::Datetime,
            FieldShape::Object { .. } => FieldType::Object,
            FieldShape::Array { .. } => FieldType::Array,
        }
    }

    /// Child fields of an object, or of an array whose items are objects.
    pub fn children(&self) -> Option<&[FieldDefinition]> {
        match self {
            FieldShape::Object { properties } => properties.as_deref(),
            FieldShape::Array { items: Some(items) } => match items.as_ref() {
                FieldShape::Object { properties } => properties.as_deref(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Mutable child list, created empty if the composite has none yet.
    ///
    /// Returns `None` for scalars and for arrays whose items are not objects.
    pub fn children_mut(&mut self) -> Option<&mut Vec<FieldDefinition>> {
        match self {
            FieldShape::Object { properties } => Some(properties.get_or_insert_with(Vec::new)),
            FieldShape::Array { items: Some(items) } => match items.as_mut() {
                FieldShape::Object { properties } => Some(properties.get_or_insert_with(Vec::new)),
                _ => None,
            },
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Field definition
// ---------------------------------------------------------------------------

/// One field of a data template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub shape: FieldShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Type-specific keys copied verbatim into the generated schema
    /// (`minLength`, `maximum`, `maxItems`, ...).
    #[serde(default)]
    pub constraints: Map<String, Value>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            shape: FieldShape::empty(field_type),
            description: None,
            required: false,
            default: None,
            constraints: Map::new(),
        }
    }

    /// The field appended by the editor's "add field" action.
    pub fn blank() -> Self {
        Self::new("", FieldType::String)
    }

    pub fn object(name: impl Into<String>, properties: Vec<FieldDefinition>) -> Self {
        Self {
            shape: FieldShape::Object {
                properties: Some(properties),
            },
            ..Self::new(name, FieldType::Object)
        }
    }

    pub fn array(name: impl Into<String>, items: ItemsDescriptor) -> Self {
        Self {
            shape: FieldShape::Array {
                items: Some(Box::new(items)),
            },
            ..Self::new(name, FieldType::Array)
        }
    }

    pub fn array_of_objects(name: impl Into<String>, properties: Vec<FieldDefinition>) -> Self {
        Self::array(
            name,
            FieldShape::Object {
                properties: Some(properties),
            },
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_constraint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.constraints.insert(key.into(), value);
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.shape.field_type()
    }

    pub fn children(&self) -> Option<&[FieldDefinition]> {
        self.shape.children()
    }
}
