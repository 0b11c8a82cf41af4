//! Fully-qualified field paths (`address.tags[]`, `orders[].sku`).

use std::fmt;

use crate::field::{FieldDefinition, FieldShape};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field.
    Field(String),
    /// "The items of this array", rendered as `[]`.
    Items,
}

/// Chain of ancestor field names leading to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Path of a named child of this path.
    pub fn child(&self, name: &str) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Field(name.to_string()));
        path
    }

    /// Path of the items of the array at this path.
    pub fn items(&self) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Items);
        path
    }

    /// Path under which the children of `field` live: the field itself for
    /// objects, the field's items for arrays.
    pub fn children_of(&self, field: &FieldDefinition) -> Self {
        let path = self.child(&field.name);
        match field.shape {
            FieldShape::Array { .. } => path.items(),
            _ => path,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Items => f.write_str("[]")?,
            }
            first = false;
        }
        Ok(())
    }
}

/// Every field path in the tree, depth-first, parents before children.
pub fn field_paths(fields: &[FieldDefinition]) -> Vec<String> {
    let mut out = Vec::new();
    collect_paths(fields, &FieldPath::root(), &mut out);
    out
}

fn collect_paths(fields: &[FieldDefinition], parent: &FieldPath, out: &mut Vec<String>) {
    for field in fields {
        out.push(parent.child(&field.name).to_string());
        if let Some(children) = field.children() {
            collect_paths(children, &parent.children_of(field), out);
        }
    }
}
