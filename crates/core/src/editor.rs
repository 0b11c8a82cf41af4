//! Nested field editor.
//!
//! A [`FieldEditor`] edits one level of sibling fields in place. Editing a
//! nested level (object properties or array-of-object item properties) is
//! done by asking for a [`FieldEditor::nested`] editor scoped to that child
//! list, one level deeper. Depth is unbounded; [`EditorConfig`] only decides
//! which levels start collapsed.
//!
//! Duplicate names are allowed to exist transiently (duplicating a field
//! produces `name_copy` without further checks); they are caught when the
//! template is validated. Renaming onto a sibling's name is refused.

use serde_json::Value;

use crate::field::{FieldDefinition, FieldShape, FieldType};
use crate::field_path::FieldPath;

/// Suffix appended to the name of a duplicated field.
pub const COPY_SUFFIX: &str = "_copy";

/// Default level beyond which nested editors start collapsed.
pub const DEFAULT_COLLAPSE_AFTER_LEVEL: usize = 3;

/// Display settings shared by an editor and all of its nested editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Levels strictly greater than this start collapsed.
    pub collapse_after_level: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            collapse_after_level: DEFAULT_COLLAPSE_AFTER_LEVEL,
        }
    }
}

/// A refused edit. The field list is left untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorWarning {
    #[error("No field at index {index} (level has {len} fields)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("A sibling field is already named '{name}'")]
    DuplicateName { name: String },

    #[error("Field '{name}' has no nested fields to edit")]
    NotComposite { name: String },
}

/// Editor over one level of a field-definition tree.
#[derive(Debug)]
pub struct FieldEditor<'a> {
    fields: &'a mut Vec<FieldDefinition>,
    level: usize,
    path: FieldPath,
    config: EditorConfig,
}

impl<'a> FieldEditor<'a> {
    /// Top-level editor (level 0).
    pub fn new(fields: &'a mut Vec<FieldDefinition>, config: EditorConfig) -> Self {
        Self {
            fields,
            level: 0,
            path: FieldPath::root(),
            config,
        }
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        self.fields.as_slice()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Path of the parent whose children this editor manages.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Whether this level should be shown collapsed until the user expands it.
    pub fn is_collapsed_by_default(&self) -> bool {
        self.level > self.config.collapse_after_level
    }

    /// Fully-qualified path of the field at `index`.
    pub fn field_path(&self, index: usize) -> Result<FieldPath, EditorWarning> {
        let field = self.get(index)?;
        Ok(self.path.child(&field.name))
    }

    // -----------------------------------------------------------------------
    // List operations
    // -----------------------------------------------------------------------

    /// Append a blank `string` field and return its index.
    pub fn add_field(&mut self) -> usize {
        self.fields.push(FieldDefinition::blank());
        self.fields.len() - 1
    }

    pub fn remove_field(&mut self, index: usize) -> Result<FieldDefinition, EditorWarning> {
        self.get(index)?;
        Ok(self.fields.remove(index))
    }

    /// Insert a copy of the field right after it, named `{name}_copy`.
    pub fn duplicate_field(&mut self, index: usize) -> Result<usize, EditorWarning> {
        let mut copy = self.get(index)?.clone();
        copy.name.push_str(COPY_SUFFIX);
        self.fields.insert(index + 1, copy);
        Ok(index + 1)
    }

    /// Rename a field, refusing names already used by a sibling.
    pub fn rename_field(&mut self, index: usize, name: &str) -> Result<(), EditorWarning> {
        self.get(index)?;
        let taken = self
            .fields
            .iter()
            .enumerate()
            .any(|(i, f)| i != index && f.name == name);
        if taken {
            return Err(EditorWarning::DuplicateName {
                name: name.to_string(),
            });
        }
        self.fields[index].name = name.to_string();
        Ok(())
    }

    /// Change a field's type.
    ///
    /// Setting the current type is a no-op. Any real change resets nested
    /// structure (`object` → empty properties, `array` → string items, scalar
    /// → none) and clears constraints and the default value, which are
    /// type-specific.
    pub fn set_field_type(
        &mut self,
        index: usize,
        field_type: FieldType,
    ) -> Result<(), EditorWarning> {
        let field = self.get_mut(index)?;
        if field.field_type() == field_type {
            return Ok(());
        }
        field.shape = FieldShape::empty(field_type);
        field.constraints.clear();
        field.default = None;
        Ok(())
    }

    /// Change the element type of an array field.
    pub fn set_items_type(
        &mut self,
        index: usize,
        items_type: FieldType,
    ) -> Result<(), EditorWarning> {
        let field = self.get_mut(index)?;
        match &mut field.shape {
            FieldShape::Array { items } => {
                if items.as_deref().map(FieldShape::field_type) != Some(items_type) {
                    *items = Some(Box::new(FieldShape::empty(items_type)));
                }
                Ok(())
            }
            _ => Err(EditorWarning::NotComposite {
                name: field.name.clone(),
            }),
        }
    }

    pub fn set_required(&mut self, index: usize, required: bool) -> Result<(), EditorWarning> {
        self.get_mut(index)?.required = required;
        Ok(())
    }

    pub fn set_description(
        &mut self,
        index: usize,
        description: Option<String>,
    ) -> Result<(), EditorWarning> {
        self.get_mut(index)?.description = description.filter(|d| !d.is_empty());
        Ok(())
    }

    pub fn set_default(
        &mut self,
        index: usize,
        default: Option<Value>,
    ) -> Result<(), EditorWarning> {
        self.get_mut(index)?.default = default;
        Ok(())
    }

    pub fn set_constraint(
        &mut self,
        index: usize,
        key: &str,
        value: Value,
    ) -> Result<(), EditorWarning> {
        self.get_mut(index)?.constraints.insert(key.to_string(), value);
        Ok(())
    }

    pub fn remove_constraint(
        &mut self,
        index: usize,
        key: &str,
    ) -> Result<Option<Value>, EditorWarning> {
        Ok(self.get_mut(index)?.constraints.shift_remove(key))
    }

    // -----------------------------------------------------------------------
    // Nesting
    // -----------------------------------------------------------------------

    /// Editor for the child fields of the field at `index`, one level deeper.
    ///
    /// Works for objects and for arrays whose items are objects; a missing
    /// property list is created empty.
    pub fn nested(&mut self, index: usize) -> Result<FieldEditor<'_>, EditorWarning> {
        let level = self.level + 1;
        let config = self.config;
        let parent = self.path.clone();
        let field = self.get_mut(index)?;
        let path = parent.children_of(field);
        let name = field.name.clone();

        match field.shape.children_mut() {
            Some(children) => Ok(FieldEditor {
                fields: children,
                level,
                path,
                config,
            }),
            None => Err(EditorWarning::NotComposite { name }),
        }
    }

    fn get(&self, index: usize) -> Result<&FieldDefinition, EditorWarning> {
        let len = self.fields.len();
        self.fields
            .get(index)
            .ok_or(EditorWarning::IndexOutOfRange { index, len })
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut FieldDefinition, EditorWarning> {
        let len = self.fields.len();
        self.fields
            .get_mut(index)
            .ok_or(EditorWarning::IndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn named(names: &[&str]) -> Vec<FieldDefinition> {
        names
            .iter()
            .map(|n| FieldDefinition::new(*n, FieldType::String))
            .collect()
    }

    #[test]
    fn add_field_appends_blank_string_field() {
        let mut fields = named(&["a"]);
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        let index = editor.add_field();

        assert_eq!(index, 1);
        let added = &editor.fields()[1];
        assert_eq!(added.name, "");
        assert_eq!(added.field_type(), FieldType::String);
        assert!(!added.required);
    }

    #[test]
    fn remove_field_drops_entry() {
        let mut fields = named(&["a", "b", "c"]);
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        let removed = editor.remove_field(1).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "c");
    }

    #[test]
    fn out_of_range_index_is_refused() {
        let mut fields = named(&["a"]);
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        assert_matches!(
            editor.remove_field(3),
            Err(EditorWarning::IndexOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn duplicate_inserts_copy_after_original() {
        let mut fields = named(&["a", "b"]);
        fields[0].required = true;
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());

        assert_eq!(editor.duplicate_field(0).unwrap(), 1);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "a_copy", "b"]);
        assert!(fields[1].required);
    }

    #[test]
    fn duplicate_does_not_uniquify_beyond_suffix() {
        let mut fields = named(&["a", "a_copy"]);
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        editor.duplicate_field(0).unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "a_copy", "a_copy"]);
    }

    #[test]
    fn rename_onto_sibling_is_refused_and_list_unchanged() {
        let mut fields = named(&["a", "b"]);
        let before = fields.clone();
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());

        let result = editor.rename_field(1, "a");
        assert_eq!(
            result,
            Err(EditorWarning::DuplicateName {
                name: "a".to_string()
            })
        );
        assert_eq!(fields, before);
    }

    #[test]
    fn rename_to_own_name_or_fresh_name_succeeds() {
        let mut fields = named(&["a", "b"]);
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        editor.rename_field(1, "b").unwrap();
        editor.rename_field(1, "c").unwrap();
        assert_eq!(fields[1].name, "c");
    }

    #[test]
    fn switching_object_to_string_clears_nested_state() {
        let mut fields = vec![FieldDefinition::object("addr", named(&["x"]))
            .with_constraint("minProperties", json!(1))];
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        editor.set_field_type(0, FieldType::String).unwrap();

        assert_eq!(fields[0].shape, FieldShape::String);
        assert!(fields[0].children().is_none());
        assert!(fields[0].constraints.is_empty());
    }

    #[test]
    fn switching_into_composites_initialises_children() {
        let mut fields = named(&["a", "b"]);
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        editor.set_field_type(0, FieldType::Object).unwrap();
        editor.set_field_type(1, FieldType::Array).unwrap();

        assert_eq!(
            fields[0].shape,
            FieldShape::Object {
                properties: Some(vec![])
            }
        );
        assert_eq!(
            fields[1].shape,
            FieldShape::Array {
                items: Some(Box::new(FieldShape::String))
            }
        );
    }

    #[test]
    fn setting_same_type_keeps_children() {
        let mut fields = vec![FieldDefinition::object("addr", named(&["x"]))];
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        editor.set_field_type(0, FieldType::Object).unwrap();
        assert_eq!(fields[0].children().unwrap().len(), 1);
    }

    #[test]
    fn nested_editor_edits_object_properties() {
        let mut fields = vec![FieldDefinition::object("user", vec![])];
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        {
            let mut nested = editor.nested(0).unwrap();
            assert_eq!(nested.level(), 1);
            let i = nested.add_field();
            nested.rename_field(i, "email").unwrap();
            nested.set_required(i, true).unwrap();
            assert_eq!(nested.field_path(i).unwrap().to_string(), "user.email");
        }
        let children = fields[0].children().unwrap();
        assert_eq!(children[0].name, "email");
        assert!(children[0].required);
    }

    #[test]
    fn nested_editor_edits_array_item_properties() {
        let mut fields = named(&["orders"]);
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        editor.set_field_type(0, FieldType::Array).unwrap();
        editor.set_items_type(0, FieldType::Object).unwrap();

        let mut nested = editor.nested(0).unwrap();
        let i = nested.add_field();
        nested.rename_field(i, "sku").unwrap();
        assert_eq!(nested.field_path(i).unwrap().to_string(), "orders[].sku");
    }

    #[test]
    fn scalar_and_scalar_array_have_no_nested_editor() {
        let mut fields = vec![
            FieldDefinition::new("name", FieldType::String),
            FieldDefinition::array("tags", FieldShape::String),
        ];
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        assert_matches!(editor.nested(0), Err(EditorWarning::NotComposite { .. }));
        assert_matches!(editor.nested(1), Err(EditorWarning::NotComposite { .. }));
    }

    #[test]
    fn nested_rename_collision_checks_only_siblings() {
        let mut fields = vec![
            FieldDefinition::new("id", FieldType::Integer),
            FieldDefinition::object("meta", named(&["note"])),
        ];
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        let mut nested = editor.nested(1).unwrap();
        nested.rename_field(0, "id").unwrap();
        assert_eq!(fields[1].children().unwrap()[0].name, "id");
    }

    #[test]
    fn deep_levels_start_collapsed_but_remain_editable() {
        let mut fields = vec![FieldDefinition::object("l1", vec![])];
        let config = EditorConfig {
            collapse_after_level: 1,
        };
        let mut root = FieldEditor::new(&mut fields, config);
        assert!(!root.is_collapsed_by_default());

        let mut l1 = root.nested(0).unwrap();
        assert!(!l1.is_collapsed_by_default());
        let i = l1.add_field();
        l1.set_field_type(i, FieldType::Object).unwrap();

        let mut l2 = l1.nested(i).unwrap();
        assert_eq!(l2.level(), 2);
        assert!(l2.is_collapsed_by_default());
        l2.add_field();
        assert_eq!(l2.fields().len(), 1);
    }

    #[test]
    fn constraint_edits_round_trip() {
        let mut fields = named(&["code"]);
        let mut editor = FieldEditor::new(&mut fields, EditorConfig::default());
        editor.set_constraint(0, "maxLength", json!(8)).unwrap();
        editor.set_description(0, Some(String::new())).unwrap();
        assert_eq!(editor.remove_constraint(0, "maxLength").unwrap(), Some(json!(8)));
        assert!(fields[0].constraints.is_empty());
        assert!(fields[0].description.is_none());
    }
}
