//! Data template model and DTOs.

use datagen_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `data_templates` table.
///
/// `field_count` is computed by the query (top-level entries of
/// `field_definitions`), not stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DataTemplate {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub schema: serde_json::Value,
    pub field_definitions: serde_json::Value,
    pub example_data: Option<serde_json::Value>,
    pub field_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new data template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDataTemplate {
    pub name: String,
    pub description: Option<String>,
    pub schema: serde_json::Value,
    pub field_definitions: serde_json::Value,
    #[serde(default)]
    pub example_data: Option<serde_json::Value>,
}

/// DTO for updating an existing data template. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDataTemplate {
    pub name: Option<String>,
    /// `None` keeps the stored value; a blank string clears it to NULL.
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
    pub field_definitions: Option<serde_json::Value>,
    pub example_data: Option<serde_json::Value>,
}
