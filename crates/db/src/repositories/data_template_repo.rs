//! Repository for the `data_templates` table.

use datagen_core::types::DbId;
use sqlx::PgPool;

use crate::models::data_template::{CreateDataTemplate, DataTemplate, UpdateDataTemplate};

const COLUMNS: &str = "id, name, description, schema, field_definitions, example_data, \
     (CASE WHEN jsonb_typeof(field_definitions) = 'array' \
           THEN jsonb_array_length(field_definitions) ELSE 0 END)::INT4 AS field_count, \
     created_at, updated_at";

/// Shared `WHERE` clause for list and count; `$1` is an optional ILIKE pattern.
const SEARCH_FILTER: &str = "($1::TEXT IS NULL OR name ILIKE $1 OR description ILIKE $1)";

/// Provides CRUD operations for data templates.
pub struct DataTemplateRepo;

impl DataTemplateRepo {
    /// Insert a new data template, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDataTemplate,
    ) -> Result<DataTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO data_templates \
                (name, description, schema, field_definitions, example_data) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DataTemplate>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.schema)
            .bind(&input.field_definitions)
            .bind(&input.example_data)
            .fetch_one(pool)
            .await
    }

    /// Find a data template by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DataTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM data_templates WHERE id = $1");
        sqlx::query_as::<_, DataTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a template with this exact name exists, optionally ignoring
    /// one row (the template being renamed).
    pub async fn name_exists(
        pool: &PgPool,
        name: &str,
        excluding: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                SELECT 1 FROM data_templates \
                WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(excluding)
        .fetch_one(pool)
        .await
    }

    /// List templates newest first, filtered by a case-insensitive substring
    /// of name or description. Returns the page and the total match count.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<DataTemplate>, i64), sqlx::Error> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let query = format!(
            "SELECT {COLUMNS} FROM data_templates \
             WHERE {SEARCH_FILTER} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, DataTemplate>(&query)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM data_templates WHERE {SEARCH_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Update a data template. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDataTemplate,
    ) -> Result<Option<DataTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE data_templates SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3::TEXT IS NULL THEN description \
                    ELSE NULLIF(BTRIM($3), '') END, \
                schema = COALESCE($4, schema), \
                field_definitions = COALESCE($5, field_definitions), \
                example_data = COALESCE($6, example_data) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DataTemplate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.schema)
            .bind(&input.field_definitions)
            .bind(&input.example_data)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a data template by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM data_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
