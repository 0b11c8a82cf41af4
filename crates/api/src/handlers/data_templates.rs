//! Handlers for data templates.
//!
//! CRUD over persisted templates plus the stateless helpers the editor calls
//! while a template is being built: validation, schema generation and JSON
//! sample import. Every write goes through the template validator first.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use datagen_core::data_validation;
use datagen_core::error::CoreError;
use datagen_core::field::FieldDefinition;
use datagen_core::json_import;
use datagen_core::pagination::Page;
use datagen_core::schema;
use datagen_core::schema_merge;
use datagen_core::template::{self, TemplateCandidate};
use datagen_core::types::DbId;
use datagen_db::models::data_template::{CreateDataTemplate, DataTemplate, UpdateDataTemplate};
use datagen_db::repositories::DataTemplateRepo;

use crate::error::{AppError, AppResult};
use crate::query::SearchPageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Give up looking for a free copy name after this many candidates.
const MAX_COPY_NAME_ATTEMPTS: usize = 1000;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /data-templates`.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    #[serde(flatten)]
    pub template: TemplateCandidate,
    #[serde(default)]
    pub example_data: Option<Value>,
}

/// Body of `PUT /data-templates/{id}`. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<Value>,
    pub field_definitions: Option<Value>,
    pub example_data: Option<Value>,
}

/// Body of `POST /data-templates/{id}/copy`. The body itself is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CopyTemplateRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateSchemaRequest {
    pub field_definitions: Value,
}

#[derive(Debug, Serialize)]
pub struct GenerateSchemaResponse {
    pub schema: Value,
}

#[derive(Debug, Deserialize)]
pub struct ParseJsonRequest {
    pub json_string: String,
}

/// Body of `POST /data-templates/validate-data`.
#[derive(Debug, Deserialize)]
pub struct ValidateDataRequest {
    pub schema: Value,
    pub data: Value,
}

/// Body of `POST /data-templates/{id}/validate-data`.
#[derive(Debug, Deserialize)]
pub struct ValidateTemplateDataRequest {
    pub data: Value,
}

/// Body of `POST /data-templates/merge-schema`. Either side may be absent.
#[derive(Debug, Default, Deserialize)]
pub struct MergeSchemaRequest {
    #[serde(default)]
    pub template_schema: Option<Value>,
    #[serde(default)]
    pub document_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct DeletedTemplate {
    pub id: DbId,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a data template exists, returning the full row.
async fn ensure_template_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<DataTemplate> {
    DataTemplateRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "DataTemplate",
            id,
        })
    })
}

/// Reject a name already used by another template.
async fn ensure_name_available(
    pool: &sqlx::PgPool,
    name: &str,
    excluding: Option<DbId>,
) -> AppResult<()> {
    if DataTemplateRepo::name_exists(pool, name, excluding).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Template name '{name}' already exists"
        ))));
    }
    Ok(())
}

/// Run the template validator, turning a failed report into a 400.
fn ensure_valid(candidate: &TemplateCandidate) -> AppResult<()> {
    let report = template::validate_template(candidate);
    if report.is_valid() {
        Ok(())
    } else {
        Err(AppError::Validation(report.errors()))
    }
}

/// Trimmed description; blank becomes `None`.
fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Description column patch: `None` keeps the stored value, and a blank
/// description becomes `""`, which the repository stores as NULL.
fn description_patch(description: Option<String>) -> Option<String> {
    description.map(|d| normalize_description(Some(d)).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// GET /data-templates
// ---------------------------------------------------------------------------

/// List templates, newest first, with paging and an optional search term.
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<SearchPageParams>,
) -> AppResult<impl IntoResponse> {
    let request = params.page_request();
    let (items, total) = DataTemplateRepo::list(
        &state.pool,
        params.search.as_deref(),
        request.limit(),
        request.offset(),
    )
    .await?;
    tracing::debug!(count = items.len(), total, "Listed data templates");
    Ok(Json(ApiResponse::ok(Page::new(items, total, request))))
}

// ---------------------------------------------------------------------------
// POST /data-templates
// ---------------------------------------------------------------------------

/// Create a new data template.
pub async fn create_template(
    State(state): State<AppState>,
    Json(input): Json<CreateTemplateRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_valid(&input.template)?;

    let name = input.template.name.trim().to_string();
    ensure_name_available(&state.pool, &name, None).await?;

    let create = CreateDataTemplate {
        name,
        description: normalize_description(input.template.description),
        schema: input.template.schema,
        field_definitions: input.template.field_definitions,
        example_data: input.example_data,
    };
    let fields = template::field_count(&create.field_definitions);
    let created = DataTemplateRepo::create(&state.pool, &create).await?;
    tracing::info!(id = created.id, name = %created.name, fields, "Data template created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, "Template created successfully")),
    ))
}

// ---------------------------------------------------------------------------
// GET /data-templates/{id}
// ---------------------------------------------------------------------------

/// Get a single data template by ID.
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let t = ensure_template_exists(&state.pool, id).await?;
    Ok(Json(ApiResponse::ok(t)))
}

// ---------------------------------------------------------------------------
// PUT /data-templates/{id}
// ---------------------------------------------------------------------------

/// Update an existing data template.
///
/// The patch is merged over the stored row and the result is validated as a
/// whole, so a partial update can never leave an invalid template behind.
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplateRequest>,
) -> AppResult<impl IntoResponse> {
    let existing = ensure_template_exists(&state.pool, id).await?;

    let merged = TemplateCandidate {
        name: input.name.clone().unwrap_or_else(|| existing.name.clone()),
        description: match &input.description {
            Some(d) => normalize_description(Some(d.clone())),
            None => existing.description.clone(),
        },
        schema: input.schema.clone().unwrap_or(existing.schema),
        field_definitions: input
            .field_definitions
            .clone()
            .unwrap_or(existing.field_definitions),
    };
    ensure_valid(&merged)?;

    let name = input.name.as_deref().map(str::trim).map(str::to_string);
    if let Some(ref name) = name {
        if *name != existing.name {
            ensure_name_available(&state.pool, name, Some(id)).await?;
        }
    }

    let patch = UpdateDataTemplate {
        name,
        description: description_patch(input.description),
        schema: input.schema,
        field_definitions: input.field_definitions,
        example_data: input.example_data,
    };
    let updated = DataTemplateRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DataTemplate",
            id,
        }))?;
    tracing::info!(id = updated.id, "Data template updated");

    Ok(Json(ApiResponse::with_message(
        updated,
        "Template updated successfully",
    )))
}

// ---------------------------------------------------------------------------
// DELETE /data-templates/{id}
// ---------------------------------------------------------------------------

/// Delete a data template by ID.
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = DataTemplateRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(id, "Data template deleted");
        Ok(Json(ApiResponse::with_message(
            DeletedTemplate { id },
            "Template deleted successfully",
        )))
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "DataTemplate",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// POST /data-templates/{id}/copy
// ---------------------------------------------------------------------------

/// Copy a template under a new, unused name.
///
/// The name defaults to `"Copy of {source}"`; on collision a ` (n)` counter
/// is appended until a free name is found.
pub async fn copy_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let request: CopyTemplateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CopyTemplateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let source = ensure_template_exists(&state.pool, id).await?;

    let mut chosen = None;
    for candidate in template::copy_name_candidates(&source.name, request.name.as_deref())
        .take(MAX_COPY_NAME_ATTEMPTS)
    {
        if !DataTemplateRepo::name_exists(&state.pool, &candidate, None).await? {
            chosen = Some(candidate);
            break;
        }
    }
    let name = chosen.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "No free name found for a copy of '{}'",
            source.name
        )))
    })?;

    let create = CreateDataTemplate {
        name,
        description: source.description,
        schema: source.schema,
        field_definitions: source.field_definitions,
        example_data: source.example_data,
    };
    let created = DataTemplateRepo::create(&state.pool, &create).await?;
    tracing::info!(source_id = id, id = created.id, name = %created.name, "Data template copied");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, "Template copied successfully")),
    ))
}

// ---------------------------------------------------------------------------
// POST /data-templates/validate
// ---------------------------------------------------------------------------

/// Validate a candidate template without saving it.
///
/// Always answers 200; the report carries `valid` and the collected `errors`.
pub async fn validate_template(
    Json(candidate): Json<TemplateCandidate>,
) -> AppResult<impl IntoResponse> {
    let report = template::validate_template(&candidate);
    tracing::debug!(valid = report.is_valid(), "Validated data template");
    Ok(Json(ApiResponse::ok(report)))
}

// ---------------------------------------------------------------------------
// POST /data-templates/generate-schema
// ---------------------------------------------------------------------------

/// Generate the JSON Schema for a list of field definitions.
pub async fn generate_schema(
    Json(input): Json<GenerateSchemaRequest>,
) -> AppResult<impl IntoResponse> {
    let fields: Vec<FieldDefinition> = serde_json::from_value(input.field_definitions)
        .map_err(|e| AppError::BadRequest(format!("Invalid field definitions: {e}")))?;
    let schema = schema::generate_schema(&fields);
    Ok(Json(ApiResponse::ok(GenerateSchemaResponse { schema })))
}

// ---------------------------------------------------------------------------
// POST /data-templates/parse-json
// ---------------------------------------------------------------------------

/// Infer field definitions and a schema from a pasted JSON sample.
pub async fn parse_json(Json(input): Json<ParseJsonRequest>) -> AppResult<impl IntoResponse> {
    let imported = json_import::import_sample(&input.json_string).map_err(CoreError::from)?;
    tracing::info!(
        fields = imported.field_definitions.len(),
        "Parsed JSON sample into field definitions"
    );
    Ok(Json(ApiResponse::ok(imported)))
}

// ---------------------------------------------------------------------------
// POST /data-templates/validate-data
// ---------------------------------------------------------------------------

/// Check data records against a schema supplied in the request.
///
/// Always answers 200; the report carries `valid`, `errors` and `warnings`.
pub async fn validate_data(Json(input): Json<ValidateDataRequest>) -> AppResult<impl IntoResponse> {
    let report = data_validation::validate_data(&input.schema, &input.data);
    tracing::debug!(
        valid = report.valid,
        errors = report.errors.len(),
        "Validated data against schema"
    );
    Ok(Json(ApiResponse::ok(report)))
}

// ---------------------------------------------------------------------------
// POST /data-templates/{id}/validate-data
// ---------------------------------------------------------------------------

/// Check data records against a stored template's schema.
pub async fn validate_template_data(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ValidateTemplateDataRequest>,
) -> AppResult<impl IntoResponse> {
    let t = ensure_template_exists(&state.pool, id).await?;
    let report = data_validation::validate_data(&t.schema, &input.data);
    tracing::debug!(id, valid = report.valid, "Validated data against template");
    Ok(Json(ApiResponse::ok(report)))
}

// ---------------------------------------------------------------------------
// POST /data-templates/merge-schema
// ---------------------------------------------------------------------------

/// Merge a template schema with a document schema; the template wins.
pub async fn merge_schema(Json(input): Json<MergeSchemaRequest>) -> AppResult<impl IntoResponse> {
    let schema = schema_merge::merge_schemas(
        input.template_schema.as_ref(),
        input.document_schema.as_ref(),
    );
    Ok(Json(ApiResponse::ok(GenerateSchemaResponse { schema })))
}
