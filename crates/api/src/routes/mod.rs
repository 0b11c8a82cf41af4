pub mod data_templates;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /data-templates                          list, create
/// /data-templates/validate                 validate (POST)
/// /data-templates/generate-schema          generate schema (POST)
/// /data-templates/parse-json               import JSON sample (POST)
/// /data-templates/validate-data            check data against a schema (POST)
/// /data-templates/merge-schema             merge template + document schema (POST)
/// /data-templates/{id}                     get, update, delete
/// /data-templates/{id}/copy                copy (POST)
/// /data-templates/{id}/validate-data       check data against a stored template (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/data-templates", data_templates::router())
}
