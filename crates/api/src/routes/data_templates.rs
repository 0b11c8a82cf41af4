//! Route definitions for data templates, mounted at `/data-templates`.
//!
//! ```text
//! GET    /                    list_templates
//! POST   /                    create_template
//! POST   /validate            validate_template
//! POST   /generate-schema     generate_schema
//! POST   /parse-json          parse_json
//! POST   /validate-data       validate_data
//! POST   /merge-schema        merge_schema
//! GET    /{id}                get_template
//! PUT    /{id}                update_template
//! DELETE /{id}                delete_template
//! POST   /{id}/copy           copy_template
//! POST   /{id}/validate-data  validate_template_data
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::data_templates;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(data_templates::list_templates).post(data_templates::create_template),
        )
        .route("/validate", post(data_templates::validate_template))
        .route("/generate-schema", post(data_templates::generate_schema))
        .route("/parse-json", post(data_templates::parse_json))
        .route("/validate-data", post(data_templates::validate_data))
        .route("/merge-schema", post(data_templates::merge_schema))
        .route(
            "/{id}",
            get(data_templates::get_template)
                .put(data_templates::update_template)
                .delete(data_templates::delete_template),
        )
        .route("/{id}/copy", post(data_templates::copy_template))
        .route("/{id}/validate-data", post(data_templates::validate_template_data))
}
