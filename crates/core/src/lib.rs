//! Domain logic for data templates.
//!
//! Everything in this crate is pure: no database, no HTTP, no logging.
//! Warnings and validation failures are returned as values so the API
//! layer (or any other caller) decides how to surface them.

pub mod data_validation;
pub mod editor;
pub mod error;
pub mod field;
pub mod field_path;
pub mod json_import;
pub mod pagination;
pub mod query_input;
pub mod schema;
pub mod schema_merge;
pub mod template;
pub mod types;
