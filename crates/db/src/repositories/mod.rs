//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod data_template_repo;

pub use data_template_repo::DataTemplateRepo;
