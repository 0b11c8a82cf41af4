//! Request handlers, one module per resource.

pub mod data_templates;
