//! Shared query parameter types for API handlers.

use datagen_core::pagination::PageRequest;
use serde::Deserialize;

/// Page-based listing parameters with an optional search term
/// (`?page=&page_size=&search=`).
///
/// Out-of-range values are normalized rather than rejected; see
/// [`PageRequest::new`].
#[derive(Debug, Default, Deserialize)]
pub struct SearchPageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
}

impl SearchPageParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}
