use serde::{Deserialize, Serialize};

/// One page of a larger result set.
///
/// Mirrors the paged JSON shape of the backend (`content`, `totalPages`, ...)
/// and is also what the client-side paginator returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based index of this page
    #[serde(default, rename = "number")]
    pub page: usize,
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub total_elements: usize,
    #[serde(default)]
    pub total_pages: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page + 1 >= self.total_pages
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.page == 0
    }
}

/// Some list endpoints answer with a bare array, others with a page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Paged(page) => page.content,
            ListResponse::Plain(items) => items,
        }
    }
}
