//! Search result page returned by `GET /search`.

use serde::{Deserialize, Serialize};

use super::Paper;
use crate::pagination::{self, PageInfo};

/// One page of ranked search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    /// Topic the backend searched for.
    pub topic: String,

    /// Year range description, e.g. `"2020-2025"`.
    pub years_filter: String,

    /// Total matches across all pages.
    pub total_found: u64,

    /// Distinct journals on this page.
    pub total_journals: u64,

    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u32,

    /// Page size. Absent when the result set is empty.
    pub per_page: Option<u32>,

    /// Papers in backend order.
    pub results: Vec<Paper>,
}

fn default_page() -> u32 {
    1
}

impl SearchResult {
    /// Page size reported by the backend, or `requested` when it was omitted.
    #[must_use]
    pub fn page_size(&self, requested: u32) -> u32 {
        self.per_page.filter(|&n| n > 0).unwrap_or(requested)
    }

    /// Total number of pages (at least 1).
    #[must_use]
    pub fn total_pages(&self, requested: u32) -> u32 {
        pagination::total_pages(self.total_found, self.page_size(requested))
    }

    /// Pagination metadata for this page.
    #[must_use]
    pub fn page_info(&self, requested: u32) -> PageInfo {
        PageInfo::new(self.page.max(1), self.total_pages(requested))
    }

    /// Check if the page has no papers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
