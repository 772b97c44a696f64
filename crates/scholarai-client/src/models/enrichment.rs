//! Response shapes of the per-record and auxiliary endpoints.

use serde::{Deserialize, Serialize};

/// Response of `POST /summarize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Generated summary.
    pub summary: String,

    /// Provider that produced it.
    #[serde(default)]
    pub provider: Option<String>,
}

/// Response of `POST /cite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationResponse {
    /// Formatted citation.
    pub citation: String,
}

/// Response of `POST /cite/batch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCitationResponse {
    /// Newline-joined citations.
    pub citations: String,
}

/// Response of `GET /scopus/check`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopusStatus {
    /// Whether Scopus indexes the DOI.
    #[serde(default)]
    pub indexed: bool,

    /// Scopus record link.
    #[serde(default)]
    pub scopus_url: Option<String>,

    /// Scopus record ID.
    #[serde(default)]
    pub scopus_id: Option<String>,
}

impl ScopusStatus {
    /// The "not indexed" result every failed check resolves to.
    #[must_use]
    pub const fn not_indexed() -> Self {
        Self { indexed: false, scopus_url: None, scopus_id: None }
    }
}

/// Response of `GET /trending`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingResponse {
    /// Field of study searched.
    pub field: String,

    /// Works per publication year.
    pub data: Vec<TrendingBucket>,
}

/// One `group_by` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingBucket {
    /// Group key (the year).
    pub key: String,

    /// Display name of the key.
    pub key_display_name: Option<String>,

    /// Works in the bucket.
    pub count: u64,
}

/// A downloaded spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File name from `Content-Disposition`, or the derived fallback.
    pub filename: String,

    /// Spreadsheet bytes.
    pub bytes: Vec<u8>,
}
