//! Paper data model matching the ScholarAI `/search` response schema.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a field whose explicit `null` means the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A research paper as ranked and shaped by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paper {
    /// OpenAlex work ID (a URL).
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,

    /// Paper title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,

    /// Publication year.
    pub year: Option<i32>,

    /// Authors in byline order. The backend appends a "+N more" entry past five.
    #[serde(deserialize_with = "null_as_default")]
    pub authors: Vec<Author>,

    /// Journal or source name.
    #[serde(deserialize_with = "null_as_default")]
    pub journal: String,

    /// Publisher name.
    #[serde(deserialize_with = "null_as_default")]
    pub publisher: String,

    /// Number of citations this paper has received.
    #[serde(deserialize_with = "null_as_default")]
    pub citations: u64,

    /// Whether this paper is open access.
    #[serde(deserialize_with = "null_as_default")]
    pub open_access: bool,

    /// Open access landing URL.
    pub oa_url: Option<String>,

    /// DOI, as a `https://doi.org/...` URL. The backend sends `""` when absent.
    pub doi: Option<String>,

    /// Full abstract text.
    #[serde(rename = "abstract", deserialize_with = "null_as_default")]
    pub abstract_text: String,

    /// Short snippet of the abstract.
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,

    /// Top concepts with relevance scores.
    #[serde(deserialize_with = "null_as_default")]
    pub concepts: Vec<Concept>,

    /// Work type (article, review, ...).
    #[serde(rename = "type")]
    pub paper_type: Option<String>,

    /// Opaque ranking score.
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,

    /// Scopus title-search link.
    pub scopus_search_url: Option<String>,
}

impl Paper {
    /// Get the paper title, falling back to "Untitled" if empty.
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        if self.title.trim().is_empty() { "Untitled" } else { &self.title }
    }

    /// Get the DOI if present and non-empty.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Get the open access URL if present and non-empty.
    #[must_use]
    pub fn oa_url(&self) -> Option<&str> {
        self.oa_url.as_deref().filter(|u| !u.is_empty())
    }

    /// Get the work type if present and non-empty.
    #[must_use]
    pub fn paper_type(&self) -> Option<&str> {
        self.paper_type.as_deref().filter(|t| !t.is_empty())
    }

    /// Get author names as a comma-separated string.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the full abstract has more to show than the summary.
    ///
    /// Compares character counts; equal lengths never offer "read more".
    #[must_use]
    pub fn has_more_abstract(&self) -> bool {
        self.abstract_text.chars().count() > self.summary.chars().count()
    }
}

/// Paper author reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    /// Display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// OpenAlex author ID.
    pub id: Option<String>,

    /// ORCID URL.
    pub orcid: Option<String>,
}

/// A concept tag with its relevance score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Concept {
    /// Concept name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Relevance score in `0.0..=1.0`.
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,
}
