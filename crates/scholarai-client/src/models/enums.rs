//! Fixed option sets used in queries and requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Hybrid ranking score (backend default).
    #[default]
    Relevance,
    /// Most cited first.
    Citations,
    /// Newest first.
    YearDesc,
    /// Oldest first.
    YearAsc,
}

impl SortMode {
    /// All sort modes in display order.
    pub const ALL: [Self; 4] = [Self::Relevance, Self::Citations, Self::YearDesc, Self::YearAsc];

    /// Wire value for `sort_by`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Citations => "citations",
            Self::YearDesc => "year_desc",
            Self::YearAsc => "year_asc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "relevance" => Ok(Self::Relevance),
            "citations" => Ok(Self::Citations),
            "year_desc" => Ok(Self::YearDesc),
            "year_asc" => Ok(Self::YearAsc),
            _ => Err(QueryError::invalid("sort", s)),
        }
    }
}

/// Work type filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaperType {
    /// Journal article.
    Article,
    /// Review article.
    Review,
    /// Book chapter.
    BookChapter,
    /// Book.
    Book,
    /// Thesis or dissertation.
    Dissertation,
    /// Preprint.
    Preprint,
    /// Dataset.
    Dataset,
}

impl PaperType {
    /// All paper types in display order.
    pub const ALL: [Self; 7] = [
        Self::Article,
        Self::Review,
        Self::BookChapter,
        Self::Book,
        Self::Dissertation,
        Self::Preprint,
        Self::Dataset,
    ];

    /// Sentinel meaning "no type filter".
    pub const ANY: &'static str = "all";

    /// Wire value for `type_filter`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Review => "review",
            Self::BookChapter => "book-chapter",
            Self::Book => "book",
            Self::Dissertation => "dissertation",
            Self::Preprint => "preprint",
            Self::Dataset => "dataset",
        }
    }

    /// Parse a form value, mapping the `all`/`any` sentinel to no filter.
    pub fn parse_filter(s: &str) -> Result<Option<Self>, QueryError> {
        let value = s.trim().to_ascii_lowercase();
        if value.is_empty() || value == Self::ANY || value == "any" {
            return Ok(None);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .map(Some)
            .ok_or_else(|| QueryError::invalid("type", s))
    }
}

impl fmt::Display for PaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Citation style requested from `/cite`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationFormat {
    /// BibTeX entry.
    #[default]
    Bibtex,
    /// APA reference.
    Apa,
}

impl CitationFormat {
    /// Both formats.
    pub const ALL: [Self; 2] = [Self::Bibtex, Self::Apa];

    /// Wire value for `format`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bibtex => "bibtex",
            Self::Apa => "apa",
        }
    }

    /// Human label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bibtex => "BibTeX",
            Self::Apa => "APA",
        }
    }
}

impl fmt::Display for CitationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitationFormat {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bibtex" | "bib" => Ok(Self::Bibtex),
            "apa" => Ok(Self::Apa),
            _ => Err(QueryError::invalid("citation format", s)),
        }
    }
}
