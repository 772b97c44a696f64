//! Search form state and the normalized query it produces.
//!
//! [`FilterForm`] holds what the user typed; [`FilterForm::build`] validates it
//! into an immutable [`SearchQuery`]. Nothing here touches the network.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;

use crate::error::QueryError;
use crate::models::{PaperType, SortMode};

/// First selectable publication year.
pub const MIN_YEAR: i32 = 1950;

/// Selectable minimum-citation tiers.
pub const CITATION_TIERS: [u32; 7] = [5, 10, 25, 50, 100, 500, 1000];

/// The current calendar year (local time).
#[must_use]
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Selectable years, newest first: `current_year` down to [`MIN_YEAR`].
#[must_use]
pub fn year_options(current_year: i32) -> Vec<i32> {
    (MIN_YEAR..=current_year).rev().collect()
}

/// Minimum-citations selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MinCitations {
    /// No minimum; `min_citations` is left out of the query.
    #[default]
    Any,
    /// One of [`CITATION_TIERS`].
    AtLeast(u32),
}

impl MinCitations {
    /// Pick a tier, rejecting values outside [`CITATION_TIERS`].
    pub fn tier(value: u32) -> Result<Self, QueryError> {
        if CITATION_TIERS.contains(&value) {
            Ok(Self::AtLeast(value))
        } else {
            Err(QueryError::invalid("minimum citations", value.to_string()))
        }
    }

    /// Threshold to send, if any.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Any => None,
            Self::AtLeast(n) => Some(n),
        }
    }
}

impl FromStr for MinCitations {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        let n: u32 = value.parse().map_err(|_| QueryError::invalid("minimum citations", s))?;
        Self::tier(n)
    }
}

impl fmt::Display for MinCitations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::AtLeast(n) => write!(f, "{n}+"),
        }
    }
}

/// Raw search form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    /// Research topic or keywords.
    pub topic: String,
    /// Start year.
    pub start_year: Option<i32>,
    /// End year.
    pub end_year: Option<i32>,
    /// Minimum citations tier.
    pub min_citations: MinCitations,
    /// Only open access papers.
    pub open_access_only: bool,
    /// Result ordering.
    pub sort_by: SortMode,
    /// Work type; `None` is "all".
    pub type_filter: Option<PaperType>,
    /// Author name substring.
    pub author: String,
}

impl FilterForm {
    /// Form with a topic and default filters.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self { topic: topic.into(), ..Default::default() }
    }

    /// Whether submission is allowed (topic is not blank).
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.topic.trim().is_empty()
    }

    /// Reset every optional filter to its default, keeping the topic.
    pub fn clear_filters(&mut self) {
        *self = Self { topic: std::mem::take(&mut self.topic), ..Default::default() };
    }

    /// Check if any optional filter differs from its default.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        *self != Self { topic: self.topic.clone(), ..Default::default() }
    }

    /// Validate against the current year.
    pub fn build(&self) -> Result<SearchQuery, QueryError> {
        self.build_for_year(current_year())
    }

    /// Validate with an explicit "current year" bounding the year options.
    pub fn build_for_year(&self, current_year: i32) -> Result<SearchQuery, QueryError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(QueryError::EmptyTopic);
        }

        for year in [self.start_year, self.end_year].into_iter().flatten() {
            if !(MIN_YEAR..=current_year).contains(&year) {
                return Err(QueryError::YearOutOfRange { year, min: MIN_YEAR, max: current_year });
            }
        }

        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(QueryError::InvertedYearRange { start, end });
            }
        }

        let author = self.author.trim();

        Ok(SearchQuery {
            topic: topic.to_string(),
            start_year: self.start_year,
            end_year: self.end_year,
            min_citations: self.min_citations.value(),
            open_access_only: self.open_access_only,
            sort_by: self.sort_by,
            type_filter: self.type_filter,
            author: (!author.is_empty()).then(|| author.to_string()),
        })
    }
}

/// A validated, immutable search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    topic: String,
    start_year: Option<i32>,
    end_year: Option<i32>,
    min_citations: Option<u32>,
    open_access_only: bool,
    sort_by: SortMode,
    type_filter: Option<PaperType>,
    author: Option<String>,
}

impl SearchQuery {
    /// Query for a topic with default filters.
    pub fn new(topic: impl Into<String>) -> Result<Self, QueryError> {
        FilterForm::new(topic).build()
    }

    /// Trimmed topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Start year.
    #[must_use]
    pub const fn start_year(&self) -> Option<i32> {
        self.start_year
    }

    /// End year.
    #[must_use]
    pub const fn end_year(&self) -> Option<i32> {
        self.end_year
    }

    /// Minimum citations.
    #[must_use]
    pub const fn min_citations(&self) -> Option<u32> {
        self.min_citations
    }

    /// Open access only.
    #[must_use]
    pub const fn open_access_only(&self) -> bool {
        self.open_access_only
    }

    /// Result ordering.
    #[must_use]
    pub const fn sort_by(&self) -> SortMode {
        self.sort_by
    }

    /// Work type filter.
    #[must_use]
    pub const fn type_filter(&self) -> Option<PaperType> {
        self.type_filter
    }

    /// Author filter.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Query-string pairs for `GET /search`.
    ///
    /// Order: topic, years, open access, citations, sort, type, author, then
    /// page and limit. Unset filters are omitted.
    #[must_use]
    pub fn search_params(&self, page: u32, limit: u32) -> Vec<(&'static str, String)> {
        let mut params = self.filter_params();
        params.push(("sort_by", self.sort_by.as_str().to_string()));
        if let Some(t) = self.type_filter {
            params.push(("type_filter", t.as_str().to_string()));
        }
        if let Some(author) = &self.author {
            params.push(("author", author.clone()));
        }
        params.push(("page", page.max(1).to_string()));
        params.push(("limit", limit.to_string()));
        params
    }

    /// Query-string pairs for `GET /export`.
    #[must_use]
    pub fn export_params(&self) -> Vec<(&'static str, String)> {
        self.filter_params()
    }

    fn filter_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("topic", self.topic.clone())];
        if let Some(start) = self.start_year {
            params.push(("start_year", start.to_string()));
        }
        if let Some(end) = self.end_year {
            params.push(("end_year", end.to_string()));
        }
        if self.open_access_only {
            params.push(("open_access_only", "true".to_string()));
        }
        if let Some(min) = self.min_citations {
            params.push(("min_citations", min.to_string()));
        }
        params
    }

    /// Fallback export file name: `research_<topic with underscores>.xlsx`.
    #[must_use]
    pub fn export_filename(&self) -> String {
        format!("research_{}.xlsx", self.topic.replace(' ', "_"))
    }
}
