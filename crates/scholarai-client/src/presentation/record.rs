//! Per-record view state with lazily loaded enrichments.
//!
//! Each [`PaperView`] owns its summary, citation and Scopus slots; the
//! [`ResultsView`] owns the views for one page. A failure in one slot never
//! affects another slot or another record.

use futures::future::join_all;

use crate::client::ScholarClient;
use crate::models::{Capabilities, CitationFormat, Paper, ScopusStatus, SearchResult};

/// Placeholder stored when a citation request fails.
pub const CITATION_FAILURE: &str = "Failed to generate citation";

/// Lifecycle of one lazily fetched value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Enrichment<T> {
    /// Never requested.
    #[default]
    NotRequested,
    /// Request in flight.
    Loading,
    /// Loaded value.
    Ready(T),
    /// Request failed; holds the inline message.
    Failed(String),
}

impl<T> Enrichment<T> {
    /// Loaded value, if any.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Check if a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Nothing loaded yet, or the last attempt failed.
    #[must_use]
    pub const fn needs_fetch(&self) -> bool {
        matches!(self, Self::NotRequested | Self::Failed(_))
    }
}

/// Scopus indexing status of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScopusSlot {
    /// Not checked yet.
    #[default]
    Unchecked,
    /// Check disabled or the record has no DOI.
    Skipped,
    /// Check in flight.
    Checking,
    /// Result (failures already collapsed to "not indexed").
    Checked(ScopusStatus),
}

/// View state of one search result.
#[derive(Debug, Clone)]
pub struct PaperView {
    paper: Paper,
    abstract_expanded: bool,
    summary_visible: bool,
    summary: Enrichment<String>,
    bibtex: Enrichment<String>,
    apa: Enrichment<String>,
    scopus: ScopusSlot,
}

impl PaperView {
    /// Create a collapsed view with nothing loaded.
    #[must_use]
    pub fn new(paper: Paper) -> Self {
        Self {
            paper,
            abstract_expanded: false,
            summary_visible: false,
            summary: Enrichment::NotRequested,
            bibtex: Enrichment::NotRequested,
            apa: Enrichment::NotRequested,
            scopus: ScopusSlot::Unchecked,
        }
    }

    /// The record.
    #[must_use]
    pub const fn paper(&self) -> &Paper {
        &self.paper
    }

    /// Record ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.paper.id
    }

    /// Whether a "read more" control is offered.
    #[must_use]
    pub fn has_read_more(&self) -> bool {
        self.paper.has_more_abstract()
    }

    /// Whether the full abstract is shown.
    #[must_use]
    pub const fn is_abstract_expanded(&self) -> bool {
        self.abstract_expanded
    }

    /// Expand or collapse the abstract. Returns the new expanded state.
    ///
    /// Records without more abstract to show stay collapsed.
    pub fn toggle_abstract(&mut self) -> bool {
        self.abstract_expanded = self.has_read_more() && !self.abstract_expanded;
        self.abstract_expanded
    }

    /// Text for the abstract area: the summary while collapsed.
    #[must_use]
    pub fn displayed_abstract(&self) -> &str {
        if self.abstract_expanded { &self.paper.abstract_text } else { &self.paper.summary }
    }

    /// Whether the AI summary panel is open.
    #[must_use]
    pub const fn is_summary_visible(&self) -> bool {
        self.summary_visible
    }

    /// AI summary slot.
    #[must_use]
    pub const fn summary(&self) -> &Enrichment<String> {
        &self.summary
    }

    /// Open or close the AI summary panel.
    ///
    /// Does nothing when AI is disabled. Opening a panel with nothing loaded
    /// marks the slot as loading and returns the request to run.
    pub fn toggle_summary(&mut self, caps: &Capabilities) -> Option<EnrichmentRequest> {
        if !caps.ai_enabled {
            return None;
        }

        if self.summary_visible {
            self.summary_visible = false;
            return None;
        }

        self.summary_visible = true;
        if !self.summary.needs_fetch() {
            return None;
        }

        self.summary = Enrichment::Loading;
        Some(EnrichmentRequest::Summary {
            title: self.paper.title.clone(),
            abstract_text: self.paper.abstract_text.clone(),
        })
    }

    /// Citation slot for a format.
    #[must_use]
    pub const fn citation(&self, format: CitationFormat) -> &Enrichment<String> {
        match format {
            CitationFormat::Bibtex => &self.bibtex,
            CitationFormat::Apa => &self.apa,
        }
    }

    fn citation_mut(&mut self, format: CitationFormat) -> &mut Enrichment<String> {
        match format {
            CitationFormat::Bibtex => &mut self.bibtex,
            CitationFormat::Apa => &mut self.apa,
        }
    }

    /// Mark the given citation formats as loading and return one request
    /// per format. Formats already in flight are skipped.
    pub fn request_citations(&mut self, formats: &[CitationFormat]) -> Vec<EnrichmentRequest> {
        let mut requests = Vec::with_capacity(formats.len());
        for &format in formats {
            if self.citation(format).is_loading() {
                continue;
            }
            *self.citation_mut(format) = Enrichment::Loading;
            requests.push(EnrichmentRequest::Citation { paper: self.paper.clone(), format });
        }
        requests
    }

    /// Scopus slot.
    #[must_use]
    pub const fn scopus(&self) -> &ScopusSlot {
        &self.scopus
    }

    /// Whether the automatic Scopus check should still run.
    #[must_use]
    pub fn needs_scopus_check(&self, caps: &Capabilities) -> bool {
        caps.scopus_enabled && self.paper.doi().is_some() && self.scopus == ScopusSlot::Unchecked
    }

    /// Start the one automatic Scopus check.
    ///
    /// Records without a DOI, or with Scopus disabled, are marked skipped.
    pub fn request_scopus(&mut self, caps: &Capabilities) -> Option<EnrichmentRequest> {
        if self.needs_scopus_check(caps) {
            let doi = self.paper.doi()?.to_string();
            self.scopus = ScopusSlot::Checking;
            return Some(EnrichmentRequest::Scopus { doi });
        }
        if self.scopus == ScopusSlot::Unchecked {
            self.scopus = ScopusSlot::Skipped;
        }
        None
    }

    /// Store a finished request in its slot.
    pub fn apply(&mut self, update: RecordUpdate) {
        match update {
            RecordUpdate::Summary(slot) => self.summary = slot,
            RecordUpdate::Citation(format, slot) => *self.citation_mut(format) = slot,
            RecordUpdate::Scopus(status) => self.scopus = ScopusSlot::Checked(status),
        }
    }

    /// Run the Scopus check in place.
    pub async fn check_scopus(&mut self, client: &ScholarClient, caps: &Capabilities) {
        if let Some(request) = self.request_scopus(caps) {
            let update = request.run(client).await;
            self.apply(update);
        }
    }
}

/// Backend call started by a [`PaperView`]; owns everything it needs so it
/// can run on another task.
#[derive(Debug, Clone)]
pub enum EnrichmentRequest {
    /// `POST /summarize`.
    Summary { title: String, abstract_text: String },
    /// `POST /cite` for one format.
    Citation { paper: Paper, format: CitationFormat },
    /// `GET /scopus/check`.
    Scopus { doi: String },
}

impl EnrichmentRequest {
    /// Call the backend and collapse the outcome into a slot update.
    pub async fn run(self, client: &ScholarClient) -> RecordUpdate {
        match self {
            Self::Summary { title, abstract_text } => {
                RecordUpdate::Summary(match client.summarize(&title, &abstract_text).await {
                    Ok(response) => Enrichment::Ready(response.summary),
                    Err(e) => {
                        tracing::debug!(%title, error = %e, "Summary failed");
                        Enrichment::Failed(e.to_user_message())
                    }
                })
            }
            Self::Citation { paper, format } => {
                RecordUpdate::Citation(format, match client.cite(&paper, format).await {
                    Ok(citation) => Enrichment::Ready(citation),
                    Err(e) => {
                        tracing::debug!(id = %paper.id, %format, error = %e, "Citation failed");
                        Enrichment::Failed(CITATION_FAILURE.to_string())
                    }
                })
            }
            Self::Scopus { doi } => RecordUpdate::Scopus(client.scopus_check(&doi).await),
        }
    }
}

/// Finished enrichment for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    /// AI summary slot.
    Summary(Enrichment<String>),
    /// One citation slot.
    Citation(CitationFormat, Enrichment<String>),
    /// Scopus status (failures already collapsed to "not indexed").
    Scopus(ScopusStatus),
}

/// Views for one page of results, in backend order.
#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    views: Vec<PaperView>,
}

impl ResultsView {
    /// Fresh views for a result page.
    #[must_use]
    pub fn from_result(result: &SearchResult) -> Self {
        Self { views: result.results.iter().cloned().map(PaperView::new).collect() }
    }

    /// All views.
    #[must_use]
    pub fn views(&self) -> &[PaperView] {
        &self.views
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Check if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// View by record ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PaperView> {
        self.views.iter().find(|v| v.id() == id)
    }

    /// Mutable view by record ID.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut PaperView> {
        self.views.iter_mut().find(|v| v.id() == id)
    }

    /// 1-based position of a record on the page.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.views.iter().position(|v| v.id() == id).map(|i| i + 1)
    }

    /// Mutable view by 1-based position on the page.
    pub fn nth_mut(&mut self, position: usize) -> Option<&mut PaperView> {
        position.checked_sub(1).and_then(|i| self.views.get_mut(i))
    }

    /// Apply a finished request to the record with this ID.
    ///
    /// Returns `false` when the record is no longer on the page.
    pub fn apply(&mut self, id: &str, update: RecordUpdate) -> bool {
        match self.get_mut(id) {
            Some(view) => {
                view.apply(update);
                true
            }
            None => false,
        }
    }

    /// Start the automatic Scopus check for every eligible record.
    pub fn request_scopus_all(&mut self, caps: &Capabilities) -> Vec<(String, EnrichmentRequest)> {
        self.views
            .iter_mut()
            .filter_map(|view| view.request_scopus(caps).map(|req| (view.id().to_string(), req)))
            .collect()
    }

    /// Run the automatic Scopus check for every eligible record concurrently.
    pub async fn check_scopus_all(&mut self, client: &ScholarClient, caps: &Capabilities) {
        join_all(self.views.iter_mut().map(|view| view.check_scopus(client, caps))).await;
    }
}
