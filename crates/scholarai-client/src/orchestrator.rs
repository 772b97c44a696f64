//! Search orchestration.
//!
//! [`SearchSession`] is the synchronous state machine
//! (`Idle → Searching → Success | Failed`). Every submission is stamped with a
//! sequence number and only the latest one may resolve the session, so a slow
//! response to an older query can never overwrite a newer one.
//!
//! [`SearchOrchestrator`] drives the session with a [`ScholarClient`] and owns
//! the export guard: at most one export is in flight at a time, independent of
//! search activity.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::ScholarClient;
use crate::error::{ClientResult, ExportError, PageError, QueryError};
use crate::models::{ExportFile, SearchResult};
use crate::pagination::PageInfo;
use crate::query::{FilterForm, SearchQuery};

/// Top-level search state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A request is in flight.
    Searching,
    /// The latest request succeeded.
    Success(SearchResult),
    /// The latest request failed; holds the message to display.
    Failed(String),
}

/// Why a search was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    /// New query from the form.
    NewSearch,
    /// Same query, different page.
    PageChange,
    /// Same query and page again.
    Retry,
}

/// A submitted search awaiting its response.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    seq: u64,
    query: SearchQuery,
    page: u32,
    kind: SubmitKind,
}

impl SearchTicket {
    /// Sequence number; higher is newer.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Query to send.
    #[must_use]
    pub const fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Page to request.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Why it was submitted.
    #[must_use]
    pub const fn kind(&self) -> SubmitKind {
        self.kind
    }

    /// Page changes return the view to the top of the results.
    #[must_use]
    pub fn scrolls_to_top(&self) -> bool {
        self.kind == SubmitKind::PageChange
    }
}

/// Search state machine.
#[derive(Debug)]
pub struct SearchSession {
    state: SearchState,
    current: Option<(SearchQuery, u32)>,
    issued: u64,
    page_size: u32,
    export_pending: Arc<AtomicBool>,
}

impl SearchSession {
    /// Create an idle session requesting `page_size` results per page.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            state: SearchState::Idle,
            current: None,
            issued: 0,
            page_size: page_size.max(1),
            export_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    /// Check if a search is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, SearchState::Searching)
    }

    /// Error message of a failed search.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SearchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Results of a successful search.
    #[must_use]
    pub const fn result(&self) -> Option<&SearchResult> {
        match &self.state {
            SearchState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// Query most recently submitted (kept after failures).
    #[must_use]
    pub fn current_query(&self) -> Option<&SearchQuery> {
        self.current.as_ref().map(|(query, _)| query)
    }

    /// Page most recently requested.
    #[must_use]
    pub fn current_page(&self) -> Option<u32> {
        self.current.as_ref().map(|(_, page)| *page)
    }

    /// Results per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Pagination metadata, available only after a successful search.
    #[must_use]
    pub fn page_info(&self) -> Option<PageInfo> {
        self.result().map(|result| result.page_info(self.page_size))
    }

    /// Submit a new query at page 1.
    pub fn submit(&mut self, query: SearchQuery) -> SearchTicket {
        self.issue(query, 1, SubmitKind::NewSearch)
    }

    /// Re-submit the current query at `page`.
    ///
    /// Only allowed after a successful search, with `1 <= page <= total_pages`.
    pub fn change_page(&mut self, page: u32) -> Result<SearchTicket, PageError> {
        let info = self.page_info().ok_or(PageError::NoResults)?;
        if !info.contains(page) {
            return Err(PageError::OutOfRange { page, total: info.total_pages });
        }
        let query = self.current_query().cloned().ok_or(PageError::NoResults)?;
        Ok(self.issue(query, page, SubmitKind::PageChange))
    }

    /// Re-submit the current query at the current page.
    pub fn retry(&mut self) -> Option<SearchTicket> {
        let (query, page) = self.current.clone()?;
        Some(self.issue(query, page, SubmitKind::Retry))
    }

    fn issue(&mut self, query: SearchQuery, page: u32, kind: SubmitKind) -> SearchTicket {
        self.issued += 1;
        self.current = Some((query.clone(), page));
        self.state = SearchState::Searching;

        tracing::debug!(seq = self.issued, topic = query.topic(), page, ?kind, "Search submitted");

        SearchTicket { seq: self.issued, query, page, kind }
    }

    /// Apply a response. Returns `false` if the ticket is stale and was ignored.
    pub fn resolve(&mut self, ticket: &SearchTicket, outcome: ClientResult<SearchResult>) -> bool {
        if ticket.seq != self.issued {
            tracing::debug!(seq = ticket.seq, latest = self.issued, "Discarding stale search response");
            return false;
        }

        self.state = match outcome {
            Ok(result) => SearchState::Success(result),
            Err(e) => {
                tracing::warn!(topic = ticket.query.topic(), error = %e, "Search failed");
                SearchState::Failed(e.to_user_message())
            }
        };
        true
    }

    /// Check if an export is in flight.
    #[must_use]
    pub fn is_export_pending(&self) -> bool {
        self.export_pending.load(Ordering::Acquire)
    }

    /// Claim the export slot for the current query.
    ///
    /// The slot is released when the returned guard drops.
    pub fn begin_export(&self) -> Result<(SearchQuery, ExportGuard), ExportError> {
        let query = self.current_query().cloned().ok_or(ExportError::NoTopic)?;

        self.export_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::InFlight)?;

        Ok((query, ExportGuard { flag: Arc::clone(&self.export_pending) }))
    }
}

/// Holds the export slot; releases it on drop.
#[derive(Debug)]
pub struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives a [`SearchSession`] against the backend.
#[derive(Debug)]
pub struct SearchOrchestrator {
    client: Arc<ScholarClient>,
    session: SearchSession,
}

impl SearchOrchestrator {
    /// Create an orchestrator using the client's page size.
    #[must_use]
    pub fn new(client: Arc<ScholarClient>) -> Self {
        let session = SearchSession::new(client.page_size());
        Self { client, session }
    }

    /// Underlying session.
    #[must_use]
    pub const fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SearchState {
        self.session.state()
    }

    /// Validate the form and search from page 1.
    ///
    /// A blank topic fails validation and nothing is sent.
    pub async fn search(&mut self, form: &FilterForm) -> Result<&SearchState, QueryError> {
        let query = form.build()?;
        let ticket = self.session.submit(query);
        Ok(self.run(ticket).await)
    }

    /// Fetch another page of the current results.
    pub async fn go_to_page(&mut self, page: u32) -> Result<&SearchState, PageError> {
        let ticket = self.session.change_page(page)?;
        Ok(self.run(ticket).await)
    }

    /// Repeat the last request, if there was one.
    pub async fn retry(&mut self) -> Option<&SearchState> {
        let ticket = self.session.retry()?;
        Some(self.run(ticket).await)
    }

    /// Send a ticket and resolve the session with its outcome.
    pub async fn run(&mut self, ticket: SearchTicket) -> &SearchState {
        let outcome = self.client.search(ticket.query(), ticket.page()).await;
        self.session.resolve(&ticket, outcome);
        self.session.state()
    }

    /// Start an export of the current query.
    ///
    /// Fails immediately with [`ExportError::InFlight`] while another export
    /// is running. Search state is never touched.
    pub fn begin_export(&self) -> Result<ExportTask, ExportError> {
        let (query, guard) = self.session.begin_export()?;
        Ok(ExportTask { client: Arc::clone(&self.client), query, _guard: guard })
    }

    /// Check if an export is in flight.
    #[must_use]
    pub fn is_export_pending(&self) -> bool {
        self.session.is_export_pending()
    }
}

/// A claimed export; the slot frees when the task finishes or is dropped.
#[derive(Debug)]
pub struct ExportTask {
    client: Arc<ScholarClient>,
    query: SearchQuery,
    _guard: ExportGuard,
}

impl ExportTask {
    /// Query being exported.
    #[must_use]
    pub const fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Download the spreadsheet.
    pub async fn run(self) -> Result<ExportFile, ExportError> {
        self.client.export(&self.query).await.map_err(|e| {
            tracing::warn!(topic = self.query.topic(), error = %e, "Export failed");
            ExportError::Failed(e)
        })
    }
}
