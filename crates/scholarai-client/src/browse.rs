//! Interactive terminal browser.
//!
//! Reads one command per line from stdin and prints rendered output to
//! stdout. Exports, AI summaries, citations and Scopus checks run in the
//! background; each record is printed again when its request finishes.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::client::ScholarClient;
use crate::error::QueryError;
use crate::models::{Capabilities, CitationFormat, PaperType, SortMode};
use crate::orchestrator::{SearchOrchestrator, SearchState};
use crate::pagination::PageInfo;
use crate::presentation::{
    EnrichmentRequest, RecordUpdate, ResultsView, SCROLL_TO_TOP, render_capabilities,
    render_paper, render_scopus_update, render_state,
};
use crate::query::{FilterForm, MinCitations};

/// Command reference printed by `help`.
pub const HELP: &str = "\
Commands:
  search <topic>          search from page 1 with the current filters
  filter <key> <value>    set a filter: from, to, citations, oa, sort, type, author
  filters                 show the current filters
  clear                   reset filters (keeps the topic)
  page <n> | next | prev  change page
  retry                   repeat the last search
  more <n>                expand or collapse the abstract of result n
  summary <n>             show or hide the AI summary of result n
  cite <n> [bibtex|apa|both]
  export [dir]            download the results as a spreadsheet
  health                  show backend capabilities
  help | quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the topic and search.
    Search(String),
    /// Set one filter field.
    Filter(String, String),
    /// Print the filter form.
    ShowFilters,
    /// Reset filters.
    Clear,
    /// Jump to a page.
    Page(u32),
    /// Next page.
    Next,
    /// Previous page.
    Prev,
    /// Repeat the last search.
    Retry,
    /// Toggle an abstract.
    More(usize),
    /// Toggle an AI summary.
    Summary(usize),
    /// Fetch citations.
    Cite(usize, Vec<CitationFormat>),
    /// Start an export into a directory.
    Export(Option<PathBuf>),
    /// Show capabilities.
    Health,
    /// Print help.
    Help,
    /// Leave.
    Quit,
}

/// Parse a non-empty input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word.to_ascii_lowercase().as_str() {
        "search" | "s" => {
            if rest.is_empty() {
                return Err(QueryError::EmptyTopic.to_string());
            }
            Command::Search(rest.to_string())
        }
        "filter" | "f" => {
            let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if key.is_empty() {
                return Err("Usage: filter <key> <value>".to_string());
            }
            Command::Filter(key.to_ascii_lowercase(), value.trim().to_string())
        }
        "filters" => Command::ShowFilters,
        "clear" => Command::Clear,
        "page" | "p" => Command::Page(parse_number(rest, "page")?),
        "next" | "n" => Command::Next,
        "prev" => Command::Prev,
        "retry" => Command::Retry,
        "more" | "m" => Command::More(parse_number(rest, "more")?),
        "summary" => Command::Summary(parse_number(rest, "summary")?),
        "cite" | "c" => {
            let (n, format) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let formats = match format.trim() {
                "" | "both" | "all" => CitationFormat::ALL.to_vec(),
                other => vec![other.parse::<CitationFormat>().map_err(|e| e.to_string())?],
            };
            Command::Cite(parse_number(n, "cite")?, formats)
        }
        "export" | "x" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "health" => Command::Health,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };

    Ok(command)
}

fn parse_number<T: std::str::FromStr>(value: &str, command: &str) -> Result<T, String> {
    value.trim().parse().map_err(|_| format!("Usage: {command} <number>"))
}

/// Apply `filter <key> <value>` to a form.
pub fn apply_filter(form: &mut FilterForm, key: &str, value: &str) -> Result<(), QueryError> {
    let year = |v: &str| -> Result<Option<i32>, QueryError> {
        if v.is_empty() || v.eq_ignore_ascii_case("any") {
            return Ok(None);
        }
        v.parse().map(Some).map_err(|_| QueryError::invalid("year", v))
    };

    match key {
        "from" | "start" | "start_year" => form.start_year = year(value)?,
        "to" | "end" | "end_year" => form.end_year = year(value)?,
        "citations" | "min" | "min_citations" => form.min_citations = value.parse::<MinCitations>()?,
        "oa" | "open_access" => {
            form.open_access_only = match value.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" | "1" => true,
                "off" | "false" | "no" | "0" | "" => false,
                _ => return Err(QueryError::invalid("open access", value)),
            }
        }
        "sort" | "sort_by" => form.sort_by = value.parse::<SortMode>()?,
        "type" | "type_filter" => form.type_filter = PaperType::parse_filter(value)?,
        "author" => form.author = value.to_string(),
        _ => return Err(QueryError::invalid("filter", key)),
    }
    Ok(())
}

/// Human-readable summary of the filter form.
#[must_use]
pub fn describe_filters(form: &FilterForm) -> String {
    let year = |y: Option<i32>| y.map_or_else(|| "any".to_string(), |y| y.to_string());
    format!(
        "topic: {}\nyears: {} - {}\nmin citations: {}\nopen access only: {}\nsort: {}\ntype: {}\nauthor: {}",
        if form.topic.is_empty() { "(none)" } else { &form.topic },
        year(form.start_year),
        year(form.end_year),
        form.min_citations,
        if form.open_access_only { "yes" } else { "no" },
        form.sort_by,
        form.type_filter.map_or(PaperType::ANY, PaperType::as_str),
        if form.author.is_empty() { "any" } else { &form.author },
    )
}

/// Finished per-record request, tagged with the results page it belongs to.
#[derive(Debug)]
struct EnrichmentDone {
    generation: u64,
    id: String,
    update: RecordUpdate,
}

/// Interactive session state.
#[derive(Debug)]
pub struct Browser {
    client: Arc<ScholarClient>,
    caps: Capabilities,
    form: FilterForm,
    orchestrator: SearchOrchestrator,
    results: ResultsView,
    export_dir: PathBuf,
    export_tx: mpsc::UnboundedSender<String>,
    export_rx: mpsc::UnboundedReceiver<String>,
    generation: u64,
    enrich_tx: mpsc::UnboundedSender<EnrichmentDone>,
    enrich_rx: mpsc::UnboundedReceiver<EnrichmentDone>,
}

impl Browser {
    /// Create a browser; `caps` comes from the startup health check.
    #[must_use]
    pub fn new(client: Arc<ScholarClient>, caps: Capabilities) -> Self {
        let (export_tx, export_rx) = mpsc::unbounded_channel();
        let (enrich_tx, enrich_rx) = mpsc::unbounded_channel();
        Self {
            orchestrator: SearchOrchestrator::new(Arc::clone(&client)),
            client,
            caps,
            form: FilterForm::default(),
            results: ResultsView::default(),
            export_dir: PathBuf::from("."),
            export_tx,
            export_rx,
            generation: 0,
            enrich_tx,
            enrich_rx,
        }
    }

    /// Directory exports are written to when `export` has no argument.
    #[must_use]
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Apply a filter form prepared elsewhere (e.g. from CLI flags).
    #[must_use]
    pub fn with_form(mut self, form: FilterForm) -> Self {
        self.form = form;
        self
    }

    /// Current filter form.
    #[must_use]
    pub const fn form(&self) -> &FilterForm {
        &self.form
    }

    /// Views for the current page.
    #[must_use]
    pub const fn results(&self) -> &ResultsView {
        &self.results
    }

    /// Current search state.
    #[must_use]
    pub const fn state(&self) -> &SearchState {
        self.orchestrator.state()
    }

    /// Check if an export is running.
    #[must_use]
    pub fn is_export_pending(&self) -> bool {
        self.orchestrator.is_export_pending()
    }

    /// Execute one command. `Break` means the user asked to quit.
    pub async fn handle(&mut self, command: Command) -> ControlFlow<(), String> {
        let output = match command {
            Command::Quit => return ControlFlow::Break(()),
            Command::Help => HELP.to_string(),
            Command::Health => render_capabilities(&self.caps),
            Command::ShowFilters => describe_filters(&self.form),
            Command::Clear => {
                self.form.clear_filters();
                describe_filters(&self.form)
            }
            Command::Filter(key, value) => match apply_filter(&mut self.form, &key, &value) {
                Ok(()) => describe_filters(&self.form),
                Err(e) => e.to_string(),
            },
            Command::Search(topic) => {
                self.form.topic = topic;
                let submitted = self.orchestrator.search(&self.form).await.map(|_| ());
                match submitted {
                    Ok(()) => self.show_results(),
                    Err(e) => e.to_string(),
                }
            }
            Command::Page(page) => self.go_to_page(page).await,
            Command::Next => self.step_page(PageInfo::next).await,
            Command::Prev => self.step_page(PageInfo::prev).await,
            Command::Retry => match self.orchestrator.retry().await {
                Some(_) => self.show_results(),
                None => "Nothing to retry.".to_string(),
            },
            Command::More(n) => match self.results.nth_mut(n) {
                Some(view) => {
                    view.toggle_abstract();
                    self.render_one(n)
                }
                None => no_such_result(n),
            },
            Command::Summary(_) if !self.caps.ai_enabled => {
                "AI summaries are not available.".to_string()
            }
            Command::Summary(n) => match self.results.nth_mut(n) {
                Some(view) => {
                    let id = view.id().to_string();
                    if let Some(request) = view.toggle_summary(&self.caps) {
                        self.spawn_enrichment(id, request);
                    }
                    self.render_one(n)
                }
                None => no_such_result(n),
            },
            Command::Cite(n, formats) => match self.results.nth_mut(n) {
                Some(view) => {
                    let id = view.id().to_string();
                    for request in view.request_citations(&formats) {
                        self.spawn_enrichment(id.clone(), request);
                    }
                    self.render_one(n)
                }
                None => no_such_result(n),
            },
            Command::Export(dir) => self.start_export(dir),
        };

        ControlFlow::Continue(output)
    }

    async fn go_to_page(&mut self, page: u32) -> String {
        let changed = self.orchestrator.go_to_page(page).await.map(|_| ());
        match changed {
            Ok(()) => format!("{SCROLL_TO_TOP}{}", self.show_results()),
            Err(e) => e.to_string(),
        }
    }

    async fn step_page(&mut self, step: fn(&PageInfo) -> Option<u32>) -> String {
        match self.orchestrator.session().page_info().as_ref().and_then(step) {
            Some(page) => self.go_to_page(page).await,
            None => "No more pages in that direction.".to_string(),
        }
    }

    /// Rebuild record views after a search resolves and start Scopus checks.
    fn show_results(&mut self) -> String {
        self.generation += 1;
        match self.orchestrator.state() {
            SearchState::Success(result) => {
                self.results = ResultsView::from_result(result);
                for (id, request) in self.results.request_scopus_all(&self.caps) {
                    self.spawn_enrichment(id, request);
                }
            }
            _ => self.results = ResultsView::default(),
        }

        render_state(
            self.orchestrator.state(),
            &self.results,
            self.orchestrator.session().page_size(),
            &self.caps,
        )
    }

    fn render_one(&self, n: usize) -> String {
        let page = self.orchestrator.session().current_page().unwrap_or(1) as usize;
        let page_size = self.orchestrator.session().page_size() as usize;
        match n.checked_sub(1).and_then(|i| self.results.views().get(i)) {
            Some(view) => render_paper(view, n, (page - 1) * page_size + n, &self.caps),
            None => no_such_result(n),
        }
    }

    fn start_export(&self, dir: Option<PathBuf>) -> String {
        let task = match self.orchestrator.begin_export() {
            Ok(task) => task,
            Err(e) => return e.to_string(),
        };

        let topic = task.query().topic().to_string();
        let started = format!("Exporting \"{topic}\" in the background...");
        let dir = dir.unwrap_or_else(|| self.export_dir.clone());
        let tx = self.export_tx.clone();

        tokio::spawn(async move {
            let message = match task.run().await {
                Ok(file) => {
                    let path = dir.join(&file.filename);
                    match tokio::fs::write(&path, &file.bytes).await {
                        Ok(()) => format!("Saved \"{topic}\" export to {}", path.display()),
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "Could not write export");
                            format!("Could not write {}: {e}", path.display())
                        }
                    }
                }
                Err(e) => e.to_string(),
            };
            // Receiver gone means the browser already exited.
            let _ = tx.send(message);
        });

        started
    }

    /// Wait for the next finished export and return its message.
    pub async fn next_export_message(&mut self) -> Option<String> {
        self.export_rx.recv().await
    }

    fn spawn_enrichment(&self, id: String, request: EnrichmentRequest) {
        let client = Arc::clone(&self.client);
        let tx = self.enrich_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let update = request.run(&client).await;
            // Receiver gone means the browser already exited.
            let _ = tx.send(EnrichmentDone { generation, id, update });
        });
    }

    /// Store a finished request and render the record it changed.
    ///
    /// Results from a page that is no longer shown are dropped.
    fn apply_enrichment(&mut self, done: EnrichmentDone) -> Option<String> {
        if done.generation != self.generation {
            tracing::debug!(id = %done.id, "Dropping enrichment for a replaced page");
            return None;
        }

        let scopus = matches!(done.update, RecordUpdate::Scopus(_));
        if !self.results.apply(&done.id, done.update) {
            return None;
        }

        let position = self.results.position(&done.id)?;
        if scopus {
            let view = self.results.views().get(position - 1)?;
            render_scopus_update(view, position)
        } else {
            Some(self.render_one(position))
        }
    }

    /// Wait for the next per-record request that changes the current page
    /// and return the re-rendered output.
    pub async fn next_enrichment(&mut self) -> Option<String> {
        loop {
            let done = self.enrich_rx.recv().await?;
            if let Some(output) = self.apply_enrichment(done) {
                return Some(output);
            }
        }
    }

    /// Run the read-eval-print loop on stdin/stdout until `quit` or EOF.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        write_block(&mut stdout, &format!("{}\n\n{HELP}", render_capabilities(&self.caps))).await?;
        if self.form.can_submit() {
            let topic = self.form.topic.clone();
            if let ControlFlow::Continue(output) = self.handle(Command::Search(topic)).await {
                write_block(&mut stdout, &output).await?;
            }
        }

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                Some(message) = self.export_rx.recv() => {
                    write_block(&mut stdout, &format!("\n{message}")).await?;
                    continue;
                }
                Some(done) = self.enrich_rx.recv() => {
                    if let Some(output) = self.apply_enrichment(done) {
                        write_block(&mut stdout, &format!("\n{output}")).await?;
                    }
                    continue;
                }
            };

            let Some(line) = line else {
                tracing::debug!("Stdin closed, leaving browser");
                break;
            };

            if line.trim().is_empty() {
                continue;
            }

            let output = match parse_command(&line) {
                Ok(command) => match self.handle(command).await {
                    ControlFlow::Continue(output) => output,
                    ControlFlow::Break(()) => break,
                },
                Err(message) => message,
            };
            write_block(&mut stdout, &output).await?;
        }

        Ok(())
    }
}

fn no_such_result(n: usize) -> String {
    format!("No result {n} on this page.")
}

async fn write_block(stdout: &mut tokio::io::Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
