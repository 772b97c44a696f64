//! Markdown-flavoured text rendering for the terminal.

use super::record::{Enrichment, PaperView, ResultsView, ScopusSlot};
use crate::models::{Capabilities, CitationFormat, SearchResult, TrendingResponse};
use crate::orchestrator::SearchState;
use crate::pagination::PageInfo;

/// Clears the terminal and moves the cursor home; emitted when a page change starts.
pub const SCROLL_TO_TOP: &str = "\x1b[H\x1b[2J";

/// Render whatever the search state currently shows.
#[must_use]
pub fn render_state(
    state: &SearchState,
    views: &ResultsView,
    page_size: u32,
    caps: &Capabilities,
) -> String {
    match state {
        SearchState::Idle => "Enter a research topic to start searching.".to_string(),
        SearchState::Searching => "Searching...".to_string(),
        SearchState::Failed(message) => format!("Error: {message}"),
        SearchState::Success(result) => {
            render_results(result, views, result.page_info(page_size), caps)
        }
    }
}

/// Render a page of results with header and pagination footer.
#[must_use]
pub fn render_results(
    result: &SearchResult,
    views: &ResultsView,
    info: PageInfo,
    caps: &Capabilities,
) -> String {
    if result.is_empty() {
        return format!(
            "No papers found for \"{}\" ({}). Try broadening your filters.",
            result.topic, result.years_filter
        );
    }

    let mut output = format!(
        "# {} ({})\n\nFound {} papers across {} journals\n\n",
        result.topic, result.years_filter, result.total_found, result.total_journals
    );

    let per_page = result.page_size(views.len() as u32) as usize;
    let offset = info.page.saturating_sub(1) as usize * per_page;
    for (i, view) in views.views().iter().enumerate() {
        output.push_str(&render_paper(view, i + 1, offset + i + 1, caps));
        output.push_str("\n---\n\n");
    }

    output.push_str(&render_pagination(info));
    output
}

/// Render one record. `position` is the page-local handle used by commands;
/// `rank` is the overall result number.
#[must_use]
pub fn render_paper(view: &PaperView, position: usize, rank: usize, caps: &Capabilities) -> String {
    let paper = view.paper();
    let mut output = format!("## [{position}] {rank}. {}\n\n", paper.title_or_default());

    let authors = paper.author_names();
    if !authors.is_empty() {
        output.push_str(&format!("**Authors**: {authors}\n\n"));
    }

    let mut meta = Vec::new();
    if let Some(year) = paper.year {
        meta.push(format!("**Year**: {year}"));
    }
    meta.push(format!("**Citations**: {}", paper.citations));
    if let Some(kind) = paper.paper_type() {
        meta.push(format!("**Type**: {kind}"));
    }
    if paper.open_access {
        meta.push("**Open Access**".to_string());
    }
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    output.push_str(&format!("**Journal**: {} ({})\n\n", paper.journal, paper.publisher));

    let mut links = Vec::new();
    if let Some(doi) = paper.doi() {
        links.push(format!("[DOI]({doi})"));
    }
    if let Some(oa) = paper.oa_url() {
        links.push(format!("[Full text]({oa})"));
    }
    if let Some(scopus) = paper.scopus_search_url.as_deref() {
        links.push(format!("[Scopus search]({scopus})"));
    }
    if !links.is_empty() {
        output.push_str(&format!("**Links**: {}\n\n", links.join(" | ")));
    }

    if !paper.concepts.is_empty() {
        let concepts: Vec<_> =
            paper.concepts.iter().map(|c| format!("{} ({:.2})", c.name, c.score)).collect();
        output.push_str(&format!("**Concepts**: {}\n\n", concepts.join(", ")));
    }

    if let Some(line) = scopus_line(view.scopus()) {
        output.push_str(&line);
    }

    output.push_str(view.displayed_abstract());
    output.push_str("\n\n");
    if view.has_read_more() {
        let label = if view.is_abstract_expanded() { "show less" } else { "read more" };
        output.push_str(&format!("_({label}: `more {position}`)_\n\n"));
    }

    if caps.ai_enabled && view.is_summary_visible() {
        output.push_str(&format!("**AI Summary** ({}):\n", caps.provider_name()));
        output.push_str(&enrichment_text(view.summary(), "Generating summary..."));
        output.push_str("\n\n");
    }

    for format in CitationFormat::ALL {
        let slot = view.citation(format);
        if *slot != Enrichment::NotRequested {
            output.push_str(&format!("**{}**:\n", format.label()));
            output.push_str(&enrichment_text(slot, "Generating citation..."));
            output.push_str("\n\n");
        }
    }

    output
}

/// One-line notice for a finished Scopus check, e.g.
/// `[2] Attention: **Scopus**: Indexed`. `None` while nothing is known.
#[must_use]
pub fn render_scopus_update(view: &PaperView, position: usize) -> Option<String> {
    let line = scopus_line(view.scopus())?;
    Some(format!("[{position}] {}: {}", view.paper().title_or_default(), line.trim_end()))
}

fn scopus_line(slot: &ScopusSlot) -> Option<String> {
    match slot {
        ScopusSlot::Unchecked | ScopusSlot::Skipped => None,
        ScopusSlot::Checking => Some("**Scopus**: checking...\n\n".to_string()),
        ScopusSlot::Checked(status) if status.indexed => Some(match &status.scopus_url {
            Some(url) => format!("**Scopus**: Indexed ([record]({url}))\n\n"),
            None => "**Scopus**: Indexed\n\n".to_string(),
        }),
        ScopusSlot::Checked(_) => Some("**Scopus**: Not indexed\n\n".to_string()),
    }
}

fn enrichment_text(slot: &Enrichment<String>, loading: &str) -> String {
    match slot {
        Enrichment::NotRequested => String::new(),
        Enrichment::Loading => loading.to_string(),
        Enrichment::Ready(text) => text.trim_end().to_string(),
        Enrichment::Failed(message) => format!("Error: {message}"),
    }
}

/// Pagination footer: prev/next hints, the page window with the current
/// page bracketed, and the page indicator.
#[must_use]
pub fn render_pagination(info: PageInfo) -> String {
    let mut parts = Vec::new();
    if info.prev().is_some() {
        parts.push("« prev".to_string());
    }
    for page in info.window() {
        if page == info.page {
            parts.push(format!("[{page}]"));
        } else {
            parts.push(page.to_string());
        }
    }
    if info.next().is_some() {
        parts.push("next »".to_string());
    }

    format!("{}\n{info}\n", parts.join(" "))
}

/// One line describing session capabilities.
#[must_use]
pub fn render_capabilities(caps: &Capabilities) -> String {
    let ai = if caps.ai_enabled {
        format!("AI summaries: on ({})", caps.provider_name())
    } else {
        "AI summaries: off".to_string()
    };
    let scopus = if caps.scopus_enabled { "Scopus: on" } else { "Scopus: off" };
    format!("{ai} | {scopus}")
}

/// Publication counts per year as a small bar chart.
#[must_use]
pub fn render_trending(trending: &TrendingResponse) -> String {
    if trending.data.is_empty() {
        return format!("No trend data for \"{}\".", trending.field);
    }

    let max = trending.data.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    let mut output = format!("# Trending: {}\n\n", trending.field);
    for bucket in &trending.data {
        let label = bucket.key_display_name.as_deref().unwrap_or(&bucket.key);
        let width = ((bucket.count as f64 / max as f64) * 40.0).round() as usize;
        output.push_str(&format!("{label:>6} {:<40} {}\n", "#".repeat(width), bucket.count));
    }
    output
}
