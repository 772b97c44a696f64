//! Per-record enrichment and rendering tests.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scholarai_client::client::ScholarClient;
use scholarai_client::config::Config;
use scholarai_client::models::{Capabilities, CitationFormat, Paper, SearchResult};
use scholarai_client::presentation::{
    CITATION_FAILURE, Enrichment, EnrichmentRequest, PaperView, ResultsView, ScopusSlot,
    render_paper, render_results,
};

fn client_for(server: &MockServer) -> ScholarClient {
    ScholarClient::new(Config::for_testing(&server.uri())).unwrap()
}

fn paper(id: &str, doi: Option<&str>) -> Paper {
    Paper {
        id: id.to_string(),
        title: format!("Paper {id}"),
        year: Some(2021),
        journal: "Nature".to_string(),
        publisher: "Springer".to_string(),
        citations: 7,
        doi: doi.map(str::to_string),
        abstract_text: "Short intro. A much longer explanation follows here.".to_string(),
        summary: "Short intro.".to_string(),
        ..Default::default()
    }
}

/// Run requests to completion and store their outcomes on the view.
async fn complete(
    view: &mut PaperView,
    client: &ScholarClient,
    requests: impl IntoIterator<Item = EnrichmentRequest>,
) {
    for request in requests {
        let update = request.run(client).await;
        view.apply(update);
    }
}

fn ai_caps() -> Capabilities {
    Capabilities { ai_enabled: true, ai_provider: Some("ollama".to_string()), scopus_enabled: true }
}

// =============================================================================
// AI summaries
// =============================================================================

#[tokio::test]
async fn test_summary_fetched_once_and_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summarize"))
        .and(body_partial_json(json!({"title": "Paper W1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"summary": "Key finding.", "provider": "ollama"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let caps = ai_caps();
    let mut view = PaperView::new(paper("W1", None));

    let request = view.toggle_summary(&caps);
    assert!(view.is_summary_visible());
    assert!(view.summary().is_loading());
    complete(&mut view, &client, request).await;
    assert_eq!(view.summary(), &Enrichment::Ready("Key finding.".to_string()));

    assert!(view.toggle_summary(&caps).is_none());
    assert!(!view.is_summary_visible());

    assert!(view.toggle_summary(&caps).is_none());
    assert!(view.is_summary_visible());
    assert_eq!(view.summary().ready().map(String::as_str), Some("Key finding."));
}

#[tokio::test]
async fn test_summary_failure_is_inline() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "No AI provider available"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = PaperView::new(paper("W1", None));
    let request = view.toggle_summary(&ai_caps());
    complete(&mut view, &client, request).await;

    assert_eq!(view.summary(), &Enrichment::Failed("No AI provider available".to_string()));
}

#[tokio::test]
async fn test_summary_disabled_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let mut view = PaperView::new(paper("W1", None));
    assert!(view.toggle_summary(&Capabilities::default()).is_none());
    assert!(!view.is_summary_visible());
    assert_eq!(view.summary(), &Enrichment::NotRequested);
}

// =============================================================================
// Citations
// =============================================================================

#[tokio::test]
async fn test_citation_formats_are_independent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cite"))
        .and(body_partial_json(json!({"format": "bibtex"})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cite"))
        .and(body_partial_json(json!({"format": "apa"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"citation": "Doe, J. (2021). Paper W1."})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = PaperView::new(paper("W1", None));
    let requests = view.request_citations(&CitationFormat::ALL);
    assert_eq!(requests.len(), 2);
    complete(&mut view, &client, requests).await;

    assert_eq!(view.citation(CitationFormat::Bibtex), &Enrichment::Failed(CITATION_FAILURE.to_string()));
    assert_eq!(
        view.citation(CitationFormat::Apa),
        &Enrichment::Ready("Doe, J. (2021). Paper W1.".to_string())
    );
}

// =============================================================================
// Scopus
// =============================================================================

#[tokio::test]
async fn test_scopus_checks_only_records_with_doi() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopus/check"))
        .and(query_param("doi", "https://doi.org/10.1/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexed": true, "scopus_url": "https://www.scopus.com/record/1", "scopus_id": "1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = SearchResult {
        results: vec![paper("W1", Some("https://doi.org/10.1/a")), paper("W2", None), paper("W3", Some(""))],
        ..Default::default()
    };
    let mut views = ResultsView::from_result(&result);
    views.check_scopus_all(&client, &ai_caps()).await;

    assert!(matches!(views.get("W1").unwrap().scopus(), ScopusSlot::Checked(s) if s.indexed));
    assert_eq!(views.get("W2").unwrap().scopus(), &ScopusSlot::Skipped);
    assert_eq!(views.get("W3").unwrap().scopus(), &ScopusSlot::Skipped);
}

#[tokio::test]
async fn test_scopus_disabled_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopus/check"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = PaperView::new(paper("W1", Some("https://doi.org/10.1/a")));
    view.check_scopus(&client, &Capabilities::default()).await;
    assert_eq!(view.scopus(), &ScopusSlot::Skipped);
}

#[tokio::test]
async fn test_scopus_failure_renders_not_indexed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopus/check"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let caps = ai_caps();
    let mut view = PaperView::new(paper("W1", Some("https://doi.org/10.1/a")));
    view.check_scopus(&client, &caps).await;

    let text = render_paper(&view, 1, 1, &caps);
    assert!(text.contains("**Scopus**: Not indexed"));
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_render_collapsed_then_expanded() {
    let caps = Capabilities::default();
    let mut view = PaperView::new(paper("W1", Some("https://doi.org/10.1/a")));

    let collapsed = render_paper(&view, 2, 12, &caps);
    assert!(collapsed.starts_with("## [2] 12. Paper W1"));
    assert!(collapsed.contains("Short intro.\n"));
    assert!(!collapsed.contains("much longer"));
    assert!(collapsed.contains("read more: `more 2`"));
    assert!(collapsed.contains("[DOI](https://doi.org/10.1/a)"));
    assert!(collapsed.contains("**Journal**: Nature (Springer)"));

    view.toggle_abstract();
    let expanded = render_paper(&view, 2, 12, &caps);
    assert!(expanded.contains("much longer"));
    assert!(expanded.contains("show less"));
}

#[test]
fn test_render_results_page() {
    let result = SearchResult {
        topic: "machine learning".to_string(),
        years_filter: "2020-2025".to_string(),
        total_found: 47,
        total_journals: 2,
        page: 2,
        per_page: Some(10),
        results: vec![paper("W1", None), paper("W2", None)],
    };
    let views = ResultsView::from_result(&result);
    let text = render_results(&result, &views, result.page_info(10), &Capabilities::default());

    assert!(text.starts_with("# machine learning (2020-2025)"));
    assert!(text.contains("Found 47 papers across 2 journals"));
    assert!(text.contains("## [1] 11. Paper W1"));
    assert!(text.contains("## [2] 12. Paper W2"));
    assert!(text.ends_with("« prev 1 [2] 3 4 5 next »\nPage 2 of 5\n"));
}

#[test]
fn test_render_empty_results() {
    let result = SearchResult { topic: "zzzz".to_string(), years_filter: "All years".to_string(), ..Default::default() };
    let text = render_results(&result, &ResultsView::default(), result.page_info(10), &Capabilities::default());
    assert!(text.starts_with("No papers found"));
}
