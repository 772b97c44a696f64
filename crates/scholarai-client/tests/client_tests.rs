//! Mock-based client tests using wiremock.
//!
//! These tests verify request shapes and error handling against a mocked
//! ScholarAI backend.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scholarai_client::client::ScholarClient;
use scholarai_client::config::Config;
use scholarai_client::error::{ClientError, NETWORK_FAILURE_MESSAGE};
use scholarai_client::models::{CitationFormat, Paper, PaperType, ScopusStatus, SortMode};
use scholarai_client::query::{FilterForm, MinCitations, SearchQuery};

fn client_for(server: &MockServer) -> ScholarClient {
    ScholarClient::new(Config::for_testing(&server.uri())).unwrap()
}

fn sample_paper_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": format!("https://openalex.org/{id}"),
        "title": title,
        "year": 2022,
        "authors": [{"name": "Ada Lovelace", "id": "A1", "orcid": null}],
        "journal": "Journal of Tests",
        "publisher": "Test Press",
        "citations": 42,
        "open_access": true,
        "oa_url": "https://example.org/oa.pdf",
        "doi": format!("https://doi.org/10.1234/{id}"),
        "abstract": "First sentence. Second sentence.",
        "summary": "First sentence.",
        "concepts": [{"name": "Machine learning", "score": 0.91}],
        "type": "article",
        "score": 12.5,
        "scopus_search_url": "https://www.scopus.com/results/results.uri?src=s"
    })
}

fn sample_search_json(total_found: u64, papers: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "topic": "machine learning",
        "years_filter": "2020-2025",
        "total_found": total_found,
        "total_journals": 1,
        "page": 1,
        "per_page": 10,
        "results": papers
    })
}

fn sample_paper() -> Paper {
    serde_json::from_value(sample_paper_json("W1", "Attention Is All You Need")).unwrap()
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_sends_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("topic", "machine learning"))
        .and(query_param("start_year", "2020"))
        .and(query_param("open_access_only", "true"))
        .and(query_param("min_citations", "100"))
        .and(query_param("sort_by", "citations"))
        .and(query_param("type_filter", "review"))
        .and(query_param("author", "Hinton"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(query_param_is_missing("end_year"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_search_json(
            47,
            vec![sample_paper_json("W1", "Deep Learning")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut form = FilterForm::new("machine learning");
    form.start_year = Some(2020);
    form.open_access_only = true;
    form.min_citations = MinCitations::AtLeast(100);
    form.sort_by = SortMode::Citations;
    form.type_filter = Some(PaperType::Review);
    form.author = "  Hinton ".to_string();
    let query = form.build_for_year(2025).unwrap();

    let result = client_for(&server).search(&query, 2).await.unwrap();
    assert_eq!(result.total_found, 47);
    assert_eq!(result.results.len(), 1);

    let paper = &result.results[0];
    assert_eq!(paper.doi(), Some("https://doi.org/10.1234/W1"));
    assert_eq!(paper.paper_type(), Some("article"));
    assert_eq!(paper.author_names(), "Ada Lovelace");
    assert!(paper.has_more_abstract());
}

#[tokio::test]
async fn test_search_any_citations_omits_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param_is_missing("min_citations"))
        .and(query_param_is_missing("open_access_only"))
        .and(query_param_is_missing("type_filter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_search_json(0, vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery::new("protein folding").unwrap();
    let result = client_for(&server).search(&query, 1).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_search_error_uses_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(502).set_body_json(json!({"detail": "Failed to fetch from OpenAlex"})),
        )
        .mount(&server)
        .await;

    let query = SearchQuery::new("ml").unwrap();
    let err = client_for(&server).search(&query, 1).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_user_message(), "Failed to fetch from OpenAlex");
}

#[tokio::test]
async fn test_search_error_without_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let query = SearchQuery::new("ml").unwrap();
    let err = client_for(&server).search(&query, 1).await.unwrap_err();
    assert_eq!(err.to_user_message(), "Request failed with status 500");
}

#[tokio::test]
async fn test_validation_error_list_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["query", "limit"], "msg": "ensure this value is less than or equal to 50"}]
        })))
        .mount(&server)
        .await;

    let query = SearchQuery::new("ml").unwrap();
    let err = client_for(&server).search(&query, 1).await.unwrap_err();
    assert_eq!(err.to_user_message(), "Request failed with status 422");
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let query = SearchQuery::new("ml").unwrap();
    let err = client_for(&server).search(&query, 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let client = ScholarClient::new(Config::for_testing("http://127.0.0.1:1")).unwrap();
    let query = SearchQuery::new("ml").unwrap();

    let err = client.search(&query, 1).await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.to_user_message(), NETWORK_FAILURE_MESSAGE);
}

// =============================================================================
// Summaries and citations
// =============================================================================

#[tokio::test]
async fn test_summarize() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summarize"))
        .and(body_partial_json(json!({"title": "T", "abstract": "A long abstract."})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"summary": "It is about A.", "provider": "ollama"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).summarize("T", "A long abstract.").await.unwrap();
    assert_eq!(response.summary, "It is about A.");
    assert_eq!(response.provider.as_deref(), Some("ollama"));
}

#[tokio::test]
async fn test_summarize_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"detail": "No AI provider available"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).summarize("T", "A").await.unwrap_err();
    assert_eq!(err.to_user_message(), "No AI provider available");
}

#[tokio::test]
async fn test_cite_sends_paper_and_format() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cite"))
        .and(body_partial_json(json!({
            "format": "apa",
            "paper": {"title": "Attention Is All You Need", "type": "article"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"citation": "Lovelace, A. (2022)."})))
        .expect(1)
        .mount(&server)
        .await;

    let citation = client_for(&server).cite(&sample_paper(), CitationFormat::Apa).await.unwrap();
    assert_eq!(citation, "Lovelace, A. (2022).");
}

#[tokio::test]
async fn test_cite_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cite/batch"))
        .and(body_partial_json(json!({"format": "bibtex"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"citations": "@article{a}\n\n@article{b}"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let papers = vec![sample_paper(), sample_paper()];
    let citations = client_for(&server).cite_batch(&papers, CitationFormat::Bibtex).await.unwrap();
    assert!(citations.contains("@article{b}"));
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_uses_disposition_filename() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/export"))
        .and(query_param("topic", "deep learning"))
        .and(query_param_is_missing("sort_by"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=research_deep_learning_2020_2025.xlsx")
                .set_body_bytes(b"PK\x03\x04xlsx".to_vec()),
        )
        .mount(&server)
        .await;

    let query = SearchQuery::new("deep learning").unwrap();
    let file = client_for(&server).export(&query).await.unwrap();
    assert_eq!(file.filename, "research_deep_learning_2020_2025.xlsx");
    assert_eq!(file.bytes, b"PK\x03\x04xlsx");
}

#[tokio::test]
async fn test_export_filename_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"xlsx".to_vec()))
        .mount(&server)
        .await;

    let query = SearchQuery::new("graph neural networks").unwrap();
    let file = client_for(&server).export(&query).await.unwrap();
    assert_eq!(file.filename, "research_graph_neural_networks.xlsx");
}

// =============================================================================
// Scopus
// =============================================================================

#[tokio::test]
async fn test_scopus_indexed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopus/check"))
        .and(query_param("doi", "10.1234/W1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexed": true,
            "scopus_url": "https://www.scopus.com/record/display.uri?eid=2-s2.0-1",
            "scopus_id": "SCOPUS_ID:1"
        })))
        .mount(&server)
        .await;

    let status = client_for(&server).scopus_check("10.1234/W1").await;
    assert!(status.indexed);
    assert_eq!(status.scopus_id.as_deref(), Some("SCOPUS_ID:1"));
}

#[tokio::test]
async fn test_scopus_failure_is_not_indexed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopus/check"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "Scopus API not configured"})))
        .mount(&server)
        .await;

    let status = client_for(&server).scopus_check("10.1234/W1").await;
    assert_eq!(status, ScopusStatus { indexed: false, scopus_url: None, scopus_id: None });
}

#[tokio::test]
async fn test_scopus_unreachable_is_not_indexed() {
    let client = ScholarClient::new(Config::for_testing("http://127.0.0.1:1")).unwrap();
    assert_eq!(client.scopus_check("10.1/x").await, ScopusStatus::not_indexed());
}

#[tokio::test]
async fn test_scopus_result_is_cached_per_doi() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopus/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexed": false, "scopus_url": null, "scopus_id": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::for_testing(&server.uri());
    config.scopus_cache_ttl = Duration::from_secs(60);
    config.scopus_cache_max_size = 100;
    let client = ScholarClient::new(config).unwrap();

    client.scopus_check("10.1/cached").await;
    client.scopus_check("10.1/cached").await;
}

// =============================================================================
// Health and capabilities
// =============================================================================

#[tokio::test]
async fn test_capabilities_from_health() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "version": "2.0.0",
            "ai_enabled": true,
            "ai_provider": "ollama",
            "scopus_enabled": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let caps = client_for(&server).capabilities().await;
    assert!(caps.ai_enabled);
    assert_eq!(caps.provider_name(), "ollama");
    assert!(!caps.scopus_enabled);
}

#[tokio::test]
async fn test_health_retries_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy", "ai_enabled": false, "ai_provider": "none", "scopus_enabled": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let caps = client_for(&server).capabilities().await;
    assert!(caps.scopus_enabled);
    assert!(!caps.ai_enabled);
    assert_eq!(caps.ai_provider, None);
}

#[tokio::test]
async fn test_health_gives_up_after_one_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let caps = client_for(&server).capabilities().await;
    assert!(!caps.ai_enabled);
    assert!(!caps.scopus_enabled);
}

// =============================================================================
// Trending
// =============================================================================

#[tokio::test]
async fn test_trending() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trending"))
        .and(query_param("field", "computer science"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "field": "computer science",
            "data": [
                {"key": "2023", "key_display_name": "2023", "count": 120},
                {"key": "2024", "count": 150}
            ]
        })))
        .mount(&server)
        .await;

    let trending = client_for(&server).trending("computer science").await.unwrap();
    assert_eq!(trending.data.len(), 2);
    assert_eq!(trending.data[1].count, 150);
}
