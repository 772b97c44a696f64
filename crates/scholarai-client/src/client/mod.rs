//! ScholarAI backend client.
//!
//! One async method per backend endpoint. Provides:
//! - Connection pooling via reqwest
//! - Request logging middleware
//! - `detail` extraction from error bodies, with a generic fallback
//! - Fail-open Scopus checks, memoized per DOI
//! - A one-shot retry for the startup health check

mod middleware;

use std::sync::LazyLock;
use std::time::Duration;

use moka::future::Cache;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

pub use middleware::RequestLogging;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    BatchCitationResponse, Capabilities, CitationFormat, CitationResponse, ExportFile,
    HealthStatus, Paper, ScopusStatus, SearchResult, SummaryResponse, TrendingResponse,
};
use crate::query::SearchQuery;

/// ScholarAI backend client.
#[derive(Clone)]
pub struct ScholarClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Base URL every endpoint is joined onto (always ends in `/`).
    base_url: Url,

    /// Scopus results by DOI.
    scopus_cache: Cache<String, ScopusStatus>,

    /// Delay before the single health-check retry.
    health_retry_delay: Duration,

    /// Results per page.
    page_size: u32,
}

impl ScholarClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let base_url = Url::parse(&format!("{}/", config.base_url()))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let client = ClientBuilder::new(client).with(RequestLogging).build();

        let scopus_cache = Cache::builder()
            .max_capacity(config.scopus_cache_max_size)
            .time_to_live(config.scopus_cache_ttl)
            .build();

        tracing::debug!(base_url = %base_url, proxied = config.uses_proxy(), "ScholarAI client ready");

        Ok(Self {
            client,
            base_url,
            scopus_cache,
            health_retry_delay: config.health_retry_delay,
            page_size: config.page_size,
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Results requested per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Search for papers.
    ///
    /// # Errors
    ///
    /// Returns error on network failure or a non-success status.
    pub async fn search(&self, query: &SearchQuery, page: u32) -> ClientResult<SearchResult> {
        let url = self.endpoint("search", &query.search_params(page, self.page_size))?;
        self.get_json(url).await
    }

    /// Generate an AI summary of a paper.
    ///
    /// # Errors
    ///
    /// Returns error on API failure (e.g. 503 when no AI provider is available).
    pub async fn summarize(&self, title: &str, abstract_text: &str) -> ClientResult<SummaryResponse> {
        let body = serde_json::json!({
            "title": title,
            "abstract": abstract_text,
        });

        self.post_json("summarize", &body).await
    }

    /// Format a single citation.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn cite(&self, paper: &Paper, format: CitationFormat) -> ClientResult<String> {
        let body = serde_json::json!({
            "paper": paper,
            "format": format,
        });

        let response: CitationResponse = self.post_json("cite", &body).await?;
        Ok(response.citation)
    }

    /// Format citations for several papers at once.
    ///
    /// # Errors
    ///
    /// Returns error on API failure (400 when `papers` is empty).
    pub async fn cite_batch(&self, papers: &[Paper], format: CitationFormat) -> ClientResult<String> {
        let body = serde_json::json!({
            "papers": papers,
            "format": format,
        });

        let response: BatchCitationResponse = self.post_json("cite/batch", &body).await?;
        Ok(response.citations)
    }

    /// Download search results as a spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn export(&self, query: &SearchQuery) -> ClientResult<ExportFile> {
        let url = self.endpoint("export", &query.export_params())?;

        let response = self.client.get(url).send().await?;
        let response = Self::handle_response(response).await?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| query.export_filename());

        let bytes = response.bytes().await?.to_vec();
        tracing::info!(filename = %filename, size = bytes.len(), "Export downloaded");

        Ok(ExportFile { filename, bytes })
    }

    /// Check whether Scopus indexes a DOI.
    ///
    /// Never fails: any error resolves to [`ScopusStatus::not_indexed`].
    /// Successful answers are cached per DOI.
    pub async fn scopus_check(&self, doi: &str) -> ScopusStatus {
        if let Some(cached) = self.scopus_cache.get(doi).await {
            return cached;
        }

        match self.fetch_scopus(doi).await {
            Ok(status) => {
                self.scopus_cache.insert(doi.to_string(), status.clone()).await;
                status
            }
            Err(e) => {
                tracing::debug!(doi, error = %e, "Scopus check failed, treating as not indexed");
                ScopusStatus::not_indexed()
            }
        }
    }

    async fn fetch_scopus(&self, doi: &str) -> ClientResult<ScopusStatus> {
        let url = self.endpoint("scopus/check", &[("doi", doi.to_string())])?;
        self.get_json(url).await
    }

    /// Fetch backend health.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn health(&self) -> ClientResult<HealthStatus> {
        let url = self.endpoint("health", &[])?;
        self.get_json(url).await
    }

    /// Fetch session capabilities.
    ///
    /// Retries the health check exactly once after the configured delay, then
    /// gives up silently with every capability disabled.
    pub async fn capabilities(&self) -> Capabilities {
        match self.health().await {
            Ok(health) => return Capabilities::from(&health),
            Err(e) => {
                tracing::debug!(error = %e, delay = ?self.health_retry_delay, "Health check failed, retrying once");
            }
        }

        tokio::time::sleep(self.health_retry_delay).await;

        match self.health().await {
            Ok(health) => Capabilities::from(&health),
            Err(e) => {
                tracing::info!(error = %e, "Health check failed, AI and Scopus features disabled");
                Capabilities::default()
            }
        }
    }

    /// Publication counts per year for a field of study.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn trending(&self, field: &str) -> ClientResult<TrendingResponse> {
        let url = self.endpoint("trending", &[("field", field.to_string())])?;
        self.get_json(url).await
    }

    /// Build an endpoint URL with form-encoded query pairs.
    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> ClientResult<Url> {
        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Make a GET request.
    async fn get_json<T>(&self, url: Url) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.client.get(url).send().await?;
        let response = Self::handle_response(response).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    /// Make a POST request with a JSON body.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, &[])?;
        let body_str = serde_json::to_string(body)?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .await?;

        let response = Self::handle_response(response).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    /// Turn non-success statuses into [`ClientError::Backend`].
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = error_detail(&text).unwrap_or_else(|| ClientError::generic_detail(status.as_u16()));

        Err(ClientError::backend(status.as_u16(), detail))
    }
}

impl std::fmt::Debug for ScholarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScholarClient")
            .field("base_url", &self.base_url.as_str())
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Extract a string `detail` from a JSON error body.
///
/// Validation errors carry a list in `detail`; those fall back to the generic message.
fn error_detail(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<ErrorBody>(body).ok()?.detail {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}

static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename\s*=\s*"?([^";]+)"?"#).expect("valid filename regex")
});

/// File name from a `Content-Disposition` value, path separators replaced.
fn filename_from_disposition(value: &str) -> Option<String> {
    let name = FILENAME_RE.captures(value)?.get(1)?.as_str().trim();
    if name.is_empty() {
        return None;
    }
    Some(name.replace(['/', '\\'], "_"))
}
