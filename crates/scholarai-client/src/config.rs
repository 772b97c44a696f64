//! Configuration for the ScholarAI client.

use std::str::FromStr;
use std::time::Duration;

use crate::error::QueryError;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Backend origin used when nothing else is configured (the backend's dev port).
    pub const DEFAULT_API_URL: &str = "http://127.0.0.1:9999";

    /// Origin of the local dev proxy.
    pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:5173";

    /// Same-origin path the dev proxy forwards to the backend.
    pub const PROXY_PREFIX: &str = "/api";

    /// Request timeout (AI summaries on a local model can take a while).
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Delay before the single health-check retry.
    pub const HEALTH_RETRY_DELAY: Duration = Duration::from_secs(2);

    /// Results per page.
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// Largest page the backend accepts.
    pub const MAX_PAGE_SIZE: u32 = 50;

    /// Scopus status cache TTL (30 minutes).
    pub const SCOPUS_CACHE_TTL: Duration = Duration::from_secs(1800);

    /// Maximum number of cached Scopus lookups.
    pub const SCOPUS_CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Deployment mode, mirroring the backend's `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development: requests may go through the dev proxy.
    #[default]
    Development,
    /// Talk to the backend origin directly.
    Production,
}

impl FromStr for Environment {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(QueryError::invalid("environment", other)),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin.
    pub api_url: String,

    /// Deployment mode.
    pub environment: Environment,

    /// Dev proxy origin; only consulted in development mode.
    pub proxy_url: Option<String>,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Delay before the single health-check retry.
    pub health_retry_delay: Duration,

    /// Results per page.
    pub page_size: u32,

    /// Scopus cache TTL.
    pub scopus_cache_ttl: Duration,

    /// Maximum Scopus cache size.
    pub scopus_cache_max_size: u64,
}

impl Config {
    /// Create a configuration pointing at the given backend origin.
    #[must_use]
    pub fn new(api_url: Option<String>) -> Self {
        Self {
            api_url: api_url.unwrap_or_else(|| api::DEFAULT_API_URL.to_string()),
            environment: Environment::default(),
            proxy_url: None,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            health_retry_delay: api::HEALTH_RETRY_DELAY,
            page_size: api::DEFAULT_PAGE_SIZE,
            scopus_cache_ttl: api::SCOPUS_CACHE_TTL,
            scopus_cache_max_size: api::SCOPUS_CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration with a mock server as the backend.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_url: base_url.to_string(),
            environment: Environment::Production,
            proxy_url: None,
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            health_retry_delay: Duration::from_millis(0), // No delay in tests
            page_size: api::DEFAULT_PAGE_SIZE,
            scopus_cache_ttl: Duration::from_secs(0), // No caching in tests
            scopus_cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables (and `.env` if present).
    ///
    /// Reads `SCHOLARAI_API_URL`, `SCHOLARAI_ENV`, `SCHOLARAI_PROXY_URL` and
    /// `SCHOLARAI_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::new(std::env::var("SCHOLARAI_API_URL").ok());

        if let Ok(env) = std::env::var("SCHOLARAI_ENV") {
            config.environment = env.parse()?;
        }
        config.proxy_url = std::env::var("SCHOLARAI_PROXY_URL").ok();

        if let Ok(size) = std::env::var("SCHOLARAI_PAGE_SIZE") {
            let size: u32 = size
                .parse()
                .map_err(|e| anyhow::anyhow!("SCHOLARAI_PAGE_SIZE '{size}': {e}"))?;
            config = config.with_page_size(size);
        }

        Ok(config)
    }

    /// Route requests through a dev proxy at `proxy_url` (development mode only).
    #[must_use]
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Set the deployment mode.
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set results per page, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, api::MAX_PAGE_SIZE);
        self
    }

    /// Check if requests go through the dev proxy.
    #[must_use]
    pub const fn uses_proxy(&self) -> bool {
        matches!(self.environment, Environment::Development) && self.proxy_url.is_some()
    }

    /// Resolve the base URL every endpoint is joined onto.
    ///
    /// Development mode with a proxy configured yields `<proxy>/api`;
    /// anything else yields the backend origin. No trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        match (&self.environment, &self.proxy_url) {
            (Environment::Development, Some(proxy)) => {
                format!("{}{}", proxy.trim_end_matches('/'), api::PROXY_PREFIX)
            }
            _ => self.api_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.base_url(), api::DEFAULT_API_URL);
        assert!(!config.uses_proxy());
    }

    #[test]
    fn test_dev_mode_routes_through_proxy() {
        let config = Config::new(Some("http://backend:9999".to_string()))
            .with_proxy("http://localhost:5173/");
        assert!(config.uses_proxy());
        assert_eq!(config.base_url(), "http://localhost:5173/api");
    }

    #[test]
    fn test_production_ignores_proxy() {
        let config = Config::new(Some("https://api.example.org/".to_string()))
            .with_proxy("http://localhost:5173")
            .with_environment(Environment::Production);
        assert!(!config.uses_proxy());
        assert_eq!(config.base_url(), "https://api.example.org");
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(Config::default().with_page_size(0).page_size, 1);
        assert_eq!(Config::default().with_page_size(500).page_size, api::MAX_PAGE_SIZE);
        assert_eq!(Config::default().with_page_size(20).page_size, 20);
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("DEV".parse::<Environment>(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }
}
