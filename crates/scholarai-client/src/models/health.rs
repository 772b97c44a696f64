//! Backend health and the capability flags derived from it.

use serde::{Deserialize, Serialize};

/// Response of `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    /// `"healthy"` when the backend is up.
    pub status: String,

    /// Backend version.
    pub version: Option<String>,

    /// Backend deployment mode.
    pub environment: Option<String>,

    /// Whether an AI provider is available for summaries.
    pub ai_enabled: bool,

    /// Active AI provider (`ollama`, `openai` or `none`).
    pub ai_provider: Option<String>,

    /// Whether a local Ollama model answered.
    pub ollama_available: bool,

    /// Ollama model name when available.
    pub ollama_model: Option<String>,

    /// Whether an OpenAI key is configured.
    pub openai_configured: bool,

    /// Whether Scopus checks are configured.
    pub scopus_enabled: bool,

    /// Data source description.
    pub data_source: Option<String>,
}

/// Session-wide feature flags.
///
/// Fetched once at startup and passed down by reference; never mutated
/// afterwards. The default has every feature disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// AI summaries available.
    pub ai_enabled: bool,

    /// Provider name shown next to summaries.
    pub ai_provider: Option<String>,

    /// Scopus indexing checks available.
    pub scopus_enabled: bool,
}

impl Capabilities {
    /// Provider name, or `"none"`.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.ai_provider.as_deref().unwrap_or("none")
    }
}

impl From<&HealthStatus> for Capabilities {
    fn from(health: &HealthStatus) -> Self {
        Self {
            ai_enabled: health.ai_enabled,
            ai_provider: health
                .ai_provider
                .clone()
                .filter(|p| !p.is_empty() && p != "none"),
            scopus_enabled: health.scopus_enabled,
        }
    }
}
