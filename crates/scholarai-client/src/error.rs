//! Error types for the ScholarAI client.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Every [`ClientError`] collapses to a single display string through
//! [`ClientError::to_user_message`] before it reaches the screen.

/// Shown whenever the backend cannot be reached at all.
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Could not reach the ScholarAI backend. Is it running?";

/// Shown when the backend answers with a body we cannot read.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Unexpected response from the ScholarAI backend.";

/// Shown in place of any export error detail.
pub const EXPORT_FAILURE_MESSAGE: &str = "Export failed. Please try again.";

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Non-success status from the backend.
    #[error("Backend error ({status}): {detail}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// `detail` field of the error body, or a generic message
        detail: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Base URL or endpoint could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Create a backend error.
    #[must_use]
    pub fn backend(status: u16, detail: impl Into<String>) -> Self {
        Self::Backend { status, detail: detail.into() }
    }

    /// Generic message used when an error body carries no usable `detail`.
    #[must_use]
    pub fn generic_detail(status: u16) -> String {
        format!("Request failed with status {status}")
    }

    /// Returns true if the backend could not be reached.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Middleware(_))
    }

    /// HTTP status of a backend error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convert to the single message shown to the user.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Backend { detail, .. } => detail.clone(),
            Self::Http(_) | Self::Middleware(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            Self::Parse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
            Self::Url(_) => self.to_string(),
        }
    }
}

/// Validation errors raised while building a search query.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Topic is empty or whitespace-only.
    #[error("Please enter a research topic")]
    EmptyTopic,

    /// Year outside the selectable range.
    #[error("Year {year} is outside {min}..={max}")]
    YearOutOfRange {
        /// Rejected year
        year: i32,
        /// First selectable year
        min: i32,
        /// Last selectable year
        max: i32,
    },

    /// Start year after end year.
    #[error("Start year {start} is after end year {end}")]
    InvertedYearRange {
        /// Start year
        start: i32,
        /// End year
        end: i32,
    },

    /// Value not in a fixed option list.
    #[error("Invalid {field}: '{value}'")]
    InvalidOption {
        /// Which form field
        field: &'static str,
        /// Rejected value
        value: String,
    },
}

impl QueryError {
    /// Create an invalid option error.
    #[must_use]
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidOption { field, value: value.into() }
    }
}

/// Rejected page changes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Pagination is only available after a successful search.
    #[error("No results to paginate")]
    NoResults,

    /// Requested page outside `1..=total`.
    #[error("Page {page} is outside 1..={total}")]
    OutOfRange {
        /// Requested page
        page: u32,
        /// Total pages
        total: u32,
    },
}

/// Errors from the export flow.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Another export is still running.
    #[error("An export is already in progress")]
    InFlight,

    /// No search has been submitted yet.
    #[error("Search for a topic before exporting")]
    NoTopic,

    /// The download failed.
    #[error("{}", EXPORT_FAILURE_MESSAGE)]
    Failed(#[source] ClientError),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
