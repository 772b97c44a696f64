//! Data models for ScholarAI backend entities.
//!
//! Field names follow the backend's snake_case JSON; missing fields default.

mod enrichment;
mod enums;
mod health;
mod paper;
mod search;

pub use enrichment::{
    BatchCitationResponse, CitationResponse, ExportFile, ScopusStatus, SummaryResponse,
    TrendingBucket, TrendingResponse,
};
pub use enums::{CitationFormat, PaperType, SortMode};
pub use health::{Capabilities, HealthStatus};
pub use paper::{Author, Concept, Paper};
pub use search::SearchResult;
