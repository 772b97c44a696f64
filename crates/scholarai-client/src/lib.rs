//! ScholarAI Client
//!
//! Terminal front end for the ScholarAI research search backend. Builds
//! filtered searches over scholarly works, pages through results, and
//! enriches individual records with AI summaries, formatted citations and
//! Scopus indexing status.
//!
//! # Features
//!
//! - **Search orchestration**: `Idle → Searching → Success | Failed` with stale-response protection
//! - **Lazy enrichment**: per-record summaries, citations and Scopus checks
//! - **Export**: spreadsheet download, one at a time
//! - **Dev proxy**: same-origin `/api` forwarding to a local backend
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use scholarai_client::{Config, FilterForm, ScholarClient, SearchOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = Arc::new(ScholarClient::new(config)?);
//!     let mut orchestrator = SearchOrchestrator::new(client);
//!
//!     let mut form = FilterForm::new("machine learning");
//!     form.start_year = Some(2020);
//!     let state = orchestrator.search(&form).await?;
//!     println!("{state:?}");
//!     Ok(())
//! }
//! ```

pub mod browse;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod pagination;
pub mod presentation;
pub mod proxy;
pub mod query;

pub use client::ScholarClient;
pub use config::Config;
pub use error::{ClientError, ExportError, PageError, QueryError};
pub use orchestrator::{SearchOrchestrator, SearchSession, SearchState};
pub use pagination::PageInfo;
pub use query::{FilterForm, SearchQuery};
