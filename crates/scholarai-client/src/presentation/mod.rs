//! Result presentation.
//!
//! - [`record`]: per-record view state (abstract, AI summary, citations, Scopus)
//! - [`render`]: markdown-flavoured text output for the terminal

pub mod record;
pub mod render;

pub use record::{
    CITATION_FAILURE, Enrichment, EnrichmentRequest, PaperView, RecordUpdate, ResultsView,
    ScopusSlot,
};
pub use render::{
    SCROLL_TO_TOP, render_capabilities, render_pagination, render_paper, render_results,
    render_scopus_update, render_state, render_trending,
};
