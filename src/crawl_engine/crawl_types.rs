//! Core types for scrape runs.
//!
//! Fatal pipeline errors and the summary returned once a run completes.

use std::path::PathBuf;
use std::time::Duration;

use crate::page_extractor::ProductLink;
use crate::renderer::RenderError;
use crate::result_sink::SinkError;

/// Errors that abort a scrape run before any output is written
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// No rendering session could be started
    #[error("Browser could not be launched: {0}")]
    BrowserLaunch(#[source] RenderError),

    #[error("Catalog page could not be loaded: {0}")]
    CatalogNavigation(#[source] RenderError),

    #[error("Pagination control not visible after {timeout:?}")]
    PaginationNotVisible {
        timeout: Duration,
        #[source]
        source: RenderError,
    },

    #[error("Active page label '{0}' is not a number")]
    NonNumericPageLabel(String),

    #[error("No active pagination control on the catalog page")]
    ActivePageMissing,

    /// Renderer failure while walking the catalog
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Convenience alias for Result with `ScrapeError`
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub links_discovered: usize,
    pub records_written: usize,
    /// Links whose page could not be loaded, in completion order
    pub failed_links: Vec<ProductLink>,
    pub output_path: PathBuf,
}
