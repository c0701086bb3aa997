pub mod browser_profile;
pub mod browser_setup;
pub mod config;
pub mod crawl_engine;
pub mod page_extractor;
pub mod renderer;
pub mod result_sink;
pub mod utils;

pub use browser_setup::{
    download_managed_browser, find_browser_executable, launch_browser, resolve_browser_executable,
};
pub use config::{RequestHeaders, ScrapeConfig, SettleStrategy};
pub use crawl_engine::{
    PaginationCrawler, PoolReport, ScrapeError, ScrapeReport, ScrapeResult, WorkQueue, WorkerPool,
    scrape_with,
};
pub use page_extractor::{ProductExtractor, ProductLink, ProductRecord};
pub use renderer::{ChromiumRenderer, PageRenderer, RenderError, RenderSession};
pub use result_sink::{CsvSink, ResultSink, SinkError, output_stem};

use std::sync::Arc;

/// Scrape the configured catalog with headless Chrome and write the CSV
/// into the configured output directory.
pub async fn scrape(config: ScrapeConfig) -> ScrapeResult<ScrapeReport> {
    let renderer = Arc::new(ChromiumRenderer::new(config.headless()));
    let sink = Arc::new(CsvSink::new(config.output_dir()));
    scrape_with(renderer, Arc::new(config), sink).await
}
