//! End-to-end scrape pipeline
//!
//! Pagination crawl, then concurrent extraction, then persistence. Nothing
//! is written unless both crawl stages complete.

use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

use super::crawl_types::{ScrapeReport, ScrapeResult};
use super::pagination::PaginationCrawler;
use super::worker_pool::WorkerPool;
use crate::config::ScrapeConfig;
use crate::renderer::PageRenderer;
use crate::result_sink::{ResultSink, SinkError, output_stem};

/// Run the whole pipeline with the given renderer and sink.
///
/// The sink does blocking file I/O, so it runs on the blocking pool.
pub async fn scrape_with<R, S>(
    renderer: Arc<R>,
    config: Arc<ScrapeConfig>,
    sink: Arc<S>,
) -> ScrapeResult<ScrapeReport>
where
    R: PageRenderer,
    S: ResultSink + ?Sized + 'static,
{
    info!("Crawling catalog: {}", config.catalog_url());
    let links = PaginationCrawler::new(Arc::clone(&renderer), Arc::clone(&config))
        .crawl()
        .await?;
    let links_discovered = links.len();
    info!("Total links extracted: {links_discovered}");

    let pool = WorkerPool::new(renderer, Arc::clone(&config));
    let report = pool.run_with_report(links, config.workers()).await?;
    if !report.failed_links.is_empty() {
        warn!("{} product pages could not be loaded", report.failed_links.len());
    }

    let records_written = report.records.len();
    let records = report.records;
    let stem = output_stem(&Local::now());
    let output_path = tokio::task::spawn_blocking(move || sink.write(&records, &stem))
        .await
        .map_err(SinkError::from)??;
    info!("Data saved to '{}'", output_path.display());

    Ok(ScrapeReport {
        links_discovered,
        records_written,
        failed_links: report.failed_links,
        output_path,
    })
}
