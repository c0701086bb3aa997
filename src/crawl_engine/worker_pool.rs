//! Concurrent product extraction
//!
//! Each worker owns one rendering session for its whole life and pulls links
//! from the shared [`WorkQueue`] until it is empty. A failing link is logged
//! and skipped; it never stops the worker or the pool.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::crawl_types::{ScrapeError, ScrapeResult};
use super::work_queue::WorkQueue;
use crate::config::ScrapeConfig;
use crate::page_extractor::{ProductExtractor, ProductLink, ProductRecord};
use crate::renderer::{PageRenderer, RenderError, RenderSession};

/// Outcome of a pool run
#[derive(Debug, Default)]
pub struct PoolReport {
    pub records: Vec<ProductRecord>,
    pub failed_links: Vec<ProductLink>,
    /// Workers that exited without ever opening a session
    pub launch_failures: usize,
}

/// State shared by all workers of one run
struct WorkerContext<R: PageRenderer> {
    renderer: Arc<R>,
    config: Arc<ScrapeConfig>,
    queue: Arc<WorkQueue>,
    records: Arc<Mutex<Vec<ProductRecord>>>,
    failed: Arc<Mutex<Vec<ProductLink>>>,
}

impl<R: PageRenderer> Clone for WorkerContext<R> {
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            config: Arc::clone(&self.config),
            queue: Arc::clone(&self.queue),
            records: Arc::clone(&self.records),
            failed: Arc::clone(&self.failed),
        }
    }
}

pub struct WorkerPool<R: PageRenderer> {
    renderer: Arc<R>,
    config: Arc<ScrapeConfig>,
}

impl<R: PageRenderer> WorkerPool<R> {
    pub fn new(renderer: Arc<R>, config: Arc<ScrapeConfig>) -> Self {
        Self { renderer, config }
    }

    /// Extract every link with `concurrency` workers and return the records
    /// in completion order.
    pub async fn run(
        &self,
        links: Vec<ProductLink>,
        concurrency: usize,
    ) -> ScrapeResult<Vec<ProductRecord>> {
        Ok(self.run_with_report(links, concurrency).await?.records)
    }

    /// Like [`run`](Self::run), also reporting failed links.
    ///
    /// # Errors
    /// [`ScrapeError::BrowserLaunch`] when no worker could open a session
    /// while links were still waiting.
    pub async fn run_with_report(
        &self,
        links: Vec<ProductLink>,
        concurrency: usize,
    ) -> ScrapeResult<PoolReport> {
        if links.is_empty() {
            info!("No product links to process");
            return Ok(PoolReport::default());
        }

        let concurrency = concurrency.max(1);
        let ctx = WorkerContext {
            renderer: Arc::clone(&self.renderer),
            config: Arc::clone(&self.config),
            records: Arc::new(Mutex::new(Vec::with_capacity(links.len()))),
            queue: Arc::new(WorkQueue::new(links)),
            failed: Arc::new(Mutex::new(Vec::new())),
        };

        info!(
            "Starting {concurrency} workers for {} links",
            ctx.queue.len()
        );

        let mut tasks: FuturesUnordered<_> = (0..concurrency)
            .map(|worker_id| tokio::spawn(run_worker(worker_id, ctx.clone())))
            .collect();

        let mut launch_failures = 0;
        let mut last_launch_error = None;
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(Ok(processed)) => debug!("Worker finished after {processed} links"),
                Ok(Err(e)) => {
                    launch_failures += 1;
                    last_launch_error = Some(e);
                }
                Err(e) => error!("Worker task panicked: {e}"),
            }
        }

        if launch_failures == concurrency
            && !ctx.queue.is_empty()
            && let Some(e) = last_launch_error
        {
            return Err(ScrapeError::BrowserLaunch(e));
        }

        let records = std::mem::take(&mut *ctx.records.lock());
        let failed_links = std::mem::take(&mut *ctx.failed.lock());
        info!(
            "Workers done: {} records, {} failed links",
            records.len(),
            failed_links.len()
        );

        Ok(PoolReport {
            records,
            failed_links,
            launch_failures,
        })
    }
}

/// Drain the queue with one session. Returns the number of links handled,
/// or the error that kept the session from opening.
async fn run_worker<R: PageRenderer>(
    worker_id: usize,
    ctx: WorkerContext<R>,
) -> Result<usize, RenderError> {
    let mut session = match ctx.renderer.launch().await {
        Ok(session) => session,
        Err(e) => {
            warn!("Worker {worker_id} could not launch a session: {e}");
            return Err(e);
        }
    };

    if let Err(e) = session.set_headers(&ctx.config.headers().to_map()).await {
        warn!("Worker {worker_id} could not set request headers: {e}");
        if let Err(close_err) = session.close().await {
            warn!("Worker {worker_id} failed to close session: {close_err}");
        }
        return Err(e);
    }

    let extractor = ProductExtractor::from_config(&ctx.config);
    let mut processed = 0;

    while let Some(url) = ctx.queue.take() {
        info!("Worker {worker_id} processing: {url}");
        match extractor.extract(&session, &url).await {
            Ok(record) => ctx.records.lock().push(record),
            Err(e) => {
                warn!("Error processing {url}: {e}");
                ctx.failed.lock().push(url);
            }
        }
        processed += 1;
    }

    if let Err(e) = session.close().await {
        warn!("Worker {worker_id} failed to close session: {e}");
    }
    Ok(processed)
}
