//! Crawl Engine Module
//!
//! The two crawl stages and the pipeline that chains them: a sequential
//! pagination walk that discovers product links, then a worker pool that
//! extracts every link concurrently.

// Sub-modules
pub mod crawl_types;
pub mod orchestrator;
pub mod pagination;
pub mod work_queue;
pub mod worker_pool;

// Re-exports for public API
pub use crawl_types::{ScrapeError, ScrapeReport, ScrapeResult};
pub use orchestrator::scrape_with;
pub use pagination::{PaginationCrawler, PaginationState, next_page_label};
pub use work_queue::WorkQueue;
pub use worker_pool::{PoolReport, WorkerPool};
