//! entel-scrape - device renewal catalog scraper.
//!
//! Walks the catalog pagination, extracts every product page with a pool of
//! headless Chrome workers and writes the result to a `;`-delimited CSV.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entel_scrape::utils::{
    CHROME_USER_AGENT, DEFAULT_CATALOG_URL, DEFAULT_NAVIGATION_TIMEOUT_SECS,
    DEFAULT_PAGINATION_TIMEOUT_SECS, DEFAULT_REFERER, DEFAULT_SETTLE_MS, DEFAULT_WORKERS,
};
use entel_scrape::{ScrapeConfig, SettleStrategy};

#[derive(Debug, Parser)]
#[command(name = "entel-scrape", version, about)]
struct Cli {
    /// First page of the catalog listing
    #[arg(long, env = "ENTEL_CATALOG_URL", default_value = DEFAULT_CATALOG_URL)]
    catalog_url: String,

    #[arg(long, default_value = DEFAULT_REFERER)]
    referer: String,

    #[arg(long, default_value = CHROME_USER_AGENT)]
    user_agent: String,

    /// Concurrent product workers, one browser each
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    #[arg(long, default_value_t = DEFAULT_PAGINATION_TIMEOUT_SECS)]
    pagination_timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_NAVIGATION_TIMEOUT_SECS)]
    navigation_timeout_secs: u64,

    /// Upper bound of the wait after each pagination click
    #[arg(long, default_value_t = DEFAULT_SETTLE_MS)]
    settle_ms: u64,

    /// Always wait the full settle time instead of watching the page label
    #[arg(long)]
    fixed_settle: bool,

    /// Directory for the CSV output
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Show the browser windows
    #[arg(long)]
    headed: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ScrapeConfig> {
        let settle_strategy = if self.fixed_settle {
            SettleStrategy::FixedDelay
        } else {
            SettleStrategy::LabelChange
        };

        ScrapeConfig::builder()
            .catalog_url(self.catalog_url)
            .referer(self.referer)
            .user_agent(self.user_agent)
            .workers(self.workers)
            .pagination_timeout(Duration::from_secs(self.pagination_timeout_secs))
            .navigation_timeout(Duration::from_secs(self.navigation_timeout_secs))
            .settle_delay(Duration::from_millis(self.settle_ms))
            .settle_strategy(settle_strategy)
            .headless(!self.headed)
            .output_dir(self.output_dir)
            .build()
            .context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "entel_scrape=debug"
    } else {
        "entel_scrape=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.into_config()?;
    let report = entel_scrape::scrape(config).await.context("Scrape failed")?;

    tracing::info!(
        "Done: {} links, {} records, {} failed",
        report.links_discovered,
        report.records_written,
        report.failed_links.len()
    );
    for link in &report.failed_links {
        tracing::debug!("Failed: {link}");
    }
    Ok(())
}
