//! Type-safe builder for `ScrapeConfig` using the typestate pattern
//!
//! The catalog URL is the only required field; `build()` exists only once it
//! has been set. Everything else falls back to the Entel defaults.

use anyhow::{Result, anyhow, bail};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::time::Duration;

use super::types::{RequestHeaders, ScrapeConfig, SettleStrategy};

// Type states for the builder
pub struct WithCatalogUrl;

pub struct ScrapeConfigBuilder<State = ()> {
    pub(crate) catalog_url: Option<String>,
    pub(crate) headers: RequestHeaders,
    pub(crate) workers: usize,
    pub(crate) pagination_timeout: Duration,
    pub(crate) navigation_timeout: Duration,
    pub(crate) settle_delay: Duration,
    pub(crate) settle_poll_interval: Duration,
    pub(crate) settle_strategy: SettleStrategy,
    pub(crate) headless: bool,
    pub(crate) output_dir: PathBuf,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ScrapeConfigBuilder<()> {
    fn default() -> Self {
        let defaults = ScrapeConfig::default();
        Self {
            catalog_url: None,
            headers: defaults.headers,
            workers: defaults.workers,
            pagination_timeout: defaults.pagination_timeout,
            navigation_timeout: defaults.navigation_timeout,
            settle_delay: defaults.settle_delay,
            settle_poll_interval: defaults.settle_poll_interval,
            settle_strategy: defaults.settle_strategy,
            headless: defaults.headless,
            output_dir: defaults.output_dir,
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfig {
    /// Create a builder for configuring a `ScrapeConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder::default()
    }
}

/// Add `https://` when no scheme is given.
fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

impl ScrapeConfigBuilder<()> {
    pub fn catalog_url(self, url: impl Into<String>) -> ScrapeConfigBuilder<WithCatalogUrl> {
        ScrapeConfigBuilder {
            catalog_url: Some(normalize_url(&url.into())),
            headers: self.headers,
            workers: self.workers,
            pagination_timeout: self.pagination_timeout,
            navigation_timeout: self.navigation_timeout,
            settle_delay: self.settle_delay,
            settle_poll_interval: self.settle_poll_interval,
            settle_strategy: self.settle_strategy,
            headless: self.headless,
            output_dir: self.output_dir,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when all required fields are set
impl ScrapeConfigBuilder<WithCatalogUrl> {
    pub fn build(self) -> Result<ScrapeConfig> {
        let catalog_url = self
            .catalog_url
            .ok_or_else(|| anyhow!("catalog_url is required"))?;

        let parsed = url::Url::parse(&catalog_url)
            .map_err(|e| anyhow!("Invalid catalog URL '{catalog_url}': {e}"))?;
        if parsed.host_str().is_none() {
            bail!("Catalog URL '{catalog_url}' has no host");
        }

        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        for (name, value) in [
            ("pagination_timeout", self.pagination_timeout),
            ("navigation_timeout", self.navigation_timeout),
            ("settle_poll_interval", self.settle_poll_interval),
        ] {
            if value.is_zero() {
                bail!("{name} must be greater than zero");
            }
        }

        Ok(ScrapeConfig {
            catalog_url: parsed.to_string(),
            headers: self.headers,
            workers: self.workers,
            pagination_timeout: self.pagination_timeout,
            navigation_timeout: self.navigation_timeout,
            settle_delay: self.settle_delay,
            settle_poll_interval: self.settle_poll_interval,
            settle_strategy: self.settle_strategy,
            headless: self.headless,
            output_dir: self.output_dir,
        })
    }
}

// Builder methods available at any state
impl<State> ScrapeConfigBuilder<State> {
    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.headers.referer = referer.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.headers.user_agent = user_agent.into();
        self
    }

    /// Replace the whole header set, client hints included
    #[must_use]
    pub fn headers(mut self, headers: RequestHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// Number of concurrent product workers, each with its own browser
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn pagination_timeout(mut self, timeout: Duration) -> Self {
        self.pagination_timeout = timeout;
        self
    }

    #[must_use]
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Upper bound of the wait after each pagination click. Zero disables it.
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn settle_poll_interval(mut self, interval: Duration) -> Self {
        self.settle_poll_interval = interval;
        self
    }

    #[must_use]
    pub fn settle_strategy(mut self, strategy: SettleStrategy) -> Self {
        self.settle_strategy = strategy;
        self
    }

    /// Set browser headless mode. Headed mode is meant for debugging
    /// selector changes against the live site.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
