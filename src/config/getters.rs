//! Getter methods for `ScrapeConfig`

use std::path::Path;
use std::time::Duration;

use super::types::{RequestHeaders, ScrapeConfig, SettleStrategy};

impl ScrapeConfig {
    #[must_use]
    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    #[must_use]
    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn pagination_timeout(&self) -> Duration {
        self.pagination_timeout
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    #[must_use]
    pub fn settle_poll_interval(&self) -> Duration {
        self.settle_poll_interval
    }

    #[must_use]
    pub fn settle_strategy(&self) -> SettleStrategy {
        self.settle_strategy
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
