//! Core configuration types for catalog scraping
//!
//! `ScrapeConfig` is handed to both the pagination crawler and the worker
//! pool so that every session is opened with the same headers and timeouts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_CATALOG_URL, DEFAULT_NAVIGATION_TIMEOUT_SECS,
    DEFAULT_PAGINATION_TIMEOUT_SECS, DEFAULT_REFERER, DEFAULT_SEC_CH_UA,
    DEFAULT_SEC_CH_UA_MOBILE, DEFAULT_SEC_CH_UA_PLATFORM, DEFAULT_SETTLE_MS,
    DEFAULT_SETTLE_POLL_MS, DEFAULT_WORKERS,
};

/// How the pagination crawler waits after clicking the next page control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SettleStrategy {
    /// Poll the active page label until it changes, capped at the settle delay
    #[default]
    LabelChange,
    /// Sleep for the full settle delay
    FixedDelay,
}

/// Headers attached to every request of every session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeaders {
    pub referer: String,
    pub user_agent: String,
    pub sec_ch_ua: String,
    pub sec_ch_ua_mobile: String,
    pub sec_ch_ua_platform: String,
}

impl Default for RequestHeaders {
    fn default() -> Self {
        Self {
            referer: DEFAULT_REFERER.to_string(),
            user_agent: CHROME_USER_AGENT.to_string(),
            sec_ch_ua: DEFAULT_SEC_CH_UA.to_string(),
            sec_ch_ua_mobile: DEFAULT_SEC_CH_UA_MOBILE.to_string(),
            sec_ch_ua_platform: DEFAULT_SEC_CH_UA_PLATFORM.to_string(),
        }
    }
}

impl RequestHeaders {
    /// Header name to value, as sent on the wire. Empty values are omitted.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        [
            ("Referer", &self.referer),
            ("User-Agent", &self.user_agent),
            ("sec-ch-ua", &self.sec_ch_ua),
            ("sec-ch-ua-mobile", &self.sec_ch_ua_mobile),
            ("sec-ch-ua-platform", &self.sec_ch_ua_platform),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
    }
}

/// Main configuration struct for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// First page of the paginated listing.
    ///
    /// **INVARIANT:** Parses as an absolute http(s) URL (normalized in builder).
    pub(crate) catalog_url: String,
    pub(crate) headers: RequestHeaders,
    pub(crate) workers: usize,

    /// Wait for the pagination control on the first page. Exceeding it is fatal.
    pub(crate) pagination_timeout: Duration,

    /// Per-navigation deadline, catalog and product pages alike
    pub(crate) navigation_timeout: Duration,

    /// Upper bound of the post-click settle wait
    pub(crate) settle_delay: Duration,
    pub(crate) settle_poll_interval: Duration,
    pub(crate) settle_strategy: SettleStrategy,
    pub(crate) headless: bool,
    pub(crate) output_dir: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            headers: RequestHeaders::default(),
            workers: DEFAULT_WORKERS,
            pagination_timeout: Duration::from_secs(DEFAULT_PAGINATION_TIMEOUT_SECS),
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
            settle_poll_interval: Duration::from_millis(DEFAULT_SETTLE_POLL_MS),
            settle_strategy: SettleStrategy::default(),
            headless: true,
            output_dir: PathBuf::from("."),
        }
    }
}
