//! Catalog pagination walker
//!
//! Walks the numbered pagination of the catalog listing in a single session,
//! collecting product links from every page. The walk ends when the active
//! page label stops advancing or when no control for the next number exists.

use std::sync::Arc;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use super::crawl_types::{ScrapeError, ScrapeResult};
use crate::config::{ScrapeConfig, SettleStrategy};
use crate::page_extractor::ProductLink;
use crate::page_extractor::selectors::{
    ACTIVE_PAGINATION_CONTROL, PAGINATION_CONTROL, PRODUCT_CARD_LINK,
};
use crate::renderer::{ElementHandle, ElementScript, PageRenderer, RenderSession, WaitState};

/// Progress of one catalog walk
#[derive(Debug, Default)]
pub struct PaginationState {
    seen_page_label: Option<String>,
    accumulated_links: Vec<ProductLink>,
}

impl PaginationState {
    pub fn record_links(&mut self, links: impl IntoIterator<Item = ProductLink>) {
        self.accumulated_links.extend(links);
    }

    /// Remember `label` as the current page. Returns `false` when it equals
    /// the label of the previous iteration, i.e. the last click went nowhere.
    pub fn advance(&mut self, label: &str) -> bool {
        if self.seen_page_label.as_deref() == Some(label) {
            return false;
        }
        self.seen_page_label = Some(label.to_string());
        true
    }

    #[must_use]
    pub fn seen_page_label(&self) -> Option<&str> {
        self.seen_page_label.as_deref()
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.accumulated_links.len()
    }

    #[must_use]
    pub fn into_links(self) -> Vec<ProductLink> {
        self.accumulated_links
    }
}

/// Label of the control that follows page `label`.
///
/// # Errors
/// [`ScrapeError::NonNumericPageLabel`] when `label` is not an integer.
pub fn next_page_label(label: &str) -> ScrapeResult<String> {
    label
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_add(1))
        .map(|n| n.to_string())
        .ok_or_else(|| ScrapeError::NonNumericPageLabel(label.to_string()))
}

pub struct PaginationCrawler<R: PageRenderer> {
    renderer: Arc<R>,
    config: Arc<ScrapeConfig>,
}

impl<R: PageRenderer> PaginationCrawler<R> {
    pub fn new(renderer: Arc<R>, config: Arc<ScrapeConfig>) -> Self {
        Self { renderer, config }
    }

    /// Collect every product link of the catalog, in page order.
    ///
    /// The session is closed before returning, on success and failure alike.
    pub async fn crawl(&self) -> ScrapeResult<Vec<ProductLink>> {
        let mut session = self
            .renderer
            .launch()
            .await
            .map_err(ScrapeError::BrowserLaunch)?;

        let result = self.walk(&session).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close pagination session: {e}");
        }
        result
    }

    async fn walk(&self, session: &R::Session) -> ScrapeResult<Vec<ProductLink>> {
        let catalog_url = self.config.catalog_url();

        session.set_headers(&self.config.headers().to_map()).await?;
        session
            .goto(catalog_url, self.config.navigation_timeout())
            .await
            .map_err(ScrapeError::CatalogNavigation)?;

        let timeout = self.config.pagination_timeout();
        session
            .wait_for_selector(PAGINATION_CONTROL, WaitState::Visible, timeout)
            .await
            .map_err(|source| ScrapeError::PaginationNotVisible { timeout, source })?;

        let mut state = PaginationState::default();
        loop {
            let links = session
                .eval_on_selector_all(PRODUCT_CARD_LINK, ElementScript::Href)
                .await?;
            debug!("Collected {} links", links.len());
            state.record_links(links);

            let label = active_page_label(session)
                .await?
                .ok_or(ScrapeError::ActivePageMissing)?;

            if !state.advance(&label) {
                debug!("Page label stuck at {label}, stopping");
                break;
            }

            let next = next_page_label(&label)?;
            let Some(control) = find_page_control(session, &next).await? else {
                debug!("No control for page {next}, last page reached");
                break;
            };

            debug!("Moving from page {label} to page {next}");
            control.click().await?;
            self.settle(session, &label).await;
        }

        info!(
            "Pagination finished at page {}: {} links",
            state.seen_page_label().unwrap_or("?"),
            state.link_count()
        );
        Ok(state.into_links())
    }

    /// Wait for the listing to re-render after a click.
    ///
    /// Never fails: if the label does not change within the settle delay the
    /// next iteration sees the old label and the walk ends there.
    async fn settle(&self, session: &R::Session, previous_label: &str) {
        let delay = self.config.settle_delay();
        match self.config.settle_strategy() {
            SettleStrategy::FixedDelay => sleep(delay).await,
            SettleStrategy::LabelChange => {
                let deadline = Instant::now() + delay;
                loop {
                    if let Ok(Some(label)) = active_page_label(session).await
                        && label != previous_label
                    {
                        return;
                    }
                    if Instant::now() >= deadline {
                        debug!("Page label still {previous_label} after {delay:?}");
                        return;
                    }
                    sleep(self.config.settle_poll_interval()).await;
                }
            }
        }
    }
}

async fn active_page_label<S: RenderSession>(session: &S) -> ScrapeResult<Option<String>> {
    match session.query_selector(ACTIVE_PAGINATION_CONTROL).await? {
        Some(control) => Ok(Some(control.inner_text().await?.trim().to_string())),
        None => Ok(None),
    }
}

async fn find_page_control<S: RenderSession>(
    session: &S,
    label: &str,
) -> ScrapeResult<Option<S::Element>> {
    for control in session.query_selector_all(PAGINATION_CONTROL).await? {
        if control.inner_text().await?.trim() == label {
            return Ok(Some(control));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_label_increments() {
        assert_eq!(next_page_label("1").unwrap(), "2");
        assert_eq!(next_page_label(" 9\n").unwrap(), "10");
    }

    #[test]
    fn non_numeric_label_is_rejected() {
        assert!(matches!(
            next_page_label("Siguiente"),
            Err(ScrapeError::NonNumericPageLabel(label)) if label == "Siguiente"
        ));
        assert!(next_page_label("").is_err());
    }

    #[test]
    fn repeated_label_stops_advance() {
        let mut state = PaginationState::default();
        assert!(state.advance("1"));
        assert!(state.advance("2"));
        assert!(!state.advance("2"));
        assert_eq!(state.seen_page_label(), Some("2"));
    }
}
