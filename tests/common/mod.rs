//! Test utilities for the entel_scrape test suite
//!
//! `FakeRenderer` is an in-memory stand-in for Chrome. It answers the exact
//! selectors the scraper uses against a scripted catalog and a set of
//! product pages, and counts launches, clicks and closed sessions.

#![allow(dead_code)]

use async_trait::async_trait;
use entel_scrape::config::ScrapeConfig;
use entel_scrape::page_extractor::selectors::{
    ACTIVE_PAGINATION_CONTROL, ACTIVE_TAB_PRICE_TITLE, BRAND, FEATURE_ITEM, FEATURE_NAME,
    FEATURE_VALUE, INACTIVE_TAB_PRICE_TITLE, MODEL, OUT_OF_STOCK, PAGINATION_CONTROL,
    PRODUCT_CARD_LINK,
};
use entel_scrape::renderer::{
    ElementHandle, ElementScript, PageRenderer, RenderError, RenderResult, RenderSession,
    WaitState,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub const CATALOG_URL: &str = "https://shop.test/catalogo";

/// Config with test-sized timings
pub fn test_config() -> ScrapeConfig {
    ScrapeConfig::builder()
        .catalog_url(CATALOG_URL)
        .workers(4)
        .pagination_timeout(Duration::from_millis(200))
        .navigation_timeout(Duration::from_secs(1))
        .settle_delay(Duration::from_millis(50))
        .settle_poll_interval(Duration::from_millis(5))
        .build()
        .unwrap()
}

/// One rendered listing page
#[derive(Debug, Clone)]
pub struct CatalogPage {
    /// Text of the active pagination control, `None` for no active control
    pub label: Option<String>,
    pub links: Vec<String>,
    /// Pagination controls: label and the page index a click leads to.
    /// `None` means the click does nothing.
    pub controls: Vec<(String, Option<usize>)>,
}

/// `pages` listing pages with `links_per_page` cards each, labelled
/// "1".."pages", every control pointing at its page.
pub fn linear_catalog(pages: usize, links_per_page: usize) -> Vec<CatalogPage> {
    let controls: Vec<(String, Option<usize>)> =
        (0..pages).map(|i| ((i + 1).to_string(), Some(i))).collect();
    (0..pages)
        .map(|page| CatalogPage {
            label: Some((page + 1).to_string()),
            links: (0..links_per_page)
                .map(|i| format!("https://shop.test/p{}/item{i}", page + 1))
                .collect(),
            controls: controls.clone(),
        })
        .collect()
}

/// Title/price pairs of one `.container-price` block, in document order.
/// A `None` price is a title whose next sibling is not a price.
pub type PriceBlock = Vec<(String, Option<String>)>;

pub fn price_block(pairs: &[(&str, Option<&str>)]) -> PriceBlock {
    pairs
        .iter()
        .map(|(title, price)| (title.to_string(), price.map(str::to_string)))
        .collect()
}

/// One rendered product detail page
#[derive(Debug, Clone, Default)]
pub struct FakeProduct {
    pub out_of_stock: bool,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Price blocks of the active tab
    pub active_tab: Vec<PriceBlock>,
    /// Price blocks of the other tabs
    pub inactive_tab: Vec<PriceBlock>,
    /// `(name, value)` feature items
    pub features: Vec<(Option<String>, Option<String>)>,
}

impl FakeProduct {
    /// A fully populated product page
    pub fn complete(brand: &str, model: &str) -> Self {
        Self {
            out_of_stock: false,
            brand: Some(brand.to_string()),
            model: Some(model.to_string()),
            active_tab: vec![price_block(&[
                ("Cuota inicial", Some("S/0")),
                ("Renovación", Some("S/1,299")),
            ])],
            inactive_tab: vec![price_block(&[("Equipo Liberado", Some("S/2,499"))])],
            features: vec![
                (Some("RAM".to_string()), Some("8GB".to_string())),
                (Some("Color".to_string()), Some("Negro".to_string())),
            ],
        }
    }

    pub fn out_of_stock() -> Self {
        Self {
            out_of_stock: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub clicks: AtomicUsize,
    pub navigations: AtomicUsize,
}

#[derive(Debug, Default)]
struct Site {
    pages: Vec<CatalogPage>,
    products: HashMap<String, FakeProduct>,
    failing: HashSet<String>,
    pagination_hidden: bool,
    fail_launch: bool,
    /// Launches still due to fail before they start succeeding
    failing_launches: AtomicUsize,
}

#[derive(Debug, Clone)]
pub struct FakeRenderer {
    site: Arc<Site>,
    pub counters: Arc<Counters>,
    pub headers_seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl FakeRenderer {
    pub fn builder() -> FakeRendererBuilder {
        FakeRendererBuilder::default()
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.counters.clicks.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct FakeRendererBuilder {
    site: Site,
}

impl FakeRendererBuilder {
    pub fn catalog(mut self, pages: Vec<CatalogPage>) -> Self {
        self.site.pages = pages;
        self
    }

    pub fn product(mut self, url: impl Into<String>, product: FakeProduct) -> Self {
        self.site.products.insert(url.into(), product);
        self
    }

    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.site.failing.insert(url.into());
        self
    }

    pub fn pagination_hidden(mut self) -> Self {
        self.site.pagination_hidden = true;
        self
    }

    pub fn fail_launch(mut self) -> Self {
        self.site.fail_launch = true;
        self
    }

    /// Fail the first `n` launches, then launch normally
    pub fn fail_launches(self, n: usize) -> Self {
        self.site.failing_launches.store(n, Ordering::SeqCst);
        self
    }

    pub fn build(self) -> FakeRenderer {
        FakeRenderer {
            site: Arc::new(self.site),
            counters: Arc::new(Counters::default()),
            headers_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    type Session = FakeSession;

    async fn launch(&self) -> RenderResult<FakeSession> {
        let scripted_failure = self
            .site
            .failing_launches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if self.site.fail_launch || scripted_failure {
            return Err(RenderError::Launch("no browser in test".to_string()));
        }
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            site: Arc::clone(&self.site),
            counters: Arc::clone(&self.counters),
            headers_seen: Arc::clone(&self.headers_seen),
            location: Arc::new(Mutex::new(Location::Blank)),
            closed: AtomicBool::new(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Location {
    Blank,
    Catalog(usize),
    Product(String),
}

pub struct FakeSession {
    site: Arc<Site>,
    counters: Arc<Counters>,
    headers_seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
    location: Arc<Mutex<Location>>,
    closed: AtomicBool,
}

impl FakeSession {
    fn ensure_open(&self) -> RenderResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(RenderError::Closed)
        } else {
            Ok(())
        }
    }

    fn element(&self, node: Node) -> FakeElement {
        FakeElement {
            node,
            location: Arc::clone(&self.location),
            counters: Arc::clone(&self.counters),
        }
    }

    fn matches(&self, selector: &str) -> Vec<FakeElement> {
        let location = self.location.lock().clone();
        let nodes: Vec<Node> = match location {
            Location::Blank => Vec::new(),
            Location::Catalog(index) => {
                let page = &self.site.pages[index];
                match selector {
                    ACTIVE_PAGINATION_CONTROL => {
                        page.label.iter().map(|l| Node::Text(l.clone())).collect()
                    }
                    PAGINATION_CONTROL => page
                        .controls
                        .iter()
                        .map(|(label, target)| Node::Control {
                            label: label.clone(),
                            target: *target,
                        })
                        .collect(),
                    PRODUCT_CARD_LINK => page.links.iter().map(|h| Node::Card(h.clone())).collect(),
                    _ => Vec::new(),
                }
            }
            Location::Product(url) => {
                let product = &self.site.products[&url];
                let text = |value: &Option<String>| -> Vec<Node> {
                    value.iter().map(|v| Node::Text(v.clone())).collect()
                };
                let titles = |tab: &[PriceBlock]| -> Vec<Node> {
                    tab.iter()
                        .flatten()
                        .map(|(title, price)| Node::PriceTitle {
                            title: title.clone(),
                            price: price.clone(),
                        })
                        .collect()
                };
                match selector {
                    OUT_OF_STOCK if product.out_of_stock => vec![Node::Text(String::new())],
                    BRAND => text(&product.brand),
                    MODEL => text(&product.model),
                    ACTIVE_TAB_PRICE_TITLE => titles(&product.active_tab),
                    INACTIVE_TAB_PRICE_TITLE => titles(&product.inactive_tab),
                    FEATURE_ITEM => product
                        .features
                        .iter()
                        .map(|(name, value)| Node::Feature {
                            name: name.clone(),
                            value: value.clone(),
                        })
                        .collect(),
                    _ => Vec::new(),
                }
            }
        };
        nodes.into_iter().map(|node| self.element(node)).collect()
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    type Element = FakeElement;

    async fn set_headers(&self, headers: &HashMap<String, String>) -> RenderResult<()> {
        self.ensure_open()?;
        self.headers_seen.lock().push(headers.clone());
        Ok(())
    }

    async fn goto(&self, url: &str, _timeout: Duration) -> RenderResult<()> {
        self.ensure_open()?;
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        // Let other workers interleave as they would on real page loads
        tokio::task::yield_now().await;

        let next = if self.site.failing.contains(url) {
            None
        } else if url == CATALOG_URL && !self.site.pages.is_empty() {
            Some(Location::Catalog(0))
        } else if self.site.products.contains_key(url) {
            Some(Location::Product(url.to_string()))
        } else {
            None
        };

        match next {
            Some(location) => {
                *self.location.lock() = location;
                Ok(())
            }
            None => Err(RenderError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            }),
        }
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _state: WaitState,
        timeout: Duration,
    ) -> RenderResult<()> {
        self.ensure_open()?;
        let hidden = selector == PAGINATION_CONTROL && self.site.pagination_hidden;
        if hidden || self.matches(selector).is_empty() {
            return Err(RenderError::Timeout {
                operation: format!("Waiting for '{selector}'"),
                timeout,
            });
        }
        Ok(())
    }

    async fn query_selector(&self, selector: &str) -> RenderResult<Option<FakeElement>> {
        self.ensure_open()?;
        Ok(self.matches(selector).into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> RenderResult<Vec<FakeElement>> {
        self.ensure_open()?;
        Ok(self.matches(selector))
    }

    async fn close(&mut self) -> RenderResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Card(String),
    Control { label: String, target: Option<usize> },
    /// A `.select-title` and the `.selected-price` sibling after it, if any
    PriceTitle { title: String, price: Option<String> },
    Feature { name: Option<String>, value: Option<String> },
}

pub struct FakeElement {
    node: Node,
    location: Arc<Mutex<Location>>,
    counters: Arc<Counters>,
}

impl FakeElement {
    fn child(&self, node: Node) -> Self {
        Self {
            node,
            location: Arc::clone(&self.location),
            counters: Arc::clone(&self.counters),
        }
    }
}

#[async_trait]
impl ElementHandle for FakeElement {
    async fn inner_text(&self) -> RenderResult<String> {
        Ok(match &self.node {
            Node::Text(text) => text.clone(),
            Node::Control { label, .. } | Node::PriceTitle { title: label, .. } => label.clone(),
            Node::Card(_) | Node::Feature { .. } => String::new(),
        })
    }

    async fn click(&self) -> RenderResult<()> {
        self.counters.clicks.fetch_add(1, Ordering::SeqCst);
        if let Node::Control {
            target: Some(index),
            ..
        } = &self.node
        {
            *self.location.lock() = Location::Catalog(*index);
        }
        Ok(())
    }

    async fn query_selector(&self, selector: &str) -> RenderResult<Option<Self>> {
        let found = match (&self.node, selector) {
            (Node::Feature { name, .. }, FEATURE_NAME) => name.clone(),
            (Node::Feature { value, .. }, FEATURE_VALUE) => value.clone(),
            _ => None,
        };
        Ok(found.map(|text| self.child(Node::Text(text))))
    }

    async fn eval(&self, script: ElementScript) -> RenderResult<String> {
        match (script, &self.node) {
            (ElementScript::Href, Node::Card(href)) => Ok(href.clone()),
            (ElementScript::Href, _) => Ok(String::new()),
            (ElementScript::InnerText, _) => self.inner_text().await,
            (ElementScript::SelectedPriceSibling, Node::PriceTitle { price, .. }) => {
                Ok(price.clone().unwrap_or_default())
            }
            (ElementScript::SelectedPriceSibling, _) => Ok(String::new()),
        }
    }
}
