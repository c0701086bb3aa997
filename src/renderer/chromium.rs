//! Chrome-backed renderer over the DevTools protocol (chromiumoxide)
//!
//! Every session owns a dedicated Chrome process with its own profile
//! directory and a single tab. Nothing is shared between sessions, so a
//! crashed or wedged product page only takes down the worker that owns it.

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::js_scripts::{DOCUMENT_SETTLED_JS, IS_VISIBLE_FN, MARK_STALE_DOCUMENT_JS};
use super::page_timeout::with_page_timeout;
use super::{ElementHandle, ElementScript, PageRenderer, RenderError, RenderResult, RenderSession, WaitState};
use crate::browser_profile::create_unique_profile;
use crate::browser_setup::{launch_browser, resolve_browser_executable};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn protocol_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Protocol(e.to_string())
}

/// Launches one headless (or headed) Chrome per session
///
/// The Chrome executable is located (or downloaded) by the first launch and
/// shared by every later one, including clones of the renderer.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    headless: bool,
    executable: Arc<OnceCell<PathBuf>>,
}

impl ChromiumRenderer {
    #[must_use]
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            executable: Arc::new(OnceCell::new()),
        }
    }

    /// Use `path` as the Chrome executable instead of searching for one
    #[must_use]
    pub fn with_executable(headless: bool, path: impl Into<PathBuf>) -> Self {
        Self {
            headless,
            executable: Arc::new(OnceCell::new_with(Some(path.into()))),
        }
    }

    /// Executable path, running `resolve` only if no launch has resolved it yet.
    ///
    /// Concurrent callers wait for the one resolution in flight; a failed
    /// resolution leaves the cell empty so the next launch retries.
    async fn executable_with<F, Fut>(&self, resolve: F) -> anyhow::Result<&Path>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<PathBuf>>,
    {
        self.executable
            .get_or_try_init(resolve)
            .await
            .map(PathBuf::as_path)
    }
}

impl Default for ChromiumRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    type Session = ChromiumSession;

    async fn launch(&self) -> RenderResult<ChromiumSession> {
        let launch_error = |e: anyhow::Error| RenderError::Launch(format!("{e:#}"));

        let chrome_path = self
            .executable_with(resolve_browser_executable)
            .await
            .map_err(launch_error)?
            .to_path_buf();

        // Until the browser is up the profile cleans up after itself on drop
        let profile = create_unique_profile().map_err(launch_error)?;
        let (browser, handler) =
            launch_browser(self.headless, profile.path().to_path_buf(), chrome_path)
                .await
                .map_err(launch_error)?;

        let wrapper = BrowserWrapper::new(browser, handler, profile.into_path());
        let blank_page = wrapper.browser().new_page("about:blank").await;
        let page = match blank_page {
            Ok(page) => page,
            Err(e) => {
                if let Err(shutdown_err) = wrapper.shutdown().await {
                    warn!("Failed to shut down browser after page error: {shutdown_err}");
                }
                return Err(RenderError::Launch(format!(
                    "Failed to create blank page: {e}"
                )));
            }
        };

        debug!("Chromium session ready");
        Ok(ChromiumSession {
            page: Some(page),
            browser: Some(wrapper),
        })
    }
}

/// Browser process plus its CDP handler task and profile directory
///
/// The handler must be aborted once the browser is gone or it keeps
/// polling a dead websocket forever.
struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close Chrome, wait for the process to exit, then remove the profile.
    ///
    /// Order matters: Chrome holds file handles in the profile until it exits.
    async fn shutdown(mut self) -> RenderResult<()> {
        let mut first_error = None;

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {e}");
            first_error.get_or_insert(protocol_error(e));
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
            first_error.get_or_insert(protocol_error(e));
        }
        self.cleanup_temp_dir();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            log::debug!("Cleaning up profile directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                log::warn!(
                    "Failed to clean up profile directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        // Reached without shutdown() only on panics or early returns
        if self.user_data_dir.is_some() {
            self.cleanup_temp_dir();
        }
    }
}

/// One Chrome process with one tab
pub struct ChromiumSession {
    page: Option<Page>,
    browser: Option<BrowserWrapper>,
}

impl ChromiumSession {
    fn page(&self) -> RenderResult<&Page> {
        self.page.as_ref().ok_or(RenderError::Closed)
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    type Element = ChromiumElement;

    async fn set_headers(&self, headers: &HashMap<String, String>) -> RenderResult<()> {
        let value = serde_json::to_value(headers).map_err(protocol_error)?;
        self.page()?
            .execute(SetExtraHttpHeadersParams::new(Headers::new(value)))
            .await
            .map_err(protocol_error)?;
        Ok(())
    }

    /// chromiumoxide gives up on a navigation after its own fixed request
    /// timeout. Within our deadline that only means the page is still
    /// loading, so readiness is polled until the deadline instead.
    async fn goto(&self, url: &str, timeout: Duration) -> RenderResult<()> {
        let page = self.page()?;
        let navigate = async {
            if let Err(e) = page.evaluate(MARK_STALE_DOCUMENT_JS).await {
                debug!("Could not tag current document before navigation: {e}");
            }
            match page.goto(url).await {
                Ok(_) => Ok(()),
                Err(e) if still_loading(&e) => {
                    debug!("Navigation to {url} outlived the CDP request timeout, polling");
                    wait_for_document(page).await;
                    Ok(())
                }
                Err(e) => Err(RenderError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                }),
            }
        };
        with_page_timeout(navigate, timeout, "Navigation").await
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        state: WaitState,
        timeout: Duration,
    ) -> RenderResult<()> {
        let page = self.page()?;
        let poll = async {
            loop {
                // Lookup errors while the DOM is still being rebuilt are
                // indistinguishable from "not there yet"; keep polling.
                if let Ok(elements) = page.find_elements(selector).await {
                    for element in &elements {
                        let ready = match state {
                            WaitState::Attached => true,
                            WaitState::Visible => is_visible(element).await,
                        };
                        if ready {
                            return Ok(());
                        }
                    }
                }
                tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
            }
        };
        with_page_timeout(poll, timeout, &format!("Waiting for '{selector}'")).await
    }

    async fn query_selector(&self, selector: &str) -> RenderResult<Option<ChromiumElement>> {
        let elements = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(protocol_error)?;
        Ok(elements.into_iter().next().map(ChromiumElement))
    }

    async fn query_selector_all(&self, selector: &str) -> RenderResult<Vec<ChromiumElement>> {
        let elements = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(protocol_error)?;
        Ok(elements.into_iter().map(ChromiumElement).collect())
    }

    async fn close(&mut self) -> RenderResult<()> {
        if let Some(page) = self.page.take()
            && let Err(e) = page.close().await
        {
            debug!("Failed to close page (browser shutdown follows): {e}");
        }
        match self.browser.take() {
            Some(wrapper) => {
                let result = wrapper.shutdown().await;
                info!("Chromium session closed");
                result
            }
            None => Ok(()),
        }
    }
}

/// A CDP request timeout during navigation, as opposed to a failed load
fn still_loading(error: &CdpError) -> bool {
    matches!(error, CdpError::Timeout)
}

/// Poll until the tab shows a fully loaded document that is not the one
/// tagged before navigating. Bounded by the caller's timeout.
async fn wait_for_document(page: &Page) {
    loop {
        let settled = match page.evaluate(DOCUMENT_SETTLED_JS).await {
            Ok(result) => result.into_value::<bool>().unwrap_or(false),
            Err(_) => false,
        };
        if settled {
            return;
        }
        tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
    }
}

async fn is_visible(element: &Element) -> bool {
    match element.call_js_fn(IS_VISIBLE_FN, false).await {
        Ok(returns) => returns
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// DOM element inside a [`ChromiumSession`]
pub struct ChromiumElement(Element);

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn inner_text(&self) -> RenderResult<String> {
        self.0
            .inner_text()
            .await
            .map(Option::unwrap_or_default)
            .map_err(protocol_error)
    }

    async fn click(&self) -> RenderResult<()> {
        self.0.click().await.map(|_| ()).map_err(protocol_error)
    }

    async fn query_selector(&self, selector: &str) -> RenderResult<Option<Self>> {
        let elements = self.0.find_elements(selector).await.map_err(protocol_error)?;
        Ok(elements.into_iter().next().map(ChromiumElement))
    }

    async fn eval(&self, script: ElementScript) -> RenderResult<String> {
        let returns = self
            .0
            .call_js_fn(script.function_declaration(), false)
            .await
            .map_err(protocol_error)?;

        if let Some(details) = returns.exception_details {
            return Err(RenderError::Script(details.text));
        }

        match returns.result.value {
            Some(serde_json::Value::String(s)) => Ok(s),
            None | Some(serde_json::Value::Null) => Ok(String::new()),
            Some(other) => Err(RenderError::Script(format!(
                "{script:?} returned {other}"
            ))),
        }
    }
}
