//! Page rendering capability
//!
//! The crawl pipeline never talks to a browser directly. It drives a
//! [`PageRenderer`] that hands out isolated [`RenderSession`]s, each able to
//! load a URL and answer DOM queries. [`ChromiumRenderer`] is the production
//! implementation; tests substitute an in-memory catalog.

pub mod chromium;
pub mod js_scripts;
pub mod page_timeout;

pub use chromium::{ChromiumRenderer, ChromiumSession, ChromiumElement};
pub use page_timeout::with_page_timeout;

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Errors raised by a rendering session
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    /// The engine could not start a session at all
    #[error("Failed to launch rendering session: {0}")]
    Launch(String),

    #[error("{operation} timeout after {timeout:?}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    #[error("No element matches selector '{0}'")]
    NotFound(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Transport or protocol failure talking to the engine
    #[error("Renderer protocol error: {0}")]
    Protocol(String),

    /// A page script returned something other than a string
    #[error("Unexpected script result: {0}")]
    Script(String),

    #[error("Rendering session is closed")]
    Closed,
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Element state awaited by [`RenderSession::wait_for_selector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitState {
    /// Present in the DOM
    Attached,
    /// Present and rendered with a non-empty box
    #[default]
    Visible,
}

/// Read-only value extracted from an element by the page itself
///
/// A closed set rather than free-form JS so that every renderer, including
/// the in-memory one used in tests, can answer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementScript {
    /// `element.innerText`
    InnerText,
    /// `element.href`, resolved against the document base URL
    Href,
    /// `innerText` of the next sibling when it is a `.selected-price`,
    /// empty otherwise
    SelectedPriceSibling,
}

/// Factory for isolated rendering sessions
#[async_trait]
pub trait PageRenderer: Send + Sync + 'static {
    type Session: RenderSession + 'static;

    /// Start a new isolated session (one browser context).
    async fn launch(&self) -> RenderResult<Self::Session>;
}

/// One isolated browser-like context
#[async_trait]
pub trait RenderSession: Send + Sync {
    type Element: ElementHandle;

    /// Extra HTTP headers sent with every subsequent request.
    async fn set_headers(&self, headers: &HashMap<String, String>) -> RenderResult<()>;

    async fn goto(&self, url: &str, timeout: Duration) -> RenderResult<()>;

    async fn wait_for_selector(
        &self,
        selector: &str,
        state: WaitState,
        timeout: Duration,
    ) -> RenderResult<()>;

    async fn query_selector(&self, selector: &str) -> RenderResult<Option<Self::Element>>;

    async fn query_selector_all(&self, selector: &str) -> RenderResult<Vec<Self::Element>>;

    /// Evaluate `script` on the first match. Fails with
    /// [`RenderError::NotFound`] when nothing matches.
    async fn eval_on_selector(&self, selector: &str, script: ElementScript) -> RenderResult<String> {
        match self.query_selector(selector).await? {
            Some(element) => element.eval(script).await,
            None => Err(RenderError::NotFound(selector.to_string())),
        }
    }

    /// Evaluate `script` on every match, in document order.
    async fn eval_on_selector_all(
        &self,
        selector: &str,
        script: ElementScript,
    ) -> RenderResult<Vec<String>> {
        let elements = self.query_selector_all(selector).await?;
        let mut values = Vec::with_capacity(elements.len());
        for element in &elements {
            values.push(element.eval(script).await?);
        }
        Ok(values)
    }

    /// Release the session. Safe to call more than once.
    async fn close(&mut self) -> RenderResult<()>;
}

/// Handle to one DOM element inside a session
#[async_trait]
pub trait ElementHandle: Send + Sync + Sized {
    async fn inner_text(&self) -> RenderResult<String>;

    async fn click(&self) -> RenderResult<()>;

    /// First descendant matching `selector`.
    async fn query_selector(&self, selector: &str) -> RenderResult<Option<Self>>;

    async fn eval(&self, script: ElementScript) -> RenderResult<String>;
}
