//! JavaScript run in the page over CDP
//!
//! The `*_FN` constants are passed to `Runtime.callFunctionOn` with the
//! element bound as `this`, so they must stay plain `function() { ... }`
//! declarations. The `*_JS` constants are page-level expressions.

use super::ElementScript;

pub const INNER_TEXT_FN: &str = "function() { return this.innerText; }";

pub const HREF_FN: &str = "function() { return this.href; }";

/// Text of the adjacent price, the `.select-title + .selected-price` pair
pub const SELECTED_PRICE_SIBLING_FN: &str = r"
    function() {
        const sibling = this.nextElementSibling;
        return sibling && sibling.matches('.selected-price') ? sibling.innerText : null;
    }
";

/// Tags the current document so a later readiness check can tell it apart
/// from the one being navigated to.
pub const MARK_STALE_DOCUMENT_JS: &str = "window.__entelScrapeStale = true";

/// True once the new document has replaced the tagged one and finished loading
pub const DOCUMENT_SETTLED_JS: &str =
    "!window.__entelScrapeStale && document.readyState === 'complete'";

/// Mirrors the "visible" notion used by browser automation tools: rendered,
/// not hidden by style, and with a non-empty bounding box.
pub const IS_VISIBLE_FN: &str = r"
    function() {
        const style = window.getComputedStyle(this);
        if (!style || style.visibility === 'hidden' || style.display === 'none') {
            return false;
        }
        const rect = this.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    }
";

impl ElementScript {
    #[must_use]
    pub const fn function_declaration(self) -> &'static str {
        match self {
            Self::InnerText => INNER_TEXT_FN,
            Self::Href => HREF_FN,
            Self::SelectedPriceSibling => SELECTED_PRICE_SIBLING_FN,
        }
    }
}
