//! Product page field extraction
//!
//! Navigation failures propagate. Once the page is loaded every field is
//! read independently and a failed field degrades to its fallback value, so
//! a half-rendered page still yields a record.

use std::time::Duration;
use tracing::{debug, info};

use super::product::ProductRecord;
use super::selectors::{
    ACTIVE_TAB_PRICE_TITLE, BRAND, FEATURE_ITEM, FEATURE_NAME, FEATURE_VALUE,
    INACTIVE_TAB_PRICE_TITLE, MODEL, OUT_OF_STOCK, RENEWAL_PRICE_LABEL, SELECTED_PRICE,
    UNLOCKED_PRICE_LABEL,
};
use crate::config::ScrapeConfig;
use crate::renderer::{ElementHandle, ElementScript, RenderError, RenderResult, RenderSession};
use crate::utils::{CURRENCY_MARKER, NOT_AVAILABLE};

/// Why a single field could not be read
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("No element matches '{0}'")]
    Missing(String),

    #[error("No price block labelled '{0}'")]
    LabelNotFound(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Output fields that degrade independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Brand,
    Model,
    RenewalPrice,
    UnlockedPrice,
    Features,
}

impl ProductField {
    /// Value stored when the field cannot be read
    #[must_use]
    pub const fn fallback(self) -> &'static str {
        match self {
            Self::Brand | Self::Model | Self::Features => "",
            Self::RenewalPrice | Self::UnlockedPrice => NOT_AVAILABLE,
        }
    }

    fn resolve(self, url: &str, result: Result<String, ExtractError>) -> String {
        result.unwrap_or_else(|e| {
            debug!("{self:?} unavailable on {url}: {e}");
            self.fallback().to_string()
        })
    }
}

/// Keep the text after the last currency marker and re-prefix it.
///
/// `"Desde S/1,299"` and `"1,299"` both become `"S/1,299"`.
#[must_use]
pub fn normalize_renewal_price(raw: &str) -> String {
    let amount = raw.rsplit(CURRENCY_MARKER).next().unwrap_or(raw);
    format!("{CURRENCY_MARKER}{amount}")
}

/// Render feature pairs as `"name: value, name: value"`.
#[must_use]
pub fn join_features<N, V>(features: &[(N, V)]) -> String
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    features
        .iter()
        .map(|(name, value)| format!("{}: {}", name.as_ref(), value.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reads one product page into a [`ProductRecord`]
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    navigation_timeout: Duration,
}

impl ProductExtractor {
    #[must_use]
    pub fn new(navigation_timeout: Duration) -> Self {
        Self { navigation_timeout }
    }

    #[must_use]
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(config.navigation_timeout())
    }

    /// Navigate `session` to `url` and read every field.
    ///
    /// # Errors
    /// Only navigation and the out-of-stock check can fail; field errors
    /// degrade to [`ProductField::fallback`].
    pub async fn extract<S: RenderSession>(
        &self,
        session: &S,
        url: &str,
    ) -> RenderResult<ProductRecord> {
        session.goto(url, self.navigation_timeout).await?;

        if session.query_selector(OUT_OF_STOCK).await?.is_some() {
            info!("Product not available at: {url}");
            return Ok(ProductRecord::out_of_stock(url));
        }

        let brand = ProductField::Brand.resolve(url, text_of(session, BRAND).await);
        let model = ProductField::Model.resolve(url, text_of(session, MODEL).await);
        let renewal = ProductField::RenewalPrice.resolve(
            url,
            labelled_price(session, ACTIVE_TAB_PRICE_TITLE, RENEWAL_PRICE_LABEL).await,
        );
        let unlocked_price = ProductField::UnlockedPrice.resolve(
            url,
            labelled_price(session, INACTIVE_TAB_PRICE_TITLE, UNLOCKED_PRICE_LABEL).await,
        );
        let features = ProductField::Features.resolve(url, features_of(session).await);

        Ok(ProductRecord {
            link: url.to_string(),
            brand,
            model,
            renewal_price: normalize_renewal_price(&renewal),
            unlocked_price,
            features,
        })
    }
}

async fn text_of<S: RenderSession>(session: &S, selector: &str) -> Result<String, ExtractError> {
    session
        .eval_on_selector(selector, ElementScript::InnerText)
        .await
        .map_err(|e| match e {
            RenderError::NotFound(selector) => ExtractError::Missing(selector),
            other => ExtractError::Render(other),
        })
}

/// Price right after the first title containing `label` (case-insensitive)
/// that has one, across every title matched by `titles`.
async fn labelled_price<S: RenderSession>(
    session: &S,
    titles: &str,
    label: &str,
) -> Result<String, ExtractError> {
    let wanted = label.to_lowercase();
    let mut labelled = false;

    for title in session.query_selector_all(titles).await? {
        if !title.inner_text().await?.to_lowercase().contains(&wanted) {
            continue;
        }
        labelled = true;
        let price = title.eval(ElementScript::SelectedPriceSibling).await?;
        if !price.is_empty() {
            return Ok(price);
        }
    }

    if labelled {
        Err(ExtractError::Missing(SELECTED_PRICE.to_string()))
    } else {
        Err(ExtractError::LabelNotFound(label.to_string()))
    }
}

/// All-or-nothing: one unreadable item drops the whole list.
async fn features_of<S: RenderSession>(session: &S) -> Result<String, ExtractError> {
    let items = session.query_selector_all(FEATURE_ITEM).await?;
    let mut pairs = Vec::with_capacity(items.len());
    for item in &items {
        let name = child_text(item, FEATURE_NAME).await?;
        let value = child_text(item, FEATURE_VALUE).await?;
        pairs.push((name, value));
    }
    Ok(join_features(&pairs))
}

async fn child_text<E: ElementHandle>(element: &E, selector: &str) -> Result<String, ExtractError> {
    match element.query_selector(selector).await? {
        Some(child) => Ok(child.inner_text().await?),
        None => Err(ExtractError::Missing(selector.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renewal_price_keeps_text_after_last_marker() {
        assert_eq!(normalize_renewal_price("S/1,299"), "S/1,299");
        assert_eq!(normalize_renewal_price("Antes S/1,599 Ahora S/1,299"), "S/1,299");
        assert_eq!(normalize_renewal_price("1,299"), "S/1,299");
    }

    #[test]
    fn missing_renewal_price_is_prefixed() {
        let fallback = ProductField::RenewalPrice.fallback();
        assert_eq!(normalize_renewal_price(fallback), "S/N/A");
    }

    #[test]
    fn features_join_in_order() {
        let features = [("RAM", "8GB"), ("Color", "Negro")];
        assert_eq!(join_features(&features), "RAM: 8GB, Color: Negro");
    }

    #[test]
    fn no_features_is_empty() {
        let features: [(&str, &str); 0] = [];
        assert_eq!(join_features(&features), "");
    }

    #[test]
    fn fallbacks_per_field() {
        assert_eq!(ProductField::Brand.fallback(), "");
        assert_eq!(ProductField::Model.fallback(), "");
        assert_eq!(ProductField::Features.fallback(), "");
        assert_eq!(ProductField::UnlockedPrice.fallback(), "N/A");
    }
}
