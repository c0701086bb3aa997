//! Product data types

use serde::{Deserialize, Serialize};

use crate::utils::NOT_AVAILABLE;

/// Absolute URL of one product detail page
///
/// Produced by the pagination crawler, consumed exactly once from the work
/// queue. Duplicates across listing pages are kept as-is.
pub type ProductLink = String;

/// Fields scraped from one product page
///
/// Serialized names are the CSV column names, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub link: String,
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "modelo")]
    pub model: String,
    /// Always carries the currency prefix, `"S/N/A"` when absent
    #[serde(rename = "precio_renovacion")]
    pub renewal_price: String,
    #[serde(rename = "precio_liberado")]
    pub unlocked_price: String,
    /// `"name: value"` pairs joined by `", "`
    #[serde(rename = "caracteristicas")]
    pub features: String,
}

impl ProductRecord {
    /// CSV header, in serialization order
    pub const COLUMNS: [&'static str; 6] = [
        "link",
        "marca",
        "modelo",
        "precio_renovacion",
        "precio_liberado",
        "caracteristicas",
    ];

    /// Record for a product page that shows the out-of-stock banner
    #[must_use]
    pub fn out_of_stock(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            brand: NOT_AVAILABLE.to_string(),
            model: NOT_AVAILABLE.to_string(),
            renewal_price: NOT_AVAILABLE.to_string(),
            unlocked_price: NOT_AVAILABLE.to_string(),
            features: NOT_AVAILABLE.to_string(),
        }
    }
}
