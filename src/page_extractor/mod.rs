//! Product page extraction
//!
//! Selectors, the record type and the extractor that turns one rendered
//! product page into a [`ProductRecord`].

// Sub-modules
pub mod extractors;
pub mod product;
pub mod selectors;

// Re-exports for public API
pub use extractors::{ExtractError, ProductExtractor, ProductField, join_features, normalize_renewal_price};
pub use product::{ProductLink, ProductRecord};
