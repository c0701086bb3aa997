//! Configuration module for catalog scraping
//!
//! This module provides the `ScrapeConfig` struct and its type-safe builder
//! with validation and the Entel catalog defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{ScrapeConfigBuilder, WithCatalogUrl};
pub use types::{RequestHeaders, ScrapeConfig, SettleStrategy};
