//! CSS selectors for the Entel catalog and product pages
//!
//! Catalog markup changes every few months; keep every selector here so a
//! site update is a one-file change.

/// Every numbered pagination control
pub const PAGINATION_CONTROL: &str = ".pagination-block__numbers .action-triggerer";

/// The control of the page currently shown
pub const ACTIVE_PAGINATION_CONTROL: &str = ".pagination-block__numbers .action-triggerer.active";

/// Anchors of the product cards on a listing page
pub const PRODUCT_CARD_LINK: &str = "article.card-plp a";

/// Present only when the product cannot be ordered
pub const OUT_OF_STOCK: &str = ".noStock-container";

pub const BRAND: &str = ".equipment-brand";
pub const MODEL: &str = ".equipment-title";

/// Price titles of the selected (renewal) plan tab. A price block may hold
/// several title/price pairs; each price is the title's next sibling.
pub const ACTIVE_TAB_PRICE_TITLE: &str = ".container-tab.active .container-price .select-title";

/// Price titles of the unselected tabs, where the unlocked price lives
pub const INACTIVE_TAB_PRICE_TITLE: &str =
    ".container-tab:not(.active) .container-price .select-title";

/// Sibling that holds the amount next to a price title
pub const SELECTED_PRICE: &str = ".selected-price";

pub const RENEWAL_PRICE_LABEL: &str = "Renovación";
pub const UNLOCKED_PRICE_LABEL: &str = "Equipo Liberado";

pub const FEATURE_ITEM: &str = ".main-features__list .main-features__item";

/// Feature name, relative to the item
pub const FEATURE_NAME: &str = ".component-name";

/// Feature value, relative to the item
pub const FEATURE_VALUE: &str = "span:last-child";
