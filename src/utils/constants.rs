//! Shared configuration constants for entel_scrape
//!
//! Default values used by the config builder and the CLI so the two never
//! drift apart.

/// Default catalog listing: postpaid device renewal
pub const DEFAULT_CATALOG_URL: &str =
    "https://miportal.entel.pe/personas/catalogo/postpago/renovacion";

/// Referer sent with every request
///
/// The catalog backend serves the full listing only when the request looks
/// like it came from a product page inside the portal.
pub const DEFAULT_REFERER: &str = "https://miportal.entel.pe/personas/producto/equipos/prod640038?poId=PO_BSC_EQP_29347&modalidad=Renovacion&planId=PO_POS_OO_24428&oferta=regular&cuota=0&flow=equipos";

/// Chrome user agent string
///
/// Kept in lockstep with `DEFAULT_SEC_CH_UA` below.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Client hint brand list matching `CHROME_USER_AGENT`
pub const DEFAULT_SEC_CH_UA: &str =
    r#""Google Chrome";v="131", "Chromium";v="131", "Not_A Brand";v="24""#;

pub const DEFAULT_SEC_CH_UA_MOBILE: &str = "?0";

pub const DEFAULT_SEC_CH_UA_PLATFORM: &str = r#""Windows""#;

/// Default number of concurrent product workers
pub const DEFAULT_WORKERS: usize = 4;

/// How long the pagination control may take to appear: 10 seconds
///
/// Missing pagination means there is no catalog to walk, so this wait is
/// fatal for the whole run.
pub const DEFAULT_PAGINATION_TIMEOUT_SECS: u64 = 10;

/// Timeout for `goto()` on catalog and product pages: 100 seconds
///
/// Product pages pull several heavy bundles before the price tabs render;
/// anything shorter drops a noticeable share of products on slow links.
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 100;

/// Upper bound on the post-click settle wait: 2 seconds
pub const DEFAULT_SETTLE_MS: u64 = 2_000;

/// Poll interval while waiting for the active page label to change
pub const DEFAULT_SETTLE_POLL_MS: u64 = 100;

/// Prefix of the generated output file name
pub const OUTPUT_FILE_PREFIX: &str = "productos_entel";

/// Column delimiter of the CSV output
pub const CSV_DELIMITER: u8 = b';';

/// Sentinel for a field that could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// Currency marker used by the catalog (Peruvian sol)
pub const CURRENCY_MARKER: &str = "S/";
