//! Shared configuration constants for imagescrape
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default number of simultaneous image downloads
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 5;

/// Default number of attempts per image before it is marked failed
pub const DEFAULT_MAX_DOWNLOAD_RETRIES: u32 = 3;

/// Total timeout for one download attempt (connect + headers + body)
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Base delay for exponential backoff between download attempts.
///
/// Attempt `n` (0-indexed) sleeps `base * 2^n` before the next try.
pub const DEFAULT_BACKOFF_BASE_MILLIS: u64 = 1_000;

/// Upper bound for the best-effort network idle wait
pub const DEFAULT_NETWORK_IDLE_TIMEOUT_SECS: u64 = 10;

/// Fixed grace delay for lazy-loaded images after the idle wait
pub const DEFAULT_LAZY_LOAD_GRACE_MILLIS: u64 = 2_000;

/// Number of full navigation rounds before the run is abandoned
pub const DEFAULT_NAVIGATION_RETRIES: u32 = 3;

/// Delay after a successful navigation so client-side rendering can start
pub const DEFAULT_POST_NAVIGATION_SETTLE_MILLIS: u64 = 2_000;

/// Quality-upgrade target for `w_<n>` / `h_<n>` path tokens
pub const HIGH_RES_DIMENSION: u32 = 2048;

/// Query suffix appended to Shopify CDN image URLs
///
/// Shopify serves up to 4096px wide; `format=auto` lets the CDN pick webp/avif.
pub const SHOPIFY_QUALITY_PARAMS: &str = "width=4096&quality=100&format=auto";

/// Name of the run summary document written next to the images
pub const METADATA_FILENAME: &str = "metadata.json";

/// Name of the debug log written inside the output directory
pub const LOG_FILENAME: &str = "scraper.log";

/// Default target page when no URL is given on the command line
pub const DEFAULT_START_URL: &str = "https://www.layers.shop/products/build-your-skin";

/// Default output directory for images and metadata
pub const DEFAULT_OUTPUT_DIR: &str = "scraped_images";

/// Chrome user agent string used by both the browser and the downloader
///
/// Desktop macOS Chrome keeps CDNs serving full-size desktop assets.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Image file extensions recognised in URL paths
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".webp", ".avif"];
