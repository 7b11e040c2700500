//! Core configuration type for a scrape run

use std::path::PathBuf;
use std::time::Duration;

use crate::crawl_engine::navigation::WaitStrategy;

/// Main configuration struct for a scrape run
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Directory receiving images, `metadata.json` and the debug log.
    ///
    /// **INVARIANT:** Always an absolute path (normalized in builder).
    pub(crate) output_dir: PathBuf,
    pub(crate) start_url: String,
    pub(crate) headless: bool,
    pub(crate) user_agent: String,

    pub(crate) max_concurrent_downloads: usize,
    /// Attempts per image, including the first
    pub(crate) max_download_retries: u32,
    pub(crate) download_timeout: Duration,
    pub(crate) download_backoff_base: Duration,

    pub(crate) network_idle_timeout: Duration,
    pub(crate) lazy_load_grace: Duration,
    /// How long to wait for a brand/model picker to render
    pub(crate) device_picker_wait: Duration,

    pub(crate) navigation_retries: u32,
    pub(crate) navigation_strategies: Vec<(WaitStrategy, Duration)>,
    pub(crate) navigation_backoff_base: Duration,
    pub(crate) post_navigation_settle: Duration,

    /// Debug log destination; `None` means `<output_dir>/scraper.log`
    pub(crate) log_file: Option<PathBuf>,
    /// Chrome profile directory; `None` uses a per-process temp dir
    pub(crate) chrome_data_dir: Option<PathBuf>,
}
