//! Type-safe builder for `ScrapeConfig` using the typestate pattern
//!
//! `output_dir` then `start_url` must be supplied before `build()` becomes
//! available. Optional knobs can be set in any state.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::time::Duration;

use super::types::ScrapeConfig;
use crate::crawl_engine::crawl_types::{ScrapeError, ScrapeResult};
use crate::crawl_engine::navigation::{NavigationPolicy, WaitStrategy};
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_BACKOFF_BASE_MILLIS, DEFAULT_DOWNLOAD_TIMEOUT_SECS,
    DEFAULT_LAZY_LOAD_GRACE_MILLIS, DEFAULT_MAX_CONCURRENT_DOWNLOADS, DEFAULT_MAX_DOWNLOAD_RETRIES,
    DEFAULT_NETWORK_IDLE_TIMEOUT_SECS, is_valid_url,
};

// Type states for the builder
pub struct WithOutputDir;
pub struct WithStartUrl;

pub struct ScrapeConfigBuilder<State = ()> {
    output_dir: Option<PathBuf>,
    start_url: Option<String>,
    headless: bool,
    user_agent: String,
    max_concurrent_downloads: usize,
    max_download_retries: u32,
    download_timeout: Duration,
    download_backoff_base: Duration,
    network_idle_timeout: Duration,
    lazy_load_grace: Duration,
    device_picker_wait: Duration,
    navigation: NavigationPolicy,
    log_file: Option<PathBuf>,
    chrome_data_dir: Option<PathBuf>,
    _phantom: PhantomData<State>,
}

impl Default for ScrapeConfigBuilder<()> {
    fn default() -> Self {
        Self {
            output_dir: None,
            start_url: None,
            headless: true,
            user_agent: CHROME_USER_AGENT.to_string(),
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            max_download_retries: DEFAULT_MAX_DOWNLOAD_RETRIES,
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            download_backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MILLIS),
            network_idle_timeout: Duration::from_secs(DEFAULT_NETWORK_IDLE_TIMEOUT_SECS),
            lazy_load_grace: Duration::from_millis(DEFAULT_LAZY_LOAD_GRACE_MILLIS),
            device_picker_wait: Duration::from_secs(10),
            navigation: NavigationPolicy::default(),
            log_file: None,
            chrome_data_dir: None,
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfig {
    /// Create a builder for configuring a `ScrapeConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder::default()
    }
}

impl<State> ScrapeConfigBuilder<State> {
    fn into_state<Next>(self) -> ScrapeConfigBuilder<Next> {
        ScrapeConfigBuilder {
            output_dir: self.output_dir,
            start_url: self.start_url,
            headless: self.headless,
            user_agent: self.user_agent,
            max_concurrent_downloads: self.max_concurrent_downloads,
            max_download_retries: self.max_download_retries,
            download_timeout: self.download_timeout,
            download_backoff_base: self.download_backoff_base,
            network_idle_timeout: self.network_idle_timeout,
            lazy_load_grace: self.lazy_load_grace,
            device_picker_wait: self.device_picker_wait,
            navigation: self.navigation,
            log_file: self.log_file,
            chrome_data_dir: self.chrome_data_dir,
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfigBuilder<()> {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> ScrapeConfigBuilder<WithOutputDir> {
        self.output_dir = Some(dir.into());
        self.into_state()
    }
}

impl ScrapeConfigBuilder<WithOutputDir> {
    /// Page to scrape; a missing scheme defaults to `https://`
    pub fn start_url(mut self, url: impl Into<String>) -> ScrapeConfigBuilder<WithStartUrl> {
        let url_string = url.into();
        let normalized_url = if url_string.contains("://") {
            url_string
        } else {
            format!("https://{url_string}")
        };

        self.start_url = Some(normalized_url);
        self.into_state()
    }
}

// Build method only available when all required fields are set
impl ScrapeConfigBuilder<WithStartUrl> {
    /// # Errors
    /// `ScrapeError::Config` on a non-http(s) start URL, zero concurrency,
    /// zero attempts or an empty navigation ladder.
    pub fn build(self) -> ScrapeResult<ScrapeConfig> {
        let invalid = |msg: String| Err(ScrapeError::Config(msg));

        let Some(output_dir) = self.output_dir else {
            return invalid("output_dir is required".into());
        };
        let Some(start_url) = self.start_url else {
            return invalid("start_url is required".into());
        };

        if !is_valid_url(&start_url) {
            return invalid(format!("start_url must be an http(s) URL: {start_url}"));
        }
        if self.max_concurrent_downloads == 0 {
            return invalid("max_concurrent_downloads must be at least 1".into());
        }
        if self.max_download_retries == 0 {
            return invalid("max_download_retries must be at least 1".into());
        }
        if self.navigation.max_retries == 0 {
            return invalid("navigation_retries must be at least 1".into());
        }
        if self.navigation.strategies.is_empty() {
            return invalid("at least one navigation strategy is required".into());
        }

        let output_dir = std::path::absolute(&output_dir).map_err(|e| {
            ScrapeError::Config(format!("Invalid output_dir {}: {e}", output_dir.display()))
        })?;

        Ok(ScrapeConfig {
            output_dir,
            start_url,
            headless: self.headless,
            user_agent: self.user_agent,
            max_concurrent_downloads: self.max_concurrent_downloads,
            max_download_retries: self.max_download_retries,
            download_timeout: self.download_timeout,
            download_backoff_base: self.download_backoff_base,
            network_idle_timeout: self.network_idle_timeout,
            lazy_load_grace: self.lazy_load_grace,
            device_picker_wait: self.device_picker_wait,
            navigation_retries: self.navigation.max_retries,
            navigation_strategies: self.navigation.strategies,
            navigation_backoff_base: self.navigation.backoff_base,
            post_navigation_settle: self.navigation.settle_delay,
            log_file: self.log_file,
            chrome_data_dir: self.chrome_data_dir,
        })
    }
}

// Builder methods available at any state
impl<State> ScrapeConfigBuilder<State> {
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Upper bound on simultaneous image downloads (default: 5)
    #[must_use]
    pub fn max_concurrent_downloads(mut self, max: usize) -> Self {
        self.max_concurrent_downloads = max;
        self
    }

    /// Attempts per image including the first (default: 3)
    #[must_use]
    pub fn max_download_retries(mut self, retries: u32) -> Self {
        self.max_download_retries = retries;
        self
    }

    #[must_use]
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Unit of the exponential backoff between download attempts (default: 1s)
    #[must_use]
    pub fn download_backoff_base(mut self, base: Duration) -> Self {
        self.download_backoff_base = base;
        self
    }

    #[must_use]
    pub fn network_idle_timeout(mut self, timeout: Duration) -> Self {
        self.network_idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn lazy_load_grace(mut self, grace: Duration) -> Self {
        self.lazy_load_grace = grace;
        self
    }

    #[must_use]
    pub fn device_picker_wait(mut self, wait: Duration) -> Self {
        self.device_picker_wait = wait;
        self
    }

    /// Full rounds through the wait-strategy ladder (default: 3)
    #[must_use]
    pub fn navigation_retries(mut self, retries: u32) -> Self {
        self.navigation.max_retries = retries;
        self
    }

    /// Replace the wait-strategy ladder
    #[must_use]
    pub fn navigation_strategies(mut self, strategies: Vec<(WaitStrategy, Duration)>) -> Self {
        self.navigation.strategies = strategies;
        self
    }

    #[must_use]
    pub fn navigation_backoff_base(mut self, base: Duration) -> Self {
        self.navigation.backoff_base = base;
        self
    }

    #[must_use]
    pub fn post_navigation_settle(mut self, delay: Duration) -> Self {
        self.navigation.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chrome_data_dir = Some(dir.into());
        self
    }
}
