//! Getter methods for `ScrapeConfig`

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::ScrapeConfig;
use crate::crawl_engine::navigation::NavigationPolicy;
use crate::image_downloader::DownloadConfig;
use crate::image_extractor::ExtractOptions;
use crate::utils::{LOG_FILENAME, METADATA_FILENAME};

impl ScrapeConfig {
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn max_concurrent_downloads(&self) -> usize {
        self.max_concurrent_downloads
    }

    #[must_use]
    pub fn max_download_retries(&self) -> u32 {
        self.max_download_retries
    }

    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        self.download_timeout
    }

    #[must_use]
    pub fn device_picker_wait(&self) -> Duration {
        self.device_picker_wait
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&Path> {
        self.chrome_data_dir.as_deref()
    }

    /// Debug log path, `<output_dir>/scraper.log` unless overridden
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join(LOG_FILENAME))
    }

    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.output_dir.join(METADATA_FILENAME)
    }

    #[must_use]
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            attempt_timeout: self.download_timeout,
            backoff_base: self.download_backoff_base,
        }
    }

    #[must_use]
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            network_idle_timeout: self.network_idle_timeout,
            lazy_load_grace: self.lazy_load_grace,
        }
    }

    #[must_use]
    pub fn navigation_policy(&self) -> NavigationPolicy {
        NavigationPolicy {
            max_retries: self.navigation_retries,
            strategies: self.navigation_strategies.clone(),
            backoff_base: self.navigation_backoff_base,
            settle_delay: self.post_navigation_settle,
            network_idle_timeout: self.network_idle_timeout,
        }
    }
}
