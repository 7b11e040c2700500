//! Concurrent image downloads with retry and exponential backoff
//!
//! Every candidate gets its future up front; a semaphore admits at most
//! `max_concurrent` of them at a time and a permit is held for the whole retry
//! loop of one candidate. Bodies are streamed into `<name>.part` and renamed
//! once complete, so a final filename never holds a truncated image. An
//! interrupted run can leave a `.part` file behind.

pub mod filename;
pub mod transport;

use futures::StreamExt;
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;

use crate::schema::{DownloadResult, ImageCandidate};
use crate::utils::{DEFAULT_BACKOFF_BASE_MILLIS, DEFAULT_DOWNLOAD_TIMEOUT_SECS};

pub use transport::{BodyStream, DownloadError, ImageTransport, ReqwestTransport, TransportResponse};

/// Per-attempt timing
#[derive(Debug, Clone, Copy)]
pub struct DownloadConfig {
    /// Bound on one attempt: request, body and file write
    pub attempt_timeout: Duration,
    /// Failed attempt `n` (0-indexed) sleeps `backoff_base * 2^n`
    pub backoff_base: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MILLIS),
        }
    }
}

pub struct ImageDownloader {
    transport: Arc<dyn ImageTransport>,
    config: DownloadConfig,
    downloaded_count: AtomicUsize,
    failed_count: AtomicUsize,
}

impl ImageDownloader {
    #[must_use]
    pub fn new(transport: Arc<dyn ImageTransport>, config: DownloadConfig) -> Self {
        Self {
            transport,
            config,
            downloaded_count: AtomicUsize::new(0),
            failed_count: AtomicUsize::new(0),
        }
    }

    /// Successful downloads in the most recent `download_all` call
    #[must_use]
    pub fn downloaded_count(&self) -> usize {
        self.downloaded_count.load(Ordering::Relaxed)
    }

    /// Terminal failures in the most recent `download_all` call
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed_count.load(Ordering::Relaxed)
    }

    /// Download every candidate into `dest`
    ///
    /// Returns one result per candidate in input order. A `max_concurrent`
    /// of 0 is treated as 1.
    pub async fn download_all(
        &self,
        candidates: &[ImageCandidate],
        dest: &Path,
        max_concurrent: usize,
        max_retries: u32,
    ) -> Vec<DownloadResult> {
        self.downloaded_count.store(0, Ordering::Relaxed);
        self.failed_count.store(0, Ordering::Relaxed);

        let max_concurrent = max_concurrent.max(1);
        info!(
            "→ Starting download of {} images (max {max_concurrent} concurrent)...",
            candidates.len()
        );

        let names = filename::disambiguate(
            candidates
                .iter()
                .enumerate()
                .map(|(idx, c)| filename::filename_for(&c.url, idx))
                .collect(),
        );

        let semaphore = Semaphore::new(max_concurrent);
        let futures = candidates.iter().zip(names).map(|(candidate, name)| {
            let semaphore = &semaphore;
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    self.failed_count.fetch_add(1, Ordering::Relaxed);
                    return DownloadResult {
                        candidate: candidate.clone(),
                        local_path: dest.join(&name),
                        filename: name,
                        success: false,
                        attempts_made: 0,
                    };
                };
                self.fetch_one(candidate, dest, &name, max_retries).await
            }
        });

        let results = join_all(futures).await;

        info!(
            "✓ Download complete: {} succeeded, {} failed",
            self.downloaded_count(),
            self.failed_count()
        );
        results
    }

    /// Retry loop for one candidate
    async fn fetch_one(
        &self,
        candidate: &ImageCandidate,
        dest: &Path,
        name: &str,
        max_retries: u32,
    ) -> DownloadResult {
        let mut attempts_made = 0;

        for attempt in 0..max_retries {
            attempts_made = attempt + 1;
            debug!("Downloading: {name} (attempt {attempts_made}/{max_retries})");

            match self.attempt(&candidate.url, dest, name).await {
                Ok(path) => {
                    self.downloaded_count.fetch_add(1, Ordering::Relaxed);
                    let filename = path
                        .file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                        .unwrap_or_else(|| name.to_string());
                    debug!("Successfully downloaded: {filename}");
                    return DownloadResult {
                        candidate: candidate.clone(),
                        local_path: path,
                        filename,
                        success: true,
                        attempts_made,
                    };
                }
                // The server answered; retry straight away
                Err(DownloadError::HttpStatus(status)) => {
                    warn!("HTTP {status} for {}", candidate.url);
                }
                Err(e) => {
                    debug!("Error downloading {name}: {e}");
                    if attempts_made < max_retries {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
            }
        }

        self.failed_count.fetch_add(1, Ordering::Relaxed);
        error!(
            "Failed to download {} after {attempts_made} attempts",
            candidate.url
        );
        DownloadResult {
            candidate: candidate.clone(),
            local_path: dest.join(name),
            filename: name.to_string(),
            success: false,
            attempts_made,
        }
    }

    async fn attempt(&self, url: &str, dest: &Path, name: &str) -> Result<PathBuf, DownloadError> {
        let timeout = self.config.attempt_timeout;
        match tokio::time::timeout(timeout, self.attempt_unbounded(url, dest, name)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(DownloadError::Timeout(timeout)),
        }
    }

    async fn attempt_unbounded(
        &self,
        url: &str,
        dest: &Path,
        name: &str,
    ) -> Result<PathBuf, DownloadError> {
        let response = self.transport.get(url).await?;
        if response.status != 200 {
            return Err(DownloadError::HttpStatus(response.status));
        }

        let final_name = filename::correct_extension(name, &response.content_type);
        let final_path = dest.join(&final_name);
        let part_path = dest.join(format!("{final_name}.part"));

        if let Err(e) = write_body(response.body, &part_path).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(e);
        }
        tokio::fs::rename(&part_path, &final_path).await?;

        Ok(final_path)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.config
            .backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

async fn write_body(mut body: BodyStream, path: &Path) -> Result<(), DownloadError> {
    let mut file = tokio::fs::File::create(path).await?;
    while let Some(chunk) = body.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}
