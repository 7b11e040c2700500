//! Run orchestration
//!
//! `scrape_page` owns the browser lifecycle: launch, observe network traffic,
//! navigate, hand the rendered page to `run_pipeline`, close. `run_pipeline`
//! is everything after navigation and only needs the page traits, so it runs
//! the same against Chromium or a fake page.

use chromiumoxide::browser::Browser;
use log::{debug, info, warn};
use std::sync::Arc;

use super::crawl_types::{ScrapeError, ScrapeResult};
use super::navigation::navigate_with_retry;
use crate::brand_models::extract_brand_models;
use crate::browser_setup::{launch_browser, remove_temporary_profile};
use crate::config::ScrapeConfig;
use crate::content_saver::save_metadata;
use crate::image_downloader::{ImageDownloader, ImageTransport, ReqwestTransport};
use crate::image_extractor;
use crate::image_filter::categorize;
use crate::network_observer::NetworkObserver;
use crate::page::PageHandle;
use crate::page::chromium::{ChromiumPage, attach_network_observer};
use crate::schema::{ImageCandidate, RunMetadata};

const RULE: &str = "============================================================";

/// Scrape `config.start_url()` end to end
///
/// # Errors
/// Fails when the browser can't be launched, the page can't be loaded with
/// any wait strategy, or `metadata.json` can't be written. Nothing is written
/// when navigation fails.
pub async fn scrape_page(config: &ScrapeConfig) -> ScrapeResult<RunMetadata> {
    info!("{RULE}");
    info!("Starting scrape of: {}", config.start_url());
    info!("{RULE}");

    tokio::fs::create_dir_all(config.output_dir()).await?;

    debug!("Launching browser...");
    let (mut browser, handler_task, user_data_dir) =
        launch_browser(config.headless(), config.chrome_data_dir(), config.user_agent())
            .await
            .map_err(|e| ScrapeError::Browser(format!("{e:#}")))?;
    info!("✓ Browser launched");

    let result = scrape_with_browser(&browser, config).await;

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser cleanly: {e}");
    }
    if let Err(e) = browser.wait().await {
        debug!("Browser process wait failed: {e}");
    }
    handler_task.abort();
    debug!("Browser closed");
    remove_temporary_profile(&user_data_dir, config.chrome_data_dir()).await;

    result
}

async fn scrape_with_browser(browser: &Browser, config: &ScrapeConfig) -> ScrapeResult<RunMetadata> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| ScrapeError::Browser(format!("Failed to open page: {e}")))?;
    debug!("New page created");

    info!("→ Setting up network interception...");
    let observer = Arc::new(NetworkObserver::new());
    let listener = attach_network_observer(&page, Arc::clone(&observer)).await?;
    info!("✓ Network interception enabled");

    let page = ChromiumPage::new(page);

    info!("→ Navigating to page...");
    if let Err(e) = navigate_with_retry(&page, config.start_url(), &config.navigation_policy()).await {
        listener.abort();
        return Err(e);
    }

    let transport = ReqwestTransport::new(config.user_agent(), config.download_timeout())?;
    let result = run_pipeline(&page, &observer, config, Arc::new(transport)).await;

    listener.abort();
    result
}

/// Everything after a successful navigation
///
/// Brand/model extraction, image discovery (merging what `observer` has seen
/// so far), categorization, download and the `metadata.json` write.
///
/// # Errors
/// Only when `metadata.json` can't be written; every earlier stage degrades.
pub async fn run_pipeline(
    page: &dyn PageHandle,
    observer: &NetworkObserver,
    config: &ScrapeConfig,
    transport: Arc<dyn ImageTransport>,
) -> ScrapeResult<RunMetadata> {
    let source_url = config.start_url();

    info!("→ Extracting brand and model information...");
    let brands_models = extract_brand_models(page, config.device_picker_wait()).await;
    info!("✓ Found {} brands", brands_models.brands.len());

    let network_candidates = observer.snapshot();
    debug!("Captured {} images from network requests", network_candidates.len());

    let images = image_extractor::extract(page, source_url, &network_candidates, &config.extract_options()).await;
    info!("✓ Found {} total images", images.len());

    info!("→ Filtering images...");
    let categories = categorize(&images);
    info!("  Phone images: {}", categories.phone.len());
    info!("  Design images: {}", categories.design.len());
    info!("  Other images: {}", categories.other.len());

    let selected = select_for_download(&categories.phone, &categories.design, &images);

    info!("→ Downloading {} images...", selected.len());
    let downloader = ImageDownloader::new(transport, config.download_config());
    let results = downloader
        .download_all(
            &selected,
            config.output_dir(),
            config.max_concurrent_downloads(),
            config.max_download_retries(),
        )
        .await;
    info!(
        "✓ Downloaded {}/{} images",
        downloader.downloaded_count(),
        selected.len()
    );

    info!("→ Saving metadata...");
    let metadata = RunMetadata::assemble(source_url, images.len(), &categories, brands_models, results);
    let metadata_path = save_metadata(&metadata, config.output_dir()).await?;
    info!("✓ Metadata saved");

    log_summary(&metadata, config, &metadata_path);
    Ok(metadata)
}

/// Phone then design images; every candidate when both are empty
#[must_use]
pub fn select_for_download(
    phone: &[ImageCandidate],
    design: &[ImageCandidate],
    all: &[ImageCandidate],
) -> Vec<ImageCandidate> {
    let relevant: Vec<ImageCandidate> = phone.iter().chain(design).cloned().collect();
    if relevant.is_empty() && !all.is_empty() {
        warn!("No phone/design images found, using all images");
        return all.to_vec();
    }
    relevant
}

fn log_summary(metadata: &RunMetadata, config: &ScrapeConfig, metadata_path: &std::path::Path) {
    info!("");
    info!("{RULE}");
    info!("✓ Scraping complete!");
    info!("{RULE}");
    info!("  Total images found: {}", metadata.total_images_found);
    info!("  Phone images: {}", metadata.phone_images_count);
    info!("  Design images: {}", metadata.design_images_count);
    info!("  Images downloaded: {}", metadata.images_downloaded);
    info!("  Output directory: {}", config.output_dir().display());
    info!("  Metadata saved to: {}", metadata_path.display());
    info!("{RULE}");
}
