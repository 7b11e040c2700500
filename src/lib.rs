pub mod brand_models;
pub mod browser_setup;
pub mod config;
pub mod content_saver;
pub mod crawl_engine;
pub mod image_downloader;
pub mod image_extractor;
pub mod image_filter;
pub mod logging;
pub mod network_observer;
pub mod page;
pub mod schema;
pub mod url_optimizer;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::ScrapeConfig;
pub use content_saver::{load_metadata, save_metadata};
pub use crawl_engine::{ScrapeError, ScrapeResult, run_pipeline, scrape_page};
pub use image_downloader::{DownloadConfig, DownloadError, ImageDownloader, ImageTransport, ReqwestTransport};
pub use image_filter::categorize;
pub use logging::LoggingConfig;
pub use network_observer::NetworkObserver;
pub use page::{ElementHandle, ObservedResponse, PageHandle};
pub use schema::*;
pub use url_optimizer::upgrade;
