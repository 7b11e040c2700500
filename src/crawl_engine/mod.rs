//! Crawl Engine Module
//!
//! Navigation with retry plus the run orchestration that drives the image
//! pipeline over a rendered page.

pub mod crawl_types;
pub mod navigation;
pub mod orchestrator;

pub use crawl_types::{ScrapeError, ScrapeResult};
pub use navigation::{NavigablePage, NavigationError, NavigationPolicy, WaitStrategy, navigate_with_retry};
pub use orchestrator::{run_pipeline, scrape_page, select_for_download};
