//! Configuration for a scrape run
//!
//! This module provides the `ScrapeConfig` struct and its type-safe builder.
//! Required fields (output directory, start URL) are enforced at compile time;
//! everything else falls back to the defaults in `utils::constants`.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::{ScrapeConfigBuilder, WithOutputDir, WithStartUrl};
pub use types::ScrapeConfig;
