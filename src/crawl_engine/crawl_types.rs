//! Error types for a scrape run.

use thiserror::Error;

/// Terminal failure of a scrape run
///
/// Everything below navigation degrades instead of failing, so only setup
/// problems and an unreachable page end up here.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser error: {0}")]
    Browser(String),

    /// Every wait strategy failed in every round
    #[error("Failed to load {url} after {attempts} attempts")]
    Navigation { url: String, attempts: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scrape error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for ScrapeError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        Self::Other(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `ScrapeError`
pub type ScrapeResult<T> = Result<T, ScrapeError>;
