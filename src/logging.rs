//! Subscriber setup for the binary
//!
//! Console output follows `RUST_LOG` (falling back to the configured level);
//! the optional log file always records DEBUG and above with targets and
//! timestamps. `log` records from dependencies are bridged into `tracing`.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// chromiumoxide logs every CDP message it can't deserialize
const QUIET_TARGETS: &[&str] = &["chromiumoxide::conn=off", "chromiumoxide::handler=off"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub console_level: LevelFilter,
    /// Appended to, parent directories are created
    pub file: Option<PathBuf>,
    pub file_level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::INFO,
            file: None,
            file_level: LevelFilter::DEBUG,
        }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }
}

/// Install the global subscriber
///
/// # Errors
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let console_filter = quiet(
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.console_level.to_string())),
    )?;
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(console_filter);

    let file_layer = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file))
                    .with_filter(quiet(EnvFilter::new(config.file_level.to_string()))?),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")
}

fn quiet(mut filter: EnvFilter) -> Result<EnvFilter> {
    for target in QUIET_TARGETS {
        let directive: Directive = target
            .parse()
            .with_context(|| format!("Invalid log directive '{target}'"))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}
