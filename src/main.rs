// Device image scraper
//
// Renders one product page in headless Chrome, collects every image it can
// find, keeps the phone/design shots and downloads them next to a
// metadata.json summary.

use clap::Parser;
use kodegen_tools_imagescrape::utils::{
    DEFAULT_MAX_CONCURRENT_DOWNLOADS, DEFAULT_MAX_DOWNLOAD_RETRIES, DEFAULT_OUTPUT_DIR, DEFAULT_START_URL,
};
use kodegen_tools_imagescrape::{LoggingConfig, ScrapeConfig, logging, scrape_page};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "kodegen-imagescrape",
    about = "Discover and download product images from a rendered web page",
    version
)]
struct Cli {
    /// Page to scrape
    #[arg(default_value = DEFAULT_START_URL)]
    url: String,

    /// Directory for images, metadata.json and scraper.log
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Maximum simultaneous downloads
    #[arg(default_value_t = DEFAULT_MAX_CONCURRENT_DOWNLOADS)]
    max_concurrent: usize,

    /// Attempts per image before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_DOWNLOAD_RETRIES)]
    max_retries: u32,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Debug output on the console
    #[arg(long, short)]
    verbose: bool,

    /// Log file (defaults to <OUTPUT_DIR>/scraper.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder = ScrapeConfig::builder()
        .output_dir(&cli.output_dir)
        .start_url(&cli.url)
        .headless(!cli.headed)
        .max_concurrent_downloads(cli.max_concurrent)
        .max_download_retries(cli.max_retries);
    if let Some(log_file) = &cli.log_file {
        builder = builder.log_file(log_file);
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let logging_config = LoggingConfig {
        console_level: if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO },
        ..LoggingConfig::default()
    }
    .with_file(config.log_file());
    if let Err(e) = logging::init(&logging_config) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    info!("URL: {}", config.start_url());
    info!("Output directory: {}", config.output_dir().display());
    info!("Max concurrent downloads: {}", config.max_concurrent_downloads());

    match scrape_page(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}
