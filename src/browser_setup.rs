use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use log::{error, info, trace, warn};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};

#[cfg(target_os = "windows")]
const KNOWN_BROWSER_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
];

#[cfg(target_os = "macos")]
const KNOWN_BROWSER_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/opt/homebrew/bin/chromium",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const KNOWN_BROWSER_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/usr/local/bin/chromium",
];

const BROWSER_COMMANDS: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Flags for an unattended, automation-quiet desktop Chrome
const CHROME_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--no-first-run",
    "--no-default-browser-check",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-extensions",
    "--disable-breakpad",
    "--password-store=basic",
    "--use-mock-keychain",
    "--hide-scrollbars",
    "--mute-audio",
];

/// Find a Chrome/Chromium executable: `CHROMIUM_PATH`, well-known install
/// locations, then `which`
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("CHROMIUM_PATH").map(PathBuf::from) {
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!("CHROMIUM_PATH points to non-existent file: {}", path.display());
    }

    if let Some(path) = KNOWN_BROWSER_PATHS
        .iter()
        .filter_map(|p| expand_home(p))
        .find(|p| p.exists())
    {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if let Some(path) = which_browser() {
        info!("Found browser using 'which': {}", path.display());
        return Ok(path);
    }

    warn!("No Chrome/Chromium executable found, falling back to a managed download");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

fn which_browser() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }
    BROWSER_COMMANDS.iter().find_map(|cmd| {
        let output = Command::new("which").arg(cmd).output().ok()?;
        let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (output.status.success() && !found.is_empty()).then(|| PathBuf::from(found))
    })
}

/// Download a managed Chromium into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("kodegen-imagescrape")
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}

/// Launch Chrome with a 1920x1080 desktop window
///
/// Viewport emulation is disabled so pages lay out at the real window size.
///
/// Returns the browser, the CDP handler task and the profile directory in use.
/// Without `chrome_data_dir` a per-process directory under the system temp dir
/// is used.
pub async fn launch_browser(
    headless: bool,
    chrome_data_dir: Option<&Path>,
    user_agent: &str,
) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    // Lookup probes the filesystem and shells out to `which`
    let found = task::spawn_blocking(find_browser_executable)
        .await
        .context("Browser lookup task panicked")?;
    let chrome_path = match found {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let user_data_dir = chrome_data_dir.map_or_else(temporary_profile_dir, Path::to_path_buf);
    std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .viewport(Option::<Viewport>::None)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path);

    if headless {
        config_builder = config_builder.headless_mode(HeadlessMode::default());
    } else {
        config_builder = config_builder.with_head();
    }

    config_builder = config_builder.arg(format!("--user-agent={user_agent}"));
    for arg in CHROME_ARGS {
        config_builder = config_builder.arg(*arg);
    }

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(h) = handler.next().await {
            if let Err(e) = h {
                let error_msg = e.to_string();

                // chromiumoxide can't deserialize every CDP event newer Chrome sends
                let is_benign_serialization_error = error_msg
                    .contains("data did not match any variant of untagged enum Message")
                    || error_msg.contains("Failed to deserialize WS response");

                if is_benign_serialization_error {
                    trace!("Suppressed benign CDP serialization error: {error_msg}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        info!("Browser handler task completed");
    });

    Ok((browser, handler_task, user_data_dir))
}

/// Per-process Chrome profile used when no data dir is configured
#[must_use]
pub fn temporary_profile_dir() -> PathBuf {
    std::env::temp_dir().join(format!("kodegen_imagescrape_chrome_{}", std::process::id()))
}

/// Delete a profile directory created by [`launch_browser`]
///
/// Only the temporary per-process profile is removed; a configured
/// `chrome_data_dir` is left alone.
pub async fn remove_temporary_profile(user_data_dir: &Path, chrome_data_dir: Option<&Path>) {
    if chrome_data_dir.is_some() || user_data_dir != temporary_profile_dir() {
        return;
    }
    match tokio::fs::remove_dir_all(user_data_dir).await {
        Ok(()) => trace!("Removed browser profile {}", user_data_dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove browser profile {}: {e}", user_data_dir.display()),
    }
}
