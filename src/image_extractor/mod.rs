//! Multi-source image discovery on a rendered page
//!
//! Three signals are combined into one candidate list:
//!
//! 1. `<img>` elements, reading the attribute chain in [`strategies`]
//! 2. inline `background-image: url(...)` styles
//! 3. image responses captured by the
//!    [`NetworkObserver`](crate::network_observer::NetworkObserver)
//!
//! DOM candidates keep document order and are not deduplicated against each
//! other; network candidates are only appended when no DOM or background
//! candidate already has the same upgraded URL.

pub mod strategies;

use anyhow::Result;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::time::Duration;

use crate::page::{ElementHandle, PageHandle};
use crate::schema::{ImageCandidate, SourceKind};
use crate::utils::{DEFAULT_LAZY_LOAD_GRACE_MILLIS, DEFAULT_NETWORK_IDLE_TIMEOUT_SECS, is_valid_url, resolve_url};

pub use strategies::{IMG_SOURCE_STRATEGIES, SourceStrategy, best_srcset_candidate};

/// Selector for `<img>` elements
pub const IMG_SELECTOR: &str = "img";

/// Selector for elements carrying an inline background image
pub const BACKGROUND_SELECTOR: &str = r#"[style*="background-image"]"#;

static BACKGROUND_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"url\(\s*["']?([^"')]+?)["']?\s*\)"#)
        .expect("BACKGROUND_URL_REGEX: hardcoded regex is valid")
});

/// Timing knobs for the settle phase before the DOM scan
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub network_idle_timeout: Duration,
    /// Fixed delay after the idle wait for lazy loaders to swap in real URLs
    pub lazy_load_grace: Duration,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            network_idle_timeout: Duration::from_secs(DEFAULT_NETWORK_IDLE_TIMEOUT_SECS),
            lazy_load_grace: Duration::from_millis(DEFAULT_LAZY_LOAD_GRACE_MILLIS),
        }
    }
}

/// Discover every image candidate on `page`
///
/// Never fails: elements that can't be read are skipped, and if a page-level
/// query fails the whole result is empty.
pub async fn extract(
    page: &dyn PageHandle,
    base_url: &str,
    network_candidates: &[ImageCandidate],
    options: &ExtractOptions,
) -> Vec<ImageCandidate> {
    info!("→ Extracting images from page...");

    if let Err(e) = page.wait_for_network_idle(options.network_idle_timeout).await {
        debug!("Network idle wait ended early: {e:#}");
    }
    tokio::time::sleep(options.lazy_load_grace).await;

    let mut images = match scan_dom(page, base_url).await {
        Ok(images) => images,
        Err(e) => {
            error!("Error extracting images: {e:#}");
            return Vec::new();
        }
    };

    let dom_count = images.len();
    merge_network_candidates(&mut images, network_candidates);

    info!(
        "✓ Extracted {} unique images ({} from DOM, {} from network)",
        images.len(),
        dom_count,
        images.len() - dom_count
    );
    images
}

/// Append network candidates whose URL isn't already present
///
/// Later duplicates among the network candidates themselves are dropped too.
pub fn merge_network_candidates(images: &mut Vec<ImageCandidate>, network_candidates: &[ImageCandidate]) {
    let mut seen: HashSet<String> = images.iter().map(|c| c.url.clone()).collect();

    for candidate in network_candidates {
        if seen.insert(candidate.url.clone()) {
            images.push(candidate.clone());
        }
    }
}

async fn scan_dom(page: &dyn PageHandle, base_url: &str) -> Result<Vec<ImageCandidate>> {
    let mut images = Vec::new();

    let img_elements = page.query_all(IMG_SELECTOR).await?;
    debug!("Found {} img elements", img_elements.len());

    for (idx, element) in img_elements.iter().enumerate() {
        match img_candidate(element.as_ref(), base_url).await {
            Ok(Some(candidate)) => images.push(candidate),
            Ok(None) => {}
            Err(e) => debug!("Skipping img element {idx}: {e:#}"),
        }
        if (idx + 1) % 10 == 0 {
            debug!("Processed {}/{} img elements", idx + 1, img_elements.len());
        }
    }

    let styled = page.query_all(BACKGROUND_SELECTOR).await?;
    for (idx, element) in styled.iter().enumerate() {
        match background_candidate(element.as_ref(), base_url).await {
            Ok(Some(candidate)) => images.push(candidate),
            Ok(None) => {}
            Err(e) => debug!("Skipping styled element {idx}: {e:#}"),
        }
    }

    Ok(images)
}

async fn img_candidate(element: &dyn ElementHandle, base_url: &str) -> Result<Option<ImageCandidate>> {
    let mut chosen = None;
    for strategy in &IMG_SOURCE_STRATEGIES {
        if let Some(value) = element.attribute(strategy.attribute_name()).await?
            && let Some(url) = strategy.select(&value)
        {
            chosen = Some(url);
            break;
        }
    }

    let Some(raw_url) = chosen else {
        return Ok(None);
    };
    let Some(resolved) = resolve_image_url(base_url, &raw_url)? else {
        return Ok(None);
    };

    let alt = element.attribute("alt").await?.unwrap_or_default();
    let title = element.attribute("title").await?.unwrap_or_default();

    Ok(Some(ImageCandidate::new(resolved, alt, title, SourceKind::Dom)))
}

async fn background_candidate(element: &dyn ElementHandle, base_url: &str) -> Result<Option<ImageCandidate>> {
    let Some(style) = element.attribute("style").await? else {
        return Ok(None);
    };
    let Some(raw_url) = background_image_url(&style) else {
        return Ok(None);
    };
    let Some(resolved) = resolve_image_url(base_url, &raw_url)? else {
        return Ok(None);
    };

    Ok(Some(ImageCandidate::new(resolved, "", "", SourceKind::Background)))
}

/// First `url(...)` reference in an inline style containing `background-image`
#[must_use]
pub fn background_image_url(style: &str) -> Option<String> {
    if !style.contains("background-image") {
        return None;
    }
    BACKGROUND_URL_REGEX
        .captures(style)
        .map(|caps| caps[1].trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Resolve against the page URL; `data:`/`blob:` and other non-fetchable
/// schemes are dropped
fn resolve_image_url(base_url: &str, raw_url: &str) -> Result<Option<String>> {
    let resolved = resolve_url(base_url, raw_url)?;
    if is_valid_url(&resolved) {
        Ok(Some(resolved))
    } else {
        debug!("Ignoring non-http image source: {}", truncate(&resolved, 80));
        Ok(None)
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_url_variants() {
        assert_eq!(
            background_image_url("background-image: url('/a.png')").as_deref(),
            Some("/a.png")
        );
        assert_eq!(
            background_image_url(r#"color: red; background-image:url("b.jpg");"#).as_deref(),
            Some("b.jpg")
        );
        assert_eq!(
            background_image_url("background-image: url(c.webp) no-repeat").as_deref(),
            Some("c.webp")
        );
        assert_eq!(background_image_url("background: url(d.jpg)"), None);
        assert_eq!(background_image_url("background-image: none"), None);
    }

    #[test]
    fn merge_skips_known_and_repeated_urls() {
        let dom = ImageCandidate::new("https://x.com/a.jpg", "", "", SourceKind::Dom);
        let dup = ImageCandidate::new("https://x.com/a.jpg", "", "", SourceKind::Network);
        let new = ImageCandidate::new("https://x.com/b.jpg", "", "", SourceKind::Network);

        let mut images = vec![dom];
        merge_network_candidates(&mut images, &[dup, new.clone(), new]);

        let urls: Vec<_> = images.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, ["https://x.com/a.jpg", "https://x.com/b.jpg"]);
        assert_eq!(images[0].source_kind, SourceKind::Dom);
    }

    #[test]
    fn non_http_sources_are_dropped() {
        assert_eq!(
            resolve_image_url("https://x.com/p", "data:image/gif;base64,R0lG").ok().flatten(),
            None
        );
        assert_eq!(
            resolve_image_url("https://x.com/p/", "img/a.png").ok().flatten().as_deref(),
            Some("https://x.com/p/img/a.png")
        );
    }
}
