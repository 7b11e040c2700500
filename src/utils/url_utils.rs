//! URL and path manipulation utilities.
//!
//! This module provides functions for resolving and classifying the URLs
//! discovered while scanning a rendered page.

use anyhow::{Context, Result};
use url::Url;

use super::constants::IMAGE_EXTENSIONS;

/// Resolve a potentially relative URL against a base URL
///
/// Protocol-relative (`//cdn.example.com/a.jpg`), root-relative and
/// path-relative references are all handled by `Url::join`.
pub fn resolve_url(base_url: &str, url: &str) -> Result<String> {
    let base = Url::parse(base_url).context("Invalid base URL")?;
    let resolved = base
        .join(url.trim())
        .with_context(|| format!("Failed to resolve URL: {url}"))?;

    Ok(resolved.to_string())
}

/// Check if a URL is valid
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Path component of a URL, falling back to the raw string when it does not parse
#[must_use]
pub fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Whether the URL path ends with a known image extension (case-insensitive)
#[must_use]
pub fn has_image_extension(url: &str) -> bool {
    let path = url_path(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
