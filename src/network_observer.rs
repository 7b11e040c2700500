//! Passive capture of image responses seen while the page loads
//!
//! Lazy-loading widgets, CSS files and scripts request images that never show
//! up as `<img>` attributes. The browser still downloads them, so every image
//! response observed during navigation becomes a candidate. Deduplication is
//! left to the extractor's merge step.

use log::debug;
use parking_lot::Mutex;

use crate::page::ObservedResponse;
use crate::schema::{ImageCandidate, SourceKind};
use crate::utils::has_image_extension;

/// Thread-safe recorder of image-typed HTTP responses
#[derive(Debug, Default)]
pub struct NetworkObserver {
    captured: Mutex<Vec<ImageCandidate>>,
}

impl NetworkObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `response` if it looks like an image
    ///
    /// Returns `true` when a candidate was captured.
    pub fn observe(&self, response: &ObservedResponse) -> bool {
        if !is_image_response(response) {
            return false;
        }

        let candidate = ImageCandidate::new(response.url.clone(), "", "", SourceKind::Network);

        let count = {
            let mut captured = self.captured.lock();
            captured.push(candidate);
            captured.len()
        };

        if count % 10 == 0 {
            debug!("Captured {count} images from network requests");
        }
        true
    }

    /// Ordered copy of everything captured so far
    #[must_use]
    pub fn snapshot(&self) -> Vec<ImageCandidate> {
        self.captured.lock().clone()
    }

    pub fn reset(&self) {
        self.captured.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.captured.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captured.lock().is_empty()
    }
}

/// Image if the content type says so, or the URL path has an image extension
fn is_image_response(response: &ObservedResponse) -> bool {
    response.content_type.to_ascii_lowercase().contains("image") || has_image_extension(&response.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(url: &str, content_type: &str) -> ObservedResponse {
        ObservedResponse {
            url: url.to_string(),
            content_type: content_type.to_string(),
            status: 200,
        }
    }

    #[test]
    fn captures_by_content_type_or_extension() {
        let observer = NetworkObserver::new();

        assert!(observer.observe(&response("https://x.com/pixel", "Image/GIF")));
        assert!(observer.observe(&response("https://x.com/a.avif", "")));
        assert!(!observer.observe(&response("https://x.com/app.js", "application/javascript")));

        let snapshot = observer.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|c| c.source_kind == SourceKind::Network));
        assert_eq!(snapshot[0].original_url, "https://x.com/pixel");
    }

    #[test]
    fn keeps_duplicates_and_upgrades() {
        let observer = NetworkObserver::new();
        let url = "https://cdn.shopify.com/files/case.jpg?width=300";

        observer.observe(&response(url, "image/jpeg"));
        observer.observe(&response(url, "image/jpeg"));

        let snapshot = observer.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].original_url, url);
        assert_eq!(
            snapshot[0].url,
            "https://cdn.shopify.com/files/case.jpg?width=4096&quality=100&format=auto"
        );
    }

    #[test]
    fn reset_clears_but_snapshot_is_a_copy() {
        let observer = NetworkObserver::new();
        observer.observe(&response("https://x.com/a.png", "image/png"));

        let before = observer.snapshot();
        observer.reset();

        assert_eq!(before.len(), 1);
        assert!(observer.is_empty());
    }
}
