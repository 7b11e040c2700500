//! Data types shared by the discovery, filtering and download stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Which signal produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `<img>` element attribute (`src`, `srcset`, `data-*`)
    Dom,
    /// Inline `background-image: url(...)` style
    Background,
    /// Image-typed HTTP response observed during page load
    Network,
}

/// A discovered, not-yet-downloaded image reference
///
/// Two candidates with the same (upgraded) `url` are the same resource,
/// whichever source produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Resolved, quality-upgraded URL
    pub url: String,
    /// Resolved URL before the quality upgrade
    pub original_url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub title: String,
    pub source_kind: SourceKind,
}

impl ImageCandidate {
    /// Build a candidate from a resolved URL, upgrading it
    #[must_use]
    pub fn new(
        original_url: impl Into<String>,
        alt: impl Into<String>,
        title: impl Into<String>,
        source_kind: SourceKind,
    ) -> Self {
        let original_url = original_url.into();
        Self {
            url: crate::url_optimizer::upgrade(&original_url),
            original_url,
            alt: alt.into(),
            title: title.into(),
            source_kind,
        }
    }
}

impl PartialEq for ImageCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for ImageCandidate {}

impl std::hash::Hash for ImageCandidate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// Candidates partitioned by category
///
/// Excluded candidates (site chrome: logos, icons, ...) appear in none of the
/// three sequences. Order within each sequence follows input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizedSet {
    pub phone: Vec<ImageCandidate>,
    pub design: Vec<ImageCandidate>,
    pub other: Vec<ImageCandidate>,
}

impl CategorizedSet {
    /// Number of candidates that survived exclusion
    #[must_use]
    pub fn len(&self) -> usize {
        self.phone.len() + self.design.len() + self.other.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of fetching one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResult {
    #[serde(flatten)]
    pub candidate: ImageCandidate,
    /// Final path on disk (extension corrected from the response content type)
    #[serde(rename = "filepath")]
    pub local_path: PathBuf,
    pub filename: String,
    pub success: bool,
    pub attempts_made: u32,
}

/// A `<select>` option offered by the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// Best-effort device brand/model listing scraped from selection widgets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandModels {
    pub brands: Vec<SelectOption>,
    /// Models keyed by brand (`"unknown"` when the page doesn't tie them together)
    pub models: BTreeMap<String, Vec<SelectOption>>,
}

/// Summary of a run, persisted as `metadata.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    pub total_images_found: usize,
    pub phone_images_count: usize,
    pub design_images_count: usize,
    pub other_images_count: usize,
    pub images_downloaded: usize,
    pub images_failed: usize,
    pub brands_models: BrandModels,
    pub images: Vec<DownloadResult>,
}

impl RunMetadata {
    /// Assemble the summary from the stage outputs
    #[must_use]
    pub fn assemble(
        source_url: impl Into<String>,
        total_images_found: usize,
        categories: &CategorizedSet,
        brands_models: BrandModels,
        images: Vec<DownloadResult>,
    ) -> Self {
        let images_downloaded = images.iter().filter(|r| r.success).count();
        Self {
            source_url: source_url.into(),
            scraped_at: Utc::now(),
            total_images_found,
            phone_images_count: categories.phone.len(),
            design_images_count: categories.design.len(),
            other_images_count: categories.other.len(),
            images_downloaded,
            images_failed: images.len() - images_downloaded,
            brands_models,
            images,
        }
    }
}
