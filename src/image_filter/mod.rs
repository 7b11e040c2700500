//! Keyword-based partitioning of candidates into phone / design / other
//!
//! Precedence per candidate: excluded (dropped) > design > phone > other.
//! When nothing ends up in `phone`, the unclassified `other` images are
//! promoted into it: with no device-specific signal on the page, the
//! unlabelled images are most likely the product shots.

pub mod keywords;

use log::info;

use crate::schema::{CategorizedSet, ImageCandidate};
use keywords::{DESIGN_KEYWORDS, EXCLUDED_KEYWORDS, PHONE_KEYWORDS, contains_any};

/// Category assigned to a single candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Phone,
    Design,
    Other,
}

/// Category of one candidate before the phone fallback, `None` when excluded
#[must_use]
pub fn classify(candidate: &ImageCandidate) -> Option<Category> {
    let alt = candidate.alt.to_lowercase();
    let title = candidate.title.to_lowercase();
    let url = candidate.url.to_lowercase();

    if contains_any(EXCLUDED_KEYWORDS, &[&url, &alt]) {
        None
    } else if contains_any(DESIGN_KEYWORDS, &[&alt, &title, &url]) {
        Some(Category::Design)
    } else if contains_any(PHONE_KEYWORDS, &[&alt, &title, &url]) {
        Some(Category::Phone)
    } else {
        Some(Category::Other)
    }
}

/// Partition `candidates`, preserving input order within each category
#[must_use]
pub fn categorize(candidates: &[ImageCandidate]) -> CategorizedSet {
    let mut set = CategorizedSet::default();
    let mut excluded = 0usize;

    for candidate in candidates {
        match classify(candidate) {
            Some(Category::Design) => set.design.push(candidate.clone()),
            Some(Category::Phone) => set.phone.push(candidate.clone()),
            Some(Category::Other) => set.other.push(candidate.clone()),
            None => excluded += 1,
        }
    }

    if set.phone.is_empty() {
        set.phone = std::mem::take(&mut set.other);
    }

    info!(
        "✓ Categorized images: {} phone, {} design, {} other, {} excluded",
        set.phone.len(),
        set.design.len(),
        set.other.len(),
        excluded
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SourceKind;

    fn candidate(url: &str, alt: &str, title: &str) -> ImageCandidate {
        ImageCandidate::new(url, alt, title, SourceKind::Dom)
    }

    #[test]
    fn title_does_not_trigger_exclusion() {
        let c = candidate("https://x.com/a.jpg", "", "close-up");
        assert_eq!(classify(&c), Some(Category::Other));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let c = candidate("https://x.com/a.jpg", "Samsung Galaxy", "");
        assert_eq!(classify(&c), Some(Category::Phone));
        let c = candidate("https://x.com/MINT.jpg", "", "");
        assert_eq!(classify(&c), Some(Category::Design));
    }

    #[test]
    fn design_list_is_complete() {
        assert_eq!(DESIGN_KEYWORDS.len(), 59);
        assert!(PHONE_KEYWORDS.contains(&"preview"));
    }
}
