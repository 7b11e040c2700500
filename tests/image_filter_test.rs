//! Keyword categorization of image candidates

use kodegen_tools_imagescrape::{ImageCandidate, SourceKind, categorize};

fn candidate(url: &str, alt: &str) -> ImageCandidate {
    ImageCandidate::new(url, alt, "", SourceKind::Dom)
}

fn urls(images: &[ImageCandidate]) -> Vec<&str> {
    images.iter().map(|c| c.url.as_str()).collect()
}

#[test]
fn test_exclusion_beats_design_and_phone() {
    let set = categorize(&[candidate("https://x.com/site-logo-mint.png", "iphone")]);

    assert!(set.is_empty());
}

#[test]
fn test_excluded_alt_text_drops_phone_candidate() {
    let set = categorize(&[
        candidate("https://x.com/a.jpg", "Apple logo on iPhone"),
        candidate("https://x.com/b.jpg", "iPhone"),
    ]);

    assert_eq!(urls(&set.phone), ["https://x.com/b.jpg"]);
    assert!(set.design.is_empty());
    assert!(set.other.is_empty());
}

#[test]
fn test_design_beats_phone() {
    let set = categorize(&[
        candidate("https://x.com/a.jpg", "Lava skin for iPhone 15"),
        candidate("https://x.com/b.jpg", "iPhone 15 Pro"),
    ]);

    assert_eq!(urls(&set.design), ["https://x.com/a.jpg"]);
    assert_eq!(urls(&set.phone), ["https://x.com/b.jpg"]);
    assert!(set.other.is_empty());
}

#[test]
fn test_title_counts_for_design_and_phone() {
    let set = categorize(&[
        ImageCandidate::new("https://x.com/1.jpg", "", "Sapphire", SourceKind::Dom),
        ImageCandidate::new("https://x.com/2.jpg", "", "Pixel 8", SourceKind::Dom),
        ImageCandidate::new("https://x.com/3.jpg", "", "banner", SourceKind::Dom),
    ]);

    assert_eq!(urls(&set.design), ["https://x.com/1.jpg"]);
    assert_eq!(urls(&set.phone), ["https://x.com/2.jpg"]);
    assert_eq!(urls(&set.other), ["https://x.com/3.jpg"]);
}

#[test]
fn test_unclassified_images_fall_back_to_phone() {
    let inputs = [
        candidate("https://x.com/1.jpg", "banner"),
        candidate("https://x.com/2.jpg", "hero"),
        candidate("https://x.com/3.jpg", ""),
    ];

    let set = categorize(&inputs);

    assert!(set.design.is_empty());
    assert!(set.other.is_empty());
    assert_eq!(urls(&set.phone), urls(&inputs));
}

#[test]
fn test_fallback_skipped_when_phone_present() {
    let set = categorize(&[
        candidate("https://x.com/1.jpg", "banner"),
        candidate("https://x.com/2.jpg", "samsung"),
    ]);

    assert_eq!(urls(&set.phone), ["https://x.com/2.jpg"]);
    assert_eq!(urls(&set.other), ["https://x.com/1.jpg"]);
}

#[test]
fn test_every_survivor_lands_in_exactly_one_category() {
    let inputs = [
        candidate("https://x.com/1.jpg", "frost"),
        candidate("https://x.com/2.jpg", "menu toggle"),
        candidate("https://x.com/3.jpg", "oneplus"),
        candidate("https://x.com/4.jpg", "banner"),
        candidate("https://x.com/arrow-left.svg", ""),
    ];

    let set = categorize(&inputs);

    assert_eq!(set.len(), 3);
    assert_eq!(urls(&set.design), ["https://x.com/1.jpg"]);
    assert_eq!(urls(&set.phone), ["https://x.com/3.jpg"]);
    assert_eq!(urls(&set.other), ["https://x.com/4.jpg"]);
}
