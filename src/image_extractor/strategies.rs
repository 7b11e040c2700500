//! Source-selection strategies for `<img>` elements
//!
//! Lazy-loading libraries park the real image URL in `data-*` attributes and
//! leave a placeholder in `src`, so attributes are consulted in a fixed
//! priority order and the first one that yields a URL wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// One way of obtaining an image URL from an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStrategy {
    /// Use the attribute value as-is
    Attribute(&'static str),
    /// Pick the widest candidate from a `srcset` attribute
    Srcset,
}

/// `data-original > data-src > data-lazy-src > srcset > src`
pub const IMG_SOURCE_STRATEGIES: [SourceStrategy; 5] = [
    SourceStrategy::Attribute("data-original"),
    SourceStrategy::Attribute("data-src"),
    SourceStrategy::Attribute("data-lazy-src"),
    SourceStrategy::Srcset,
    SourceStrategy::Attribute("src"),
];

impl SourceStrategy {
    /// Attribute this strategy reads
    #[must_use]
    pub const fn attribute_name(&self) -> &'static str {
        match self {
            Self::Attribute(name) => name,
            Self::Srcset => "srcset",
        }
    }

    /// Turn the attribute value into a (still unresolved) URL
    #[must_use]
    pub fn select(&self, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match self {
            Self::Attribute(_) => Some(value.to_string()),
            Self::Srcset => best_srcset_candidate(value),
        }
    }
}

static WIDTH_DESCRIPTOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)w$").expect("WIDTH_DESCRIPTOR_REGEX: hardcoded regex is valid")
});

/// URL of the entry with the largest `<n>w` descriptor
///
/// Entries without a parseable width descriptor (`1x`, `2x`, bare URLs) count
/// as width 0, so a parseable low-width entry beats them. Ties keep the
/// earliest entry.
#[must_use]
pub fn best_srcset_candidate(srcset: &str) -> Option<String> {
    let mut best: Option<(u64, &str)> = None;

    for entry in srcset.split(',') {
        let mut tokens = entry.split_whitespace();
        let Some(url) = tokens.next() else {
            continue;
        };
        let width = tokens
            .find_map(|descriptor| {
                WIDTH_DESCRIPTOR_REGEX
                    .captures(descriptor)
                    .and_then(|caps| caps[1].parse::<u64>().ok())
            })
            .unwrap_or(0);

        match best {
            Some((best_width, _)) if best_width >= width => {}
            _ => best = Some((width, url)),
        }
    }

    best.map(|(_, url)| url.to_string())
}
