//! Keyword tables for image categorization
//!
//! Matching is plain substring search over lower-cased text, so short entries
//! like `mod`, `eye` or `ring` deliberately match inside longer words.

/// Case design / pattern names used by the storefront
pub const DESIGN_KEYWORDS: &[&str] = &[
    "latte",
    "lilac",
    "espresso",
    "mint",
    "coastal",
    "split",
    "candy",
    "mod",
    "heat",
    "aqua",
    "frost",
    "titan",
    "flash",
    "nitron",
    "silver",
    "vibe",
    "chroma",
    "chaotic",
    "urban",
    "redline",
    "celestial",
    "molten",
    "ring",
    "rouge",
    "cosmo",
    "cosmic",
    "devil",
    "fire",
    "cyber",
    "champion",
    "boundless",
    "magma",
    "chaos",
    "space",
    "canopy",
    "concrete",
    "cricket",
    "purple",
    "cultivate",
    "game",
    "lava",
    "estuary",
    "dancing",
    "vector",
    "quantum",
    "sapphire",
    "vacation",
    "untethered",
    "sunset",
    "shikara",
    "mountain",
    "shutter",
    "sick",
    "eye",
    "ghost",
    "baadshah",
    "forest",
    "machina",
    "hud",
];

/// Device, brand and product-shot words
pub const PHONE_KEYWORDS: &[&str] = &[
    "phone",
    "device",
    "mobile",
    "iphone",
    "samsung",
    "pixel",
    "google",
    "nothing",
    "oneplus",
    "vivo",
    "oppo",
    "poco",
    "realme",
    "iqoo",
    "xiaomi",
    "asus",
    "tecno",
    "motorola",
    "product",
    "skin",
    "model",
    "preview",
];

/// Site chrome; matched against the URL and alt text only
pub const EXCLUDED_KEYWORDS: &[&str] = &["logo", "icon", "cart", "menu", "button", "arrow", "close"];

/// Whether any keyword occurs in any of `haystacks`
#[must_use]
pub fn contains_any(keywords: &[&str], haystacks: &[&str]) -> bool {
    keywords
        .iter()
        .any(|keyword| haystacks.iter().any(|text| text.contains(keyword)))
}
