//! Image URL quality upgrading
//!
//! Rewrites an image URL so that it requests the largest variant the host is
//! known to serve: size query parameters are dropped, thumbnail markers in the
//! filename are rewritten, and Shopify CDN URLs get explicit max-quality
//! parameters.
//!
//! `upgrade` is idempotent. The same image is usually seen several times (as an
//! `<img>`, as a network response, sometimes as a background) and every source
//! runs it through this function, so a second pass must be a no-op.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::utils::constants::{HIGH_RES_DIMENSION, SHOPIFY_QUALITY_PARAMS};

/// Generic size-limiting query parameters
static SIZE_PARAM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[?&](?:w|width|h|height|size|resize|scale)=\d+")
        .expect("SIZE_PARAM_REGEX: hardcoded regex is valid")
});

/// Filename infixes that select a downscaled rendition
static SIZE_INFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)_(?:thumb|small|medium|large)")
        .expect("SIZE_INFIX_REGEX: hardcoded regex is valid")
});

static THUMB_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)thumbnail|thumb").expect("THUMB_TOKEN_REGEX: hardcoded regex is valid")
});

static WIDTH_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)w_\d+").expect("WIDTH_TOKEN_REGEX: hardcoded regex is valid"));

static HEIGHT_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)h_\d+").expect("HEIGHT_TOKEN_REGEX: hardcoded regex is valid"));

/// Shopify transform parameters that cap the served rendition
static SHOPIFY_PARAM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[?&](?:width|height|quality)=\d+|[?&]crop=\w+")
        .expect("SHOPIFY_PARAM_REGEX: hardcoded regex is valid")
});

/// Hard stop for the rewrite fixpoint; real URLs settle in one or two passes
const MAX_REWRITE_PASSES: usize = 32;

/// Upgrade an image URL to its highest-quality variant
///
/// Applied in order:
/// 1. strip `w|width|h|height|size|resize|scale=<digits>` query parameters
/// 2. drop `_thumb`/`_small`/`_medium`/`_large`, turn `thumbnail`/`thumb` into
///    `original`, force `w_<n>`/`h_<n>` tokens to 2048
/// 3. on Shopify CDN hosts, strip `width`/`height`/`quality`/`crop` and append
///    `width=4096&quality=100&format=auto`
///
/// # Examples
/// ```
/// use kodegen_tools_imagescrape::url_optimizer::upgrade;
///
/// let url = upgrade("https://cdn.shopify.com/files/case_small.jpg?width=200");
/// assert_eq!(url, "https://cdn.shopify.com/files/case.jpg?width=4096&quality=100&format=auto");
/// assert_eq!(upgrade(&url), url);
/// ```
#[must_use]
pub fn upgrade(url: &str) -> String {
    let shopify = is_shopify_cdn(url);

    // A previous upgrade left the quality suffix behind; peel it off so the
    // strip passes below don't mangle it and it is re-appended exactly once.
    let mut current = if shopify {
        strip_quality_suffix(url).to_string()
    } else {
        url.to_string()
    };

    for _ in 0..MAX_REWRITE_PASSES {
        let next = rewrite_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if is_shopify_cdn(&current) {
        let separator = if current.contains('?') { '&' } else { '?' };
        current.push(separator);
        current.push_str(SHOPIFY_QUALITY_PARAMS);
    }

    current
}

/// One pass of every stripping/rewriting rule
fn rewrite_pass(url: &str) -> String {
    let mut out = strip_params(url, &SIZE_PARAM_REGEX);

    out = SIZE_INFIX_REGEX.replace_all(&out, "").into_owned();
    out = THUMB_TOKEN_REGEX.replace_all(&out, "original").into_owned();
    out = WIDTH_TOKEN_REGEX
        .replace_all(&out, format!("w_{HIGH_RES_DIMENSION}").as_str())
        .into_owned();
    out = HEIGHT_TOKEN_REGEX
        .replace_all(&out, format!("h_{HIGH_RES_DIMENSION}").as_str())
        .into_owned();

    if is_shopify_cdn(&out) {
        out = strip_params(&out, &SHOPIFY_PARAM_REGEX);
        out.truncate(out.trim_end_matches(['?', '&']).len());
    }

    out
}

/// Remove every parameter matched by `pattern`
///
/// When the removed parameter was the first one (`?w=100&v=2`), the next
/// surviving parameter takes over the `?` so the query stays well-formed.
fn strip_params(url: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(url.len());
    let mut last = 0;
    let mut owes_question_mark = false;

    for m in pattern.find_iter(url) {
        push_kept(&mut out, &url[last..m.start()], &mut owes_question_mark);
        if m.as_str().starts_with('?') {
            owes_question_mark = true;
        }
        last = m.end();
    }
    push_kept(&mut out, &url[last..], &mut owes_question_mark);

    out
}

fn push_kept(out: &mut String, segment: &str, owes_question_mark: &mut bool) {
    if segment.is_empty() {
        return;
    }
    if *owes_question_mark {
        out.push('?');
        out.push_str(segment.strip_prefix('&').unwrap_or(segment));
        *owes_question_mark = false;
    } else {
        out.push_str(segment);
    }
}

/// Drop a trailing `?width=4096&quality=100&format=auto` (or `&...`)
fn strip_quality_suffix(url: &str) -> &str {
    match url.strip_suffix(SHOPIFY_QUALITY_PARAMS) {
        Some(rest) if rest.ends_with('?') || rest.ends_with('&') => &rest[..rest.len() - 1],
        _ => url,
    }
}

/// Whether the URL is served by the Shopify image CDN
#[must_use]
pub fn is_shopify_cdn(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();

    host == "cdn.shopify.com" || host == "shopifycdn.com" || host.ends_with(".shopifycdn.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_generic_size_params() {
        assert_eq!(
            upgrade("https://example.com/a.jpg?w=300&v=2"),
            "https://example.com/a.jpg?v=2"
        );
        assert_eq!(
            upgrade("https://example.com/a.jpg?v=2&height=40&scale=3"),
            "https://example.com/a.jpg?v=2"
        );
        assert_eq!(
            upgrade("https://example.com/a.jpg?size=64"),
            "https://example.com/a.jpg"
        );
    }

    #[test]
    fn rewrites_filename_markers() {
        assert_eq!(
            upgrade("https://example.com/img/case_medium.png"),
            "https://example.com/img/case.png"
        );
        assert_eq!(
            upgrade("https://example.com/thumbnails/case.png"),
            "https://example.com/originals/case.png"
        );
        assert_eq!(
            upgrade("https://img.example.com/c_fill,w_400,h_300/case.jpg"),
            "https://img.example.com/c_fill,w_2048,h_2048/case.jpg"
        );
    }

    #[test]
    fn shopify_gets_quality_params() {
        let url = upgrade("https://cdn.shopify.com/s/files/skin.jpg?v=17&width=200&crop=center");
        assert_eq!(
            url,
            "https://cdn.shopify.com/s/files/skin.jpg?v=17&width=4096&quality=100&format=auto"
        );
    }

    #[test]
    fn shopify_family_hosts() {
        assert!(is_shopify_cdn("https://cdn.shopify.com/a.jpg"));
        assert!(is_shopify_cdn("https://cdn.shopifycdn.com/a.jpg"));
        assert!(is_shopify_cdn("https://shopifycdn.com/a.jpg"));
        assert!(!is_shopify_cdn("https://example.com/cdn.shopify.com/a.jpg"));
        assert!(!is_shopify_cdn("not a url"));
    }

    #[test]
    fn already_upgraded_is_stable() {
        let url = "https://cdn.shopify.com/a.jpg?width=4096&quality=100&format=auto";
        assert_eq!(upgrade(url), url);
    }

    #[test]
    fn strip_params_promotes_next_parameter() {
        assert_eq!(
            strip_params("a.jpg?w=1&h=2&x=3", &SIZE_PARAM_REGEX),
            "a.jpg?x=3"
        );
        assert_eq!(strip_params("a.jpg?x=3&w=1", &SIZE_PARAM_REGEX), "a.jpg?x=3");
        assert_eq!(strip_params("a.jpg", &SIZE_PARAM_REGEX), "a.jpg");
    }
}
