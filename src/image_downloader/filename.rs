//! Destination filenames for downloaded images

use std::collections::HashSet;
use std::path::Path;

use crate::utils::{IMAGE_EXTENSIONS, url_path};

/// Filename derived from the last URL path segment
///
/// Anything outside `[A-Za-z0-9_.-]` becomes `_`. An empty segment falls back
/// to `image_<idx>`, and `.jpg` is appended when no known image extension is
/// present.
#[must_use]
pub fn filename_for(url: &str, idx: usize) -> String {
    let path = url_path(url);
    let segment = path.rsplit('/').next().unwrap_or_default();

    let mut name = if segment.is_empty() {
        format!("image_{idx}")
    } else {
        sanitize(segment)
    };

    let lower = name.to_ascii_lowercase();
    if !IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        name.push_str(".jpg");
    }
    name
}

#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Extension implied by a response `Content-Type`, if it names a known format
#[must_use]
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("jpeg") || ct.contains("jpg") {
        Some("jpg")
    } else if ct.contains("png") {
        Some("png")
    } else if ct.contains("webp") {
        Some("webp")
    } else if ct.contains("avif") {
        Some("avif")
    } else {
        None
    }
}

/// `filename` with its extension replaced to match `content_type`
///
/// Unknown content types keep the URL-derived name.
#[must_use]
pub fn correct_extension(filename: &str, content_type: &str) -> String {
    match extension_for_content_type(content_type) {
        Some(ext) => Path::new(filename)
            .with_extension(ext)
            .to_string_lossy()
            .into_owned(),
        None => filename.to_string(),
    }
}

/// Make stems unique within a batch by appending `_<idx>` to repeats
///
/// Stems are compared case-insensitively so a later extension correction
/// (`a.png` served as JPEG) can't land on another item's file. A generated
/// stem that is itself taken gets a further `_<n>` counter.
#[must_use]
pub fn disambiguate(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());

    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let (stem, ext) = split_extension(&name);
            if seen.insert(stem.to_ascii_lowercase()) {
                return name;
            }

            let mut unique_stem = format!("{stem}_{idx}");
            let mut counter = 1;
            while !seen.insert(unique_stem.to_ascii_lowercase()) {
                unique_stem = format!("{stem}_{idx}_{counter}");
                counter += 1;
            }

            match ext {
                Some(ext) => format!("{unique_stem}.{ext}"),
                None => unique_stem,
            }
        })
        .collect()
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}
