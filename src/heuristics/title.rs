//! Document title selection.

use std::path::Path;

/// Truncate to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// First non-empty trimmed line of a page's text.
pub fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// File stem, unchanged.
pub fn raw_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// File stem with `_` and `-` replaced by spaces.
pub fn cleaned_stem(path: &Path) -> String {
    raw_stem(path).replace(['_', '-'], " ")
}

/// Title-cased cleaned stem, used when no backend could read the file.
///
/// A letter is uppercased when it follows a non-letter and lowercased
/// otherwise: `annual_report-2b` becomes `Annual Report 2B`.
pub fn fallback_title(path: &Path) -> String {
    let mut result = String::new();
    let mut prev_is_letter = false;
    for c in cleaned_stem(path).chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            result.push(c);
            prev_is_letter = false;
        }
    }
    result
}

/// Pick a title: metadata first, then the first line of page 1, then the
/// filename-based default. Non-filename titles are truncated to `max_chars`.
pub fn select_title(
    metadata: Option<&str>,
    first_page: Option<&str>,
    max_chars: usize,
    default: impl FnOnce() -> String,
) -> String {
    metadata
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| first_page.and_then(first_line))
        .map(|t| truncate_chars(t, max_chars))
        .unwrap_or_else(default)
}
