//! Rule table for plain page text read through the document structure.
//!
//! Favors numbered section titles and front/back-matter keywords, which
//! survive plain text extraction intact.

use super::{
    char_len, has_numbered_prefix, has_subsection_prefix, is_uppercase, normalize,
    starts_with_ignore_case, word_count, OutlineCollector,
};
use crate::model::{HeadingLevel, OutlineEntry};

/// Front- and back-matter section names.
pub const DOCUMENT_KEYWORDS: [&str; 11] = [
    "Table of Contents",
    "Contents",
    "Revision History",
    "Acknowledgements",
    "Abstract",
    "Summary",
    "Overview",
    "Introduction",
    "Conclusion",
    "References",
    "Bibliography",
];

const DIVISION_PREFIXES: [&str; 4] = ["Chapter", "Section", "Part", "Appendix"];

const TOP_LEVEL_PREFIXES: [&str; 2] = ["Chapter", "Part"];

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 200;
const MAX_UPPERCASE_LEN: usize = 100;
const MAX_UPPERCASE_H1_LEN: usize = 50;
const MAX_COLON_WORDS: usize = 10;

/// Classify one line of page text.
///
/// Returns the heading level and cleaned text, or `None` for body text.
pub fn classify_line(line: &str) -> Option<(HeadingLevel, String)> {
    let line = normalize(line);
    if char_len(&line) < MIN_LEN {
        return None;
    }

    let text = line.strip_suffix('.').map_or(line.as_str(), str::trim_end);
    if char_len(text) >= MAX_LEN || text.ends_with('.') {
        return None;
    }

    let keyword = DOCUMENT_KEYWORDS
        .iter()
        .any(|k| starts_with_ignore_case(text, k));
    let division = DIVISION_PREFIXES
        .iter()
        .any(|p| starts_with_ignore_case(text, p));
    let numbered = has_numbered_prefix(text);
    let uppercase = is_uppercase(text);

    let is_heading = keyword
        || numbered
        || has_subsection_prefix(text)
        || division
        || (uppercase && char_len(text) < MAX_UPPERCASE_LEN)
        || (word_count(text) <= MAX_COLON_WORDS && text.contains(':'));
    if !is_heading {
        return None;
    }

    let top_level = keyword
        || TOP_LEVEL_PREFIXES
            .iter()
            .any(|p| starts_with_ignore_case(text, p));

    // `N.M` subsections also carry the `N.` prefix, so they are H1 as well.
    let level = if top_level || numbered || (uppercase && char_len(text) < MAX_UPPERCASE_H1_LEN) {
        HeadingLevel::H1
    } else {
        HeadingLevel::H2
    };

    Some((level, text.to_string()))
}

/// Detect headings in `(page number, page text)` pairs, in order.
///
/// Pages are pulled lazily and iteration stops once `max` headings are found.
pub fn detect_headings<I, S>(pages: I, max: Option<usize>) -> Vec<OutlineEntry>
where
    I: IntoIterator<Item = (u32, S)>,
    S: AsRef<str>,
{
    let mut collector = OutlineCollector::new(max);

    for (page, text) in pages {
        for line in text.as_ref().lines() {
            if collector.is_full() {
                return collector.finish();
            }
            if let Some((level, text)) = classify_line(line) {
                collector.push(OutlineEntry::new(level, text, page));
            }
        }
    }

    collector.finish()
}
