//! Rule table for line-oriented text from the plain-text backend.

use super::{char_len, is_uppercase, normalize, word_count, OutlineCollector};
use crate::model::{HeadingLevel, OutlineEntry};

/// Case-sensitive prefixes that mark a line as a heading.
const HEADING_PREFIXES: [&str; 5] = ["Chapter", "Section", "Part", "Introduction", "Conclusion"];

const MIN_LEN_EXCLUSIVE: usize = 3;
const MAX_LEN: usize = 100;
const MAX_SHORT_WORDS: usize = 8;

/// Classify one trimmed line.
pub fn classify_line(line: &str) -> Option<(HeadingLevel, String)> {
    let line = normalize(line);
    let len = char_len(&line);
    if len <= MIN_LEN_EXCLUSIVE || len >= MAX_LEN {
        return None;
    }

    let uppercase = is_uppercase(&line);
    let is_heading = uppercase
        || HEADING_PREFIXES.iter().any(|p| line.starts_with(p))
        || line.ends_with(':')
        || (word_count(&line) <= MAX_SHORT_WORDS && !line.ends_with('.'));
    if !is_heading {
        return None;
    }

    let level = if line.starts_with("Chapter") || line.starts_with("Part") {
        HeadingLevel::H1
    } else if line.starts_with("Section") || uppercase {
        HeadingLevel::H2
    } else {
        HeadingLevel::H3
    };

    Some((level, line))
}

/// Detect headings in `(page number, page text)` pairs.
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
