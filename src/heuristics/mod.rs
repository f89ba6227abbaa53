//! Heading detection heuristics.
//!
//! Each extraction backend sees a different view of the document, so there
//! is one rule table per view:
//!
//! - [`text`]: plain page text from the structure backend
//! - [`lines`]: plain page text from the plain-text backend
//! - [`fonts`]: font-attributed runs from the layout backend
//!
//! The rules are surface-level pattern matches. They over- and
//! under-detect, and callers treat the output as a best-effort outline.

pub mod fonts;
pub mod lines;
pub mod text;
pub mod title;

use unicode_normalization::UnicodeNormalization;

use crate::model::OutlineEntry;

/// NFKC-normalize and collapse internal whitespace.
pub fn normalize(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// At least one cased letter, and every cased letter is uppercase.
pub fn is_uppercase(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Length in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// ASCII case-insensitive prefix test.
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

/// `N.` or `N ` with N in 1..=9.
pub fn has_numbered_prefix(text: &str) -> bool {
    matches!(text.as_bytes(), [b'1'..=b'9', b'.' | b' ', ..])
}

/// `N.M` with N in 1..=4 and M in 1..=9.
pub fn has_subsection_prefix(text: &str) -> bool {
    matches!(text.as_bytes(), [b'1'..=b'4', b'.', b'1'..=b'9', ..])
}

/// Collects heuristic headings up to an optional cap.
#[derive(Debug)]
pub(crate) struct OutlineCollector {
    entries: Vec<OutlineEntry>,
    max: Option<usize>,
}

impl OutlineCollector {
    pub(crate) fn new(max: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            max,
        }
    }

    /// Whether the cap has been reached.
    pub(crate) fn is_full(&self) -> bool {
        self.max.is_some_and(|max| self.entries.len() >= max)
    }

    /// Add an entry unless the cap has been reached.
    pub(crate) fn push(&mut self, entry: OutlineEntry) {
        if !self.is_full() {
            self.entries.push(entry);
        }
    }

    pub(crate) fn finish(self) -> Vec<OutlineEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  The \u{FB01}rst   part\t"), "The first part");
        assert_eq!(normalize("\u{00A0}A\u{00A0}B"), "A B");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_is_uppercase() {
        assert!(is_uppercase("INTRODUCTION"));
        assert!(is_uppercase("PART 2: RESULTS"));
        assert!(is_uppercase("ÉTUDE"));
        assert!(!is_uppercase("Introduction"));
        assert!(!is_uppercase("1.2.3"));
        assert!(!is_uppercase(""));
    }

    #[test]
    fn test_char_len_counts_chars() {
        assert_eq!(char_len("résumé"), 6);
        assert_eq!(word_count(" a  b c "), 3);
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("CHAPTER 1", "Chapter"));
        assert!(starts_with_ignore_case("chapter", "Chapter"));
        assert!(!starts_with_ignore_case("Chap", "Chapter"));
        assert!(!starts_with_ignore_case("éChapter", "Chapter"));
    }

    #[test]
    fn test_numbering_prefixes() {
        assert!(has_numbered_prefix("1. Scope"));
        assert!(has_numbered_prefix("9 Results"));
        assert!(!has_numbered_prefix("0. Zero"));
        assert!(!has_numbered_prefix("10 Items"));

        assert!(has_subsection_prefix("1.1 Background"));
        assert!(has_subsection_prefix("4.9"));
        assert!(!has_subsection_prefix("5.1 Out of range"));
        assert!(!has_subsection_prefix("1.0"));
    }

    #[test]
    fn test_collector_cap() {
        let mut collector = OutlineCollector::new(Some(2));
        for page in 1..=5 {
            collector.push(OutlineEntry::new(HeadingLevel::H1, "x", page));
        }
        assert!(collector.is_full());
        assert_eq!(collector.finish().len(), 2);

        let mut unlimited = OutlineCollector::new(None);
        for page in 1..=5 {
            unlimited.push(OutlineEntry::new(HeadingLevel::H1, "x", page));
        }
        assert!(!unlimited.is_full());
        assert_eq!(unlimited.finish().len(), 5);
    }
}
