//! Embedded document outline (bookmarks).

use super::{HeadingLevel, OutlineEntry};
use serde::{Deserialize, Serialize};

/// Page used for bookmarks whose destination cannot be resolved.
pub const UNRESOLVED_PAGE: u32 = 1;

/// A bookmark node read from the PDF `/Outlines` tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Bookmark title as stored in the document
    pub title: String,

    /// Target page number (1-indexed), if the destination resolved
    pub page: Option<u32>,

    /// Child bookmarks
    pub children: Vec<Bookmark>,
}

impl Bookmark {
    /// Create a new bookmark without children.
    pub fn new(title: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            title: title.into(),
            page,
            children: Vec::new(),
        }
    }

    /// Add a child bookmark.
    pub fn add_child(&mut self, child: Bookmark) {
        self.children.push(child);
    }

    /// Builder-style variant of [`Bookmark::add_child`].
    pub fn with_child(mut self, child: Bookmark) -> Self {
        self.add_child(child);
        self
    }
}

/// Total number of bookmarks, nested ones included.
pub fn count_bookmarks(items: &[Bookmark]) -> usize {
    items
        .iter()
        .map(|item| 1 + count_bookmarks(&item.children))
        .sum()
}

/// Flatten a bookmark forest into outline entries in document order.
///
/// Top-level bookmarks are H1, their children H2, and so on; anything
/// nested deeper than six levels is reported as H6.
pub fn flatten_bookmarks(items: &[Bookmark]) -> Vec<OutlineEntry> {
    let mut entries = Vec::with_capacity(count_bookmarks(items));
    // Explicit stack rather than recursion: malformed files can nest deeply.
    let mut stack: Vec<(&Bookmark, usize)> = items.iter().rev().map(|b| (b, 1)).collect();

    while let Some((item, depth)) = stack.pop() {
        entries.push(OutlineEntry::new(
            HeadingLevel::from_depth(depth),
            item.title.trim(),
            item.page.unwrap_or(UNRESOLVED_PAGE),
        ));
        stack.extend(item.children.iter().rev().map(|c| (c, depth + 1)));
    }

    entries
}
