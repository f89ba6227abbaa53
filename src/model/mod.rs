//! Document model types for extraction results.
//!
//! [`ExtractionResult`] is the record serialized for each input document;
//! [`Bookmark`] is the embedded outline tree it can be built from.

mod bookmark;
mod outline;

pub use bookmark::{count_bookmarks, flatten_bookmarks, Bookmark, UNRESOLVED_PAGE};
pub use outline::{ExtractionResult, HeadingLevel, OutlineEntry};
