//! Plain-text backend via pdf-extract.
//!
//! `pdf_extract` can panic on malformed input rather than returning an
//! error, so every call runs inside [`std::panic::catch_unwind`].

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::{BackendKind, ExtractionBackend};
use crate::detect::sniff_bytes;
use crate::error::{Error, Result};
use crate::heuristics::{lines, title};
use crate::model::ExtractionResult;
use crate::parser::ExtractOptions;

/// Extracts per-page text with pdf-extract and applies the line rule table.
#[derive(Debug, Clone, Default)]
pub struct PlainTextBackend;

impl PlainTextBackend {
    /// Create a new plain-text backend.
    pub fn new() -> Self {
        Self
    }

    /// Extract from PDF bytes; `path` supplies the filename title.
    pub fn extract_bytes(
        &self,
        data: &[u8],
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractionResult> {
        sniff_bytes(data)?;
        let pages = extract_pages(data)?;

        let title = title::select_title(
            None,
            pages.first().map(String::as_str),
            options.title_max_chars,
            || title::raw_stem(path),
        );

        let numbered = pages.iter().zip(1u32..).map(|(text, page)| (page, text));
        let outline = lines::detect_headings(numbered, options.max_headings);
        Ok(ExtractionResult::new(title).with_outline(outline))
    }
}

impl ExtractionBackend for PlainTextBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::PlainText
    }

    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractionResult> {
        let data = std::fs::read(path)?;
        self.extract_bytes(&data, path, options)
    }
}

/// Extract pages of text, one `String` per page.
fn extract_pages(data: &[u8]) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(Error::Panicked("pdf-extract".to_string())),
    }
}
