//! Document structure backend: metadata, bookmarks and page text via lopdf.

use std::path::Path;

use super::{BackendKind, ExtractionBackend};
use crate::error::Result;
use crate::heuristics::{text, title};
use crate::model::{flatten_bookmarks, ExtractionResult};
use crate::parser::{ErrorMode, ExtractOptions, PdfDocument};

/// Reads the embedded outline when there is one and falls back to the
/// text rule table over each page's text.
#[derive(Debug, Clone, Default)]
pub struct StructureBackend;

impl StructureBackend {
    /// Create a new structure backend.
    pub fn new() -> Self {
        Self
    }

    /// Extract from an already opened document.
    pub fn extract_document(
        &self,
        doc: &PdfDocument,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractionResult> {
        let metadata = doc.metadata_title();
        let first_page = match metadata {
            Some(_) => None,
            None => doc.page_numbers().first().and_then(|&page| {
                doc.page_text(page)
                    .map_err(|e| log::debug!("{}: no first-page text: {}", path.display(), e))
                    .ok()
            }),
        };
        let title = title::select_title(
            metadata.as_deref(),
            first_page.as_deref(),
            options.title_max_chars,
            || title::cleaned_stem(path),
        );

        let bookmarks = doc.bookmarks();
        if !bookmarks.is_empty() {
            log::debug!("{}: {} top-level bookmarks", path.display(), bookmarks.len());
            return Ok(ExtractionResult::new(title).with_outline(flatten_bookmarks(&bookmarks)));
        }

        // Pages are read lazily so the heading cap also bounds the work done.
        let mut failure = None;
        let pages = doc
            .page_numbers()
            .into_iter()
            .map_while(|page| match doc.page_text(page) {
                Ok(text) => Some(Some((page, text))),
                Err(e) if options.error_mode == ErrorMode::Lenient => {
                    log::warn!("{}: skipping page {}: {}", path.display(), page, e);
                    Some(None)
                }
                Err(e) => {
                    failure = Some(e);
                    None
                }
            })
            .flatten();

        let outline = text::detect_headings(pages, options.max_headings);
        match failure {
            Some(e) => Err(e),
            None => Ok(ExtractionResult::new(title).with_outline(outline)),
        }
    }
}

impl ExtractionBackend for StructureBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Structure
    }

    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractionResult> {
        let doc = PdfDocument::open(path)?;
        self.extract_document(&doc, path, options)
    }
}
