//! Layout backend: content stream analysis with font sizes and faces.

use std::path::Path;

use super::{BackendKind, ExtractionBackend};
use crate::error::Result;
use crate::heuristics::{fonts, title};
use crate::model::{flatten_bookmarks, ExtractionResult};
use crate::parser::{ErrorMode, ExtractOptions, LayoutAnalyzer, PdfDocument};

/// Uses embedded bookmarks when present, otherwise detects headings from
/// font size, weight and casing.
#[derive(Debug, Clone, Default)]
pub struct LayoutBackend;

impl LayoutBackend {
    /// Create a new layout backend.
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
        let analyzer = LayoutAnalyzer::new(doc);

        let metadata = doc.metadata_title();
        let first_page = match metadata {
            Some(_) => None,
            None => doc.page_numbers().first().and_then(|&page| {
                analyzer
                    .page_lines(page)
                    .map_err(|e| log::debug!("{}: no first-page lines: {}", path.display(), e))
                    .ok()
                    .and_then(|lines| lines.iter().map(|l| l.text()).find(|t| !t.trim().is_empty()))
            }),
        };
        let title = title::select_title(
            metadata.as_deref(),
            first_page.as_deref(),
            options.title_max_chars,
            || title::raw_stem(path),
        );

        let bookmarks = doc.bookmarks();
        if !bookmarks.is_empty() {
            return Ok(ExtractionResult::new(title).with_outline(flatten_bookmarks(&bookmarks)));
        }

        let pages = doc.page_numbers();
        let mut runs = Vec::new();
        let mut last_error = None;
        let mut read = 0;
        for &page in &pages {
            match analyzer.page_runs(page) {
                Ok(page_runs) => {
                    runs.extend(page_runs);
                    read += 1;
                }
                Err(e) if options.error_mode == ErrorMode::Lenient => {
                    log::warn!("{}: skipping page {}: {}", path.display(), page, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        // No readable page at all: let the chain try its next backend.
        if let (0, Some(e)) = (read, last_error) {
            return Err(e);
        }

        let outline = fonts::detect_headings(&runs, options.max_headings);
        Ok(ExtractionResult::new(title).with_outline(outline))
    }
}

impl ExtractionBackend for LayoutBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Layout
    }

    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractionResult> {
        let doc = PdfDocument::open(path)?;
        self.extract_document(&doc, path, options)
    }
}
