//! # pdf-outline
//!
//! Extract a document title and a heading outline from PDF files.
//!
//! Documents with an embedded table of contents (bookmarks) are read
//! directly. Everything else goes through heading heuristics: numbering
//! prefixes, keywords, capitalization, and font size relative to the body
//! text. Results serialize to a small JSON record:
//!
//! ```json
//! {
//!   "title": "Understanding AI",
//!   "outline": [
//!     { "level": "H1", "text": "Introduction", "page": 1 }
//!   ]
//! }
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_file, render};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let extraction = extract_file("document.pdf")?;
//!     println!("{}", render::to_json(&extraction.result, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Batch processing
//!
//! ```no_run
//! use pdf_outline::{process_directory, BatchOptions};
//! use std::path::Path;
//!
//! let report = process_directory(
//!     Path::new("/app/input"),
//!     Path::new("/app/output"),
//!     &BatchOptions::default().with_parallel(true),
//! )
//! .unwrap();
//! println!("{} files, {} failed", report.len(), report.failures());
//! ```

pub mod backend;
pub mod batch;
pub mod detect;
pub mod error;
pub mod heuristics;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use backend::{
    parse_backend_list, BackendChain, BackendKind, Extraction, ExtractionBackend, ResultSource,
};
pub use batch::{process_directory, BatchOptions, BatchReport, FileOutcome, FileStatus};
pub use detect::{is_pdf_bytes, sniff_file, PdfHeader};
pub use error::{Error, Result};
pub use model::{Bookmark, ExtractionResult, HeadingLevel, OutlineEntry};
pub use parser::{ErrorMode, ExtractOptions, PdfDocument};
pub use render::JsonFormat;

use std::path::Path;

/// Extract a title and outline from a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::extract_file;
///
/// let extraction = extract_file("document.pdf").unwrap();
/// println!("{}: {} headings", extraction.result.title, extraction.result.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    extract_file_with_options(path, &ExtractOptions::default())
}

/// Extract a title and outline from a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_file_with_options, BackendKind, ExtractOptions};
///
/// let options = ExtractOptions::new()
///     .strict()
///     .with_backends([BackendKind::Layout])
///     .with_max_headings(None);
/// let extraction = extract_file_with_options("document.pdf", &options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<Extraction> {
    BackendChain::for_options(options).extract(path.as_ref(), options)
}

/// Convert a PDF file to its outline JSON.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{to_json, JsonFormat};
///
/// let json = to_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let extraction = extract_file(path)?;
    render::to_json(&extraction.result, format)
}

/// Library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
