//! PDF access and layout analysis.

mod document;
mod layout;
mod options;

pub use document::{decode_pdf_string, PdfDocument};
pub use layout::{
    group_spans_into_lines, is_bold_font, is_italic_font, spans_from_operations, LayoutAnalyzer,
    TextLine, TextRun, TextSpan,
};
pub use options::{ErrorMode, ExtractOptions, DEFAULT_MAX_HEADINGS, DEFAULT_TITLE_MAX_CHARS};
