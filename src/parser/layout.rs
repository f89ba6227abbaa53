//! Layout analysis for PDF pages.
//!
//! Walks page content streams with a minimal text-state machine to recover
//! text spans with position and font information, then groups them into
//! visual lines and same-font runs for font-based heading detection.

use std::collections::HashMap;

use lopdf::content::Operation;
use lopdf::{Document as LopdfDocument, Object};

use crate::error::Result;

use super::document::{decode_pdf_string, PdfDocument};

/// Approximate glyph width as a fraction of the font size.
const GLYPH_WIDTH_RATIO: f32 = 0.5;

/// `TJ` adjustments above this many thousandths of an em read as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Leading used by `T*` before any `TL` / `TD` sets one.
const DEFAULT_LEADING: f32 = 12.0;

const DEFAULT_FONT_SIZE: f32 = 12.0;

const SPACES: &[char] = &[' ', '\u{00A0}'];

/// A text span with position and style information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let width = text.chars().count() as f32 * font_size * GLYPH_WIDTH_RATIO;
        let is_bold = is_bold_font(&font_name);
        let is_italic = is_italic_font(&font_name);

        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
            is_italic,
        }
    }

    fn same_font(&self, other: &TextSpan) -> bool {
        self.font_name == other.font_name && (self.font_size - other.font_size).abs() < 0.01
    }
}

/// Whether a font name denotes a bold face.
pub fn is_bold_font(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("bold") || lower.contains("black") || lower.contains("heavy")
}

/// Whether a font name denotes an italic face.
pub fn is_italic_font(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("italic") || lower.contains("oblique")
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        let (x, y) = spans.first().map_or((0.0, 0.0), |s| (s.x, s.y));
        Self { spans, y, x }
    }

    /// Combined text of all spans.
    pub fn text(&self) -> String {
        join_spans(&self.spans)
    }

    /// Split the line into runs of consecutive spans sharing font name and size.
    pub fn runs(&self, page: u32) -> Vec<TextRun> {
        self.spans
            .chunk_by(|a, b| a.same_font(b))
            .map(|group| TextRun {
                text: join_spans(group),
                font_name: group[0].font_name.clone(),
                font_size: group[0].font_size,
                is_bold: group[0].is_bold,
                page,
            })
            .collect()
    }
}

/// Text in a single font on one visual line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Run text
    pub text: String,
    /// Font name
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Page the run appears on (1-indexed)
    pub page: u32,
}

/// Join spans left to right, inserting a space where the horizontal gap
/// suggests one. Adjacent CJK characters are never separated.
fn join_spans(spans: &[TextSpan]) -> String {
    let mut result = String::new();

    for (i, span) in spans.iter().enumerate() {
        if i > 0 {
            let prev = &spans[i - 1];
            let gap = span.x - (prev.x + prev.width);

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.width > 0.0 {
                span.width / char_count as f32
            } else {
                span.font_size * GLYPH_WIDTH_RATIO
            };

            let both_cjk = matches!(
                (prev.text.chars().last(), span.text.chars().next()),
                (Some(a), Some(b)) if is_spaceless_script_char(a) && is_spaceless_script_char(b)
            );
            let has_space = result.ends_with(SPACES)
                || span.text.starts_with(SPACES);

            if gap > avg_char_width * 0.2 && !both_cjk && !has_space {
                result.push(' ');
            }
        }
        result.push_str(&span.text);
    }

    result
}

/// Layout analyzer for one document.
pub struct LayoutAnalyzer<'a> {
    doc: &'a PdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create an analyzer over an opened document.
    pub fn new(doc: &'a PdfDocument) -> Self {
        Self { doc }
    }

    /// Extract text spans from a page with position and font information.
    pub fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        let page_id = self.doc.page_id(page)?;
        let raw: &LopdfDocument = self.doc.raw_doc();
        let fonts = raw.get_page_fonts(page_id)?;

        let base_fonts: HashMap<&[u8], String> = fonts
            .iter()
            .map(|(name, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                (name.as_slice(), base_font)
            })
            .collect();
        let encodings: HashMap<&[u8], _> = fonts
            .iter()
            .filter_map(|(name, dict)| {
                dict.get_font_encoding(raw)
                    .ok()
                    .map(|enc| (name.as_slice(), enc))
            })
            .collect();

        let decode = |font: &[u8], bytes: &[u8]| match encodings.get(font) {
            Some(enc) => LopdfDocument::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_pdf_string(bytes)),
            None => decode_pdf_string(bytes),
        };

        let operations = self.doc.page_operations(page_id)?;
        Ok(spans_from_operations(&operations, &base_fonts, decode))
    }

    /// Extract visual lines from a page, top to bottom.
    pub fn page_lines(&self, page: u32) -> Result<Vec<TextLine>> {
        Ok(group_spans_into_lines(self.page_spans(page)?))
    }

    /// Extract same-font runs from a page, in reading order.
    pub fn page_runs(&self, page: u32) -> Result<Vec<TextRun>> {
        Ok(self
            .page_lines(page)?
            .iter()
            .flat_map(|line| line.runs(page))
            .collect())
    }
}

/// Run the text-state machine over content stream operations.
///
/// `fonts` maps font resource names to base font names; `decode` turns the
/// bytes of a text-showing operator into text for the given font resource.
pub fn spans_from_operations<F>(
    operations: &[Operation],
    fonts: &HashMap<&[u8], String>,
    decode: F,
) -> Vec<TextSpan>
where
    F: Fn(&[u8], &[u8]) -> String,
{
    let mut spans = Vec::new();
    let mut state = TextState::default();
    let mut in_text_block = false;

    for op in operations {
        let operands = &op.operands;
        let text = match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                state.matrix = TextMatrix::default();
                None
            }
            "ET" => {
                in_text_block = false;
                None
            }
            "Tf" => {
                if let [Object::Name(resource), size, ..] = operands.as_slice() {
                    state.font_name = fonts
                        .get(resource.as_slice())
                        .cloned()
                        .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
                    state.font_resource = resource.clone();
                    state.font_size = get_number(size).unwrap_or(DEFAULT_FONT_SIZE);
                }
                None
            }
            "Td" | "TD" => {
                if let [tx, ty, ..] = operands.as_slice() {
                    let tx = get_number(tx).unwrap_or(0.0);
                    let ty = get_number(ty).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.matrix.translate(tx, ty);
                }
                None
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    state.leading = leading;
                }
                None
            }
            "Tm" => {
                if operands.len() >= 6 {
                    let n = |i: usize, default: f32| get_number(&operands[i]).unwrap_or(default);
                    state
                        .matrix
                        .set(n(0, 1.0), n(1, 0.0), n(2, 0.0), n(3, 1.0), n(4, 0.0), n(5, 0.0));
                }
                None
            }
            "T*" => {
                state.matrix.next_line(state.leading);
                None
            }
            "Tj" => match operands.first() {
                Some(Object::String(bytes, _)) => Some(decode(&state.font_resource, bytes)),
                _ => None,
            },
            "TJ" => match operands.first() {
                Some(Object::Array(items)) => Some(decode_tj_array(items, |bytes| {
                    decode(&state.font_resource, bytes)
                })),
                _ => None,
            },
            "'" | "\"" => {
                state.matrix.next_line(state.leading);
                let text_idx = if op.operator == "\"" { 2 } else { 0 };
                match operands.get(text_idx) {
                    Some(Object::String(bytes, _)) => Some(decode(&state.font_resource, bytes)),
                    _ => None,
                }
            }
            _ => None,
        };

        if let Some(text) = text {
            if in_text_block && !text.trim().is_empty() {
                let (x, y) = state.matrix.position();
                let size = state.font_size * state.matrix.scale();
                spans.push(TextSpan::new(text, x, y, size, state.font_name.clone()));
            }
        }
    }

    spans
}

/// Decode a `TJ` array, turning large positioning adjustments into spaces.
fn decode_tj_array<F>(items: &[Object], decode: F) -> String
where
    F: Fn(&[u8]) -> String,
{
    let mut combined = String::new();

    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode(bytes)),
            Object::Integer(_) | Object::Real(_) => {
                // Negative adjustments advance to the right
                let adjustment = -get_number(item).unwrap_or(0.0);
                if adjustment > TJ_SPACE_THRESHOLD && !combined.ends_with(SPACES) {
                    if let Some(c) = combined.chars().last() {
                        if !is_spaceless_script_char(c) {
                            combined.push(' ');
                        }
                    }
                }
            }
            _ => {}
        }
    }

    combined
}

/// Group spans into lines ordered top to bottom.
///
/// Spans whose baselines are within 30% of the font size share a line.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // Sort spans by Y (descending, since PDF Y is bottom-up) then X
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Text state tracked across operators.
#[derive(Debug, Clone)]
struct TextState {
    matrix: TextMatrix,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: TextMatrix::default(),
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            leading: DEFAULT_LEADING,
        }
    }
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self, leading: f32) {
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Vertical scale factor.
    fn scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if a character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        // CJK Unified Ideographs and Extension A
        0x4E00..=0x9FFF | 0x3400..=0x4DBF
        // Extensions B-F
        | 0x20000..=0x2EBEF
        // Hiragana, Katakana
        | 0x3040..=0x30FF
        // CJK Symbols and Punctuation
        | 0x3000..=0x303F)
}
