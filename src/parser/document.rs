//! Thin wrapper over `lopdf::Document` exposing what outline extraction needs.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::detect::{sniff_bytes, sniff_file, PdfHeader};
use crate::error::{Error, Result};
use crate::model::Bookmark;

/// Reference chains longer than this are treated as broken.
const MAX_REFERENCE_HOPS: usize = 16;

/// Bookmark nesting beyond this depth is ignored.
const MAX_BOOKMARK_DEPTH: usize = 64;

static NULL_OBJECT: Object = Object::Null;

/// An opened PDF document.
pub struct PdfDocument {
    doc: LopdfDocument,
    header: PdfHeader,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let header = sniff_file(path)?;
        let doc = LopdfDocument::load(path)?;
        Ok(Self::new(doc, header))
    }

    /// Open a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::new(doc, header))
    }

    fn new(doc: LopdfDocument, header: PdfHeader) -> Self {
        let pages = doc.get_pages();
        Self { doc, header, pages }
    }

    /// Header found when the document was opened.
    pub fn header(&self) -> &PdfHeader {
        &self.header
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Page numbers (1-indexed) in ascending order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    /// Object id of a page.
    pub fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }

    /// Page number for a page object, if it belongs to this document.
    pub fn page_number_of(&self, id: ObjectId) -> Option<u32> {
        self.pages
            .iter()
            .find_map(|(num, page_id)| (*page_id == id).then_some(*num))
    }

    /// `/Title` from the document information dictionary, trimmed.
    pub fn metadata_title(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let info = self.resolve(info).as_dict().ok()?;
        let title = get_string_from_dict(info, b"Title")?;
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    }

    /// Plain text of one page.
    pub fn page_text(&self, page: u32) -> Result<String> {
        if !self.pages.contains_key(&page) {
            return Err(Error::PageOutOfRange(page, self.page_count()));
        }
        self.doc
            .extract_text(&[page])
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page, e)))
    }

    /// Decoded content stream operations of a page.
    pub fn page_operations(&self, page_id: ObjectId) -> Result<Vec<Operation>> {
        let data = self.page_content(page_id)?;
        let content = Content::decode(&data)?;
        Ok(content.operations)
    }

    /// Raw (decompressed) content stream bytes of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = page_dict.get(b"Contents")?;

        match self.resolve(contents) {
            Object::Stream(s) => stream_bytes(s),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    match self.resolve(obj) {
                        Object::Stream(s) => {
                            content.extend_from_slice(&stream_bytes(s)?);
                            content.push(b' ');
                        }
                        other => log::debug!("Ignoring non-stream content part: {:?}", other),
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Embedded bookmarks in document order.
    ///
    /// Returns an empty list when the document has no `/Outlines`.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        let Some(first) = self
            .doc
            .catalog()
            .ok()
            .and_then(|catalog| catalog.get(b"Outlines").ok())
            .and_then(|outlines| self.resolve(outlines).as_dict().ok())
            .and_then(|outlines| outlines.get(b"First").ok())
            .and_then(|first| first.as_reference().ok())
        else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        self.read_bookmark_siblings(first, 0, &mut visited)
    }

    fn read_bookmark_siblings(
        &self,
        first: ObjectId,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<Bookmark> {
        let mut items = Vec::new();
        if depth >= MAX_BOOKMARK_DEPTH {
            log::debug!("Bookmark nesting deeper than {} ignored", MAX_BOOKMARK_DEPTH);
            return items;
        }

        let mut current = Some(first);
        while let Some(id) = current.take() {
            if !visited.insert(id) {
                log::debug!("Bookmark cycle at object {:?}", id);
                break;
            }
            let Ok(item) = self.doc.get_dictionary(id) else {
                break;
            };

            let title = get_string_from_dict(item, b"Title").unwrap_or_default();
            let page = self.bookmark_page(item);
            if page.is_none() {
                log::debug!("Unresolved destination for bookmark {:?}", title);
            }

            let mut bookmark = Bookmark::new(title, page);
            if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
                bookmark.children = self.read_bookmark_siblings(child, depth + 1, visited);
            }
            items.push(bookmark);

            current = item.get(b"Next").and_then(Object::as_reference).ok();
        }

        items
    }

    /// Destination page of a bookmark: `/Dest`, else the `/A` action's `/D`.
    fn bookmark_page(&self, item: &Dictionary) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.resolve_destination(dest, 0);
        }

        let action = self.resolve(item.get(b"A").ok()?).as_dict().ok()?;
        self.resolve_destination(action.get(b"D").ok()?, 0)
    }

    /// Resolve an explicit or named destination to a page number.
    fn resolve_destination(&self, dest: &Object, hops: usize) -> Option<u32> {
        if hops > MAX_REFERENCE_HOPS {
            return None;
        }

        match self.resolve(dest) {
            Object::Array(arr) => match arr.first()? {
                Object::Reference(page_ref) => self.page_number_of(*page_ref),
                // Remote-style destinations carry a 0-based page index
                Object::Integer(index) => u32::try_from(*index).ok().map(|i| i + 1),
                _ => None,
            },
            Object::Dictionary(dict) => self.resolve_destination(dict.get(b"D").ok()?, hops + 1),
            Object::Name(name) | Object::String(name, _) => {
                let target = self.named_destination(name)?;
                self.resolve_destination(target, hops + 1)
            }
            _ => None,
        }
    }

    /// Look up a named destination in the catalog `/Dests` dictionary or
    /// the `/Names /Dests` name tree.
    fn named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.doc.catalog().ok()?;

        if let Some(dests) = catalog
            .get(b"Dests")
            .ok()
            .and_then(|d| self.resolve(d).as_dict().ok())
        {
            if let Ok(target) = dests.get(name) {
                return Some(target);
            }
        }

        let tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|n| self.resolve(n).as_dict().ok())?
            .get(b"Dests")
            .ok()?;
        let mut visited = HashSet::new();
        self.search_name_tree(self.resolve(tree).as_dict().ok()?, name, &mut visited)
    }

    fn search_name_tree<'a>(
        &'a self,
        node: &'a Dictionary,
        name: &[u8],
        visited: &mut HashSet<ObjectId>,
    ) -> Option<&'a Object> {
        if let Ok(names) = node.get(b"Names").and_then(Object::as_array) {
            for pair in names.chunks(2) {
                if let [key, value] = pair {
                    if let Object::String(key, _) | Object::Name(key) = self.resolve(key) {
                        if key.as_slice() == name {
                            return Some(value);
                        }
                    }
                }
            }
        }

        let kids = node.get(b"Kids").and_then(Object::as_array).ok()?;
        for kid in kids {
            if let Object::Reference(id) = kid {
                if !visited.insert(*id) {
                    continue;
                }
            }
            if let Ok(kid) = self.resolve(kid).as_dict() {
                if let Some(found) = self.search_name_tree(kid, name, visited) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Follow indirect references until a direct object is reached.
    /// Dangling references resolve to `Null`.
    fn resolve<'a>(&'a self, mut obj: &'a Object) -> &'a Object {
        for _ in 0..MAX_REFERENCE_HOPS {
            match obj {
                Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(target) => obj = target,
                    Err(_) => return &NULL_OBJECT,
                },
                _ => return obj,
            }
        }
        &NULL_OBJECT
    }
}

/// Stream data with its filters applied. Unfiltered streams are stored as-is.
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    Ok(stream.decompressed_content()?)
}

/// Decode a PDF text string: UTF-16BE or UTF-8 with a BOM, then UTF-8,
/// then Latin-1.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}
