//! PDF header sniffing.
//!
//! Used to reject non-PDF inputs before they reach lopdf, so that a stray
//! `.pdf`-named text file degrades to a fallback record with a clear reason.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Readers tolerate junk before the header as long as it starts within
/// the first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// Header information found at the start of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Byte offset of the `%PDF-` marker
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Sniff the header of a file on disk.
///
/// Files shorter than a header are reported as [`Error::UnknownFormat`],
/// not as an I/O error.
pub fn sniff_file<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let file = File::open(path)?;
    let limit = HEADER_WINDOW + PDF_MAGIC.len() + VERSION_LEN;
    let mut head = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut head)?;
    sniff_bytes(&head)
}

/// Sniff the header from the leading bytes of a document.
///
/// A garbled version gives [`Error::UnknownFormat`]. A well-formed one that
/// is not 1.x or 2.0 gives [`Error::UnsupportedVersion`].
pub fn sniff_bytes(data: &[u8]) -> Result<PdfHeader> {
    // The marker may start at any offset below HEADER_WINDOW.
    let window = &data[..data.len().min(HEADER_WINDOW + PDF_MAGIC.len() - 1)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let well_formed = matches!(
        version_bytes,
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit()
    );
    if !well_formed {
        return Err(Error::UnknownFormat);
    }
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_supported_version(version_bytes) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version, offset })
}

/// 1.x or 2.0.
fn is_supported_version(version: &[u8]) -> bool {
    matches!(version, [b'1', b'.', _] | [b'2', b'.', b'0'])
}

/// Check if bytes start like a PDF document.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_valid_pdf() {
        let header = sniff_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(header.version, "1.7");
        assert_eq!(header.offset, 0);
        assert_eq!(header.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_sniff_pdf_2_0() {
        let header = sniff_bytes(b"%PDF-2.0\n").unwrap();
        assert_eq!(header.version, "2.0");
    }

    #[test]
    fn test_sniff_leading_junk() {
        let mut data = vec![b' '; 100];
        data.extend_from_slice(b"%PDF-1.4\n");
        let header = sniff_bytes(&data).unwrap();
        assert_eq!(header.offset, 100);
        assert_eq!(header.version, "1.4");
    }

    #[test]
    fn test_sniff_header_at_window_edge() {
        let mut data = vec![b' '; HEADER_WINDOW - 1];
        data.extend_from_slice(b"%PDF-1.4\n");
        assert_eq!(sniff_bytes(&data).unwrap().offset, HEADER_WINDOW - 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("padded.pdf");
        std::fs::write(&path, &data).unwrap();
        let header = sniff_file(&path).unwrap();
        assert_eq!(header.version, "1.4");
        assert_eq!(header.offset, HEADER_WINDOW - 1);
    }

    #[test]
    fn test_sniff_header_beyond_window() {
        let mut data = vec![b' '; HEADER_WINDOW];
        data.extend_from_slice(b"%PDF-1.4\n");
        assert!(matches!(sniff_bytes(&data), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_not_pdf() {
        assert!(matches!(
            sniff_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(sniff_bytes(b""), Err(Error::UnknownFormat)));
        assert!(matches!(sniff_bytes(b"%PDF-1"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_garbled_version() {
        assert!(matches!(sniff_bytes(b"%PDF-x.y\n"), Err(Error::UnknownFormat)));
        assert!(matches!(sniff_bytes(b"%PDF-1-4\n"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_unsupported_version() {
        assert!(matches!(
            sniff_bytes(b"%PDF-2.5\n"),
            Err(Error::UnsupportedVersion(v)) if v == "2.5"
        ));
        assert!(matches!(
            sniff_bytes(b"%PDF-3.0\n"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_sniff_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.pdf");
        std::fs::write(&path, b"%P").unwrap();
        assert!(matches!(sniff_file(&path), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\n"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }
}
