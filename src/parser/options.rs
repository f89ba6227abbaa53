//! Extraction options and configuration.

use crate::backend::BackendKind;

/// Headings collected by the heuristic rule tables before they stop.
pub const DEFAULT_MAX_HEADINGS: usize = 50;

/// Longest title taken from metadata or page text, in characters.
pub const DEFAULT_TITLE_MAX_CHARS: usize = 100;

/// Options for extracting a title and outline from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Backends to try, in order
    pub backends: Vec<BackendKind>,

    /// Cap on heuristic headings (None = unlimited)
    pub max_headings: Option<usize>,

    /// Maximum title length in characters
    pub title_max_chars: usize,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (fall back to a filename title when every backend fails).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable strict mode (report the last backend error).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set the backend order.
    pub fn with_backends(mut self, backends: impl IntoIterator<Item = BackendKind>) -> Self {
        self.backends = backends.into_iter().collect();
        self
    }

    /// Set the heuristic heading cap.
    pub fn with_max_headings(mut self, max: Option<usize>) -> Self {
        self.max_headings = max;
        self
    }

    /// Set the maximum title length.
    pub fn with_title_max_chars(mut self, max: usize) -> Self {
        self.title_max_chars = max;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            backends: BackendKind::DEFAULT_ORDER.to_vec(),
            max_headings: Some(DEFAULT_MAX_HEADINGS),
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail with the last backend error
    Strict,
    /// Degrade to a fallback result and continue
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .strict()
            .with_backends([BackendKind::Layout])
            .with_max_headings(None)
            .with_title_max_chars(20);

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.backends, vec![BackendKind::Layout]);
        assert_eq!(options.max_headings, None);
        assert_eq!(options.title_max_chars, 20);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(
            options.backends,
            vec![
                BackendKind::Structure,
                BackendKind::PlainText,
                BackendKind::Layout
            ]
        );
        assert_eq!(options.max_headings, Some(50));
        assert_eq!(options.title_max_chars, 100);
    }
}
