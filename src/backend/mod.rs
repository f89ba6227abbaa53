//! Extraction backends and the fallback chain.
//!
//! Each backend reads a document through a different library or view and
//! applies the heading rule table suited to what it sees. A
//! [`BackendChain`] tries backends in order and keeps the first success.
//!
//! # Example
//!
//! ```no_run
//! use pdf_outline::backend::BackendChain;
//! use pdf_outline::ExtractOptions;
//! use std::path::Path;
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let options = ExtractOptions::default();
//!     let chain = BackendChain::for_options(&options);
//!     let extraction = chain.extract(Path::new("report.pdf"), &options)?;
//!     println!("{} ({})", extraction.result.title, extraction.source);
//!     Ok(())
//! }
//! ```

mod layout;
mod plain;
mod structure;

pub use layout::LayoutBackend;
pub use plain::PlainTextBackend;
pub use structure::StructureBackend;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::heuristics::title::fallback_title;
use crate::model::ExtractionResult;
use crate::parser::{ErrorMode, ExtractOptions};

/// Identifies an extraction backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Document structure via lopdf: metadata, bookmarks, page text
    Structure,
    /// Plain text via pdf-extract
    PlainText,
    /// Content stream layout analysis with font information
    Layout,
}

impl BackendKind {
    /// Order used when none is configured.
    pub const DEFAULT_ORDER: [BackendKind; 3] = [
        BackendKind::Structure,
        BackendKind::PlainText,
        BackendKind::Layout,
    ];

    /// Configuration name.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Structure => "structure",
            BackendKind::PlainText => "plain-text",
            BackendKind::Layout => "layout",
        }
    }

    /// Create the backend for this kind.
    pub fn backend(self) -> Arc<dyn ExtractionBackend> {
        match self {
            BackendKind::Structure => Arc::new(StructureBackend::new()),
            BackendKind::PlainText => Arc::new(PlainTextBackend::new()),
            BackendKind::Layout => Arc::new(LayoutBackend::new()),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structure" => Ok(BackendKind::Structure),
            "plain-text" | "plaintext" | "text" => Ok(BackendKind::PlainText),
            "layout" => Ok(BackendKind::Layout),
            other => Err(Error::Other(format!(
                "Unknown backend '{}' (expected structure, plain-text or layout)",
                other
            ))),
        }
    }
}

/// Parse a comma-separated backend list such as `"layout,structure"`.
///
/// Blank items are ignored; duplicates are kept in first-seen position only.
pub fn parse_backend_list(list: &str) -> Result<Vec<BackendKind>> {
    let mut kinds = Vec::new();
    for item in list.split(',').filter(|s| !s.trim().is_empty()) {
        let kind = item.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// A document reader paired with a heading rule table.
pub trait ExtractionBackend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Backend name used in logs and reports.
    fn name(&self) -> &str {
        self.kind().name()
    }

    /// Extract a title and outline from the file at `path`.
    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractionResult>;
}

/// Where an extraction result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "backend")]
pub enum ResultSource {
    /// Produced by a backend
    Backend(BackendKind),
    /// Every backend failed; filename-derived result
    Fallback,
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSource::Backend(kind) => write!(f, "{}", kind),
            ResultSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// A backend that failed before the chain found a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    /// Backend that failed
    pub backend: BackendKind,
    /// Error message
    pub error: String,
}

/// An extraction result along with the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Title and outline
    pub result: ExtractionResult,
    /// Producing backend
    pub source: ResultSource,
    /// Backends that failed first, in the order they were tried
    pub failures: Vec<BackendFailure>,
}

impl Extraction {
    /// Whether the result is the filename-derived fallback.
    pub fn is_fallback(&self) -> bool {
        self.source == ResultSource::Fallback
    }

    /// Message of the last backend failure, if any.
    pub fn last_failure(&self) -> Option<&str> {
        self.failures.last().map(|f| f.error.as_str())
    }
}

/// Ordered list of backends tried until one succeeds.
#[derive(Clone)]
pub struct BackendChain {
    backends: Vec<Arc<dyn ExtractionBackend>>,
}

impl BackendChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Create a chain from backend kinds, in order.
    pub fn from_kinds(kinds: &[BackendKind]) -> Self {
        let mut chain = Self::new();
        for kind in kinds {
            chain.register(kind.backend());
        }
        chain
    }

    /// Create the chain configured by `options`.
    pub fn for_options(options: &ExtractOptions) -> Self {
        Self::from_kinds(&options.backends)
    }

    /// Append a backend.
    pub fn register(&mut self, backend: Arc<dyn ExtractionBackend>) {
        self.backends.push(backend);
    }

    /// Names of the registered backends, in order.
    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backend is registered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Try each backend in order and return the first success.
    ///
    /// Backend errors and panics are logged and the next backend is tried.
    /// When all of them fail, lenient mode yields the fallback result and
    /// strict mode returns the last error.
    pub fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<Extraction> {
        let mut last_error = None;
        let mut failures = Vec::new();

        for backend in &self.backends {
            match run_backend(backend.as_ref(), path, options) {
                Ok(result) => {
                    log::debug!(
                        "{}: {} produced {} outline entries",
                        path.display(),
                        backend.name(),
                        result.len()
                    );
                    return Ok(Extraction {
                        result,
                        source: ResultSource::Backend(backend.kind()),
                        failures,
                    });
                }
                Err(e) => {
                    log::warn!("{}: {} backend failed: {}", path.display(), backend.name(), e);
                    failures.push(BackendFailure {
                        backend: backend.kind(),
                        error: e.to_string(),
                    });
                    last_error = Some(e);
                }
            }
        }

        match options.error_mode {
            ErrorMode::Strict => Err(last_error.unwrap_or(Error::NoBackend)),
            ErrorMode::Lenient => {
                log::warn!("{}: using filename fallback", path.display());
                Ok(Extraction {
                    result: ExtractionResult::new(fallback_title(path)),
                    source: ResultSource::Fallback,
                    failures,
                })
            }
        }
    }
}

impl Default for BackendChain {
    fn default() -> Self {
        Self::from_kinds(&BackendKind::DEFAULT_ORDER)
    }
}

impl fmt::Debug for BackendChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendChain")
            .field("backends", &self.names())
            .finish()
    }
}

/// Run one backend, turning a panic into [`Error::Panicked`].
fn run_backend(
    backend: &dyn ExtractionBackend,
    path: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    panic::catch_unwind(AssertUnwindSafe(|| backend.extract(path, options)))
        .unwrap_or_else(|_| Err(Error::Panicked(backend.name().to_string())))
}
