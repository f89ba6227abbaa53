//! Directory batch processing: one JSON file per input PDF.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::backend::{BackendChain, BackendKind, ResultSource};
use crate::error::{Error, Result};
use crate::heuristics::title::raw_stem;
use crate::model::ExtractionResult;
use crate::parser::ExtractOptions;
use crate::render::{write_json, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Per-document extraction options
    pub extract: ExtractOptions,

    /// Output JSON format
    pub json_format: JsonFormat,

    /// Process files on the rayon thread pool
    pub parallel: bool,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// Set output JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// How one input file was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// A backend produced the result
    Extracted {
        backend: BackendKind,
        entries: usize,
    },
    /// Every backend failed; a filename-derived result was written
    Fallback { reason: String },
    /// Extraction or writing failed
    Failed { error: String },
}

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Input PDF path
    pub input: PathBuf,
    /// Output JSON path
    pub output: PathBuf,
    /// Title written to the output
    pub title: String,
    /// What happened
    pub status: FileStatus,
}

impl FileOutcome {
    /// Number of outline entries written.
    pub fn entries(&self) -> usize {
        match self.status {
            FileStatus::Extracted { entries, .. } => entries,
            _ => 0,
        }
    }
}

/// Outcomes of a batch run, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per-file outcomes
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    /// Number of files processed.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files were found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files a backend extracted.
    pub fn extracted(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Extracted { .. }))
    }

    /// Files that got the filename fallback.
    pub fn fallbacks(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Fallback { .. }))
    }

    /// Files that failed.
    pub fn failures(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.status)).count()
    }
}

/// PDF files directly inside `dir`, sorted by file name.
///
/// The extension match is ASCII case-insensitive and subdirectories are
/// not searched.
pub fn list_pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Error::InvalidInput {
            path: dir.to_path_buf(),
            reason: "does not exist".to_string(),
        });
    }
    if !dir.is_dir() {
        return Err(Error::InvalidInput {
            path: dir.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Output path for an input: `<stem>.json` in `output_dir`.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.json", raw_stem(input)))
}

/// Process every PDF in `input_dir`, writing results into `output_dir`.
pub fn process_directory(
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchReport> {
    process_directory_with(input_dir, output_dir, options, |_| {})
}

/// Like [`process_directory`], calling `on_file` as each file finishes.
///
/// In parallel mode `on_file` is called from worker threads in completion
/// order; the returned report is always in input order.
pub fn process_directory_with<F>(
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
    on_file: F,
) -> Result<BatchReport>
where
    F: Fn(&FileOutcome) + Sync,
{
    let files = list_pdf_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    if files.is_empty() {
        log::info!("No PDF files found in {}", input_dir.display());
        return Ok(BatchReport::default());
    }
    log::info!(
        "Found {} PDF files to process in {}",
        files.len(),
        input_dir.display()
    );

    let chain = BackendChain::for_options(&options.extract);
    let run = |input: &PathBuf| {
        let outcome = process_file(&chain, input, output_dir, options);
        on_file(&outcome);
        outcome
    };

    let outcomes: Vec<FileOutcome> = if options.parallel {
        files.par_iter().map(run).collect()
    } else {
        files.iter().map(run).collect()
    };

    Ok(BatchReport { files: outcomes })
}

/// Extract one file and write its JSON. Never fails: every problem is
/// recorded in the returned outcome.
pub fn process_file(
    chain: &BackendChain,
    input: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> FileOutcome {
    log::info!("Processing {}", input.display());
    let output = output_path(input, output_dir);

    let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
        chain.extract(input, &options.extract)
    }))
    .unwrap_or_else(|_| Err(Error::Panicked("extraction".to_string())));

    let (result, status) = match extracted {
        Ok(extraction) => {
            let status = match extraction.source {
                ResultSource::Backend(backend) => FileStatus::Extracted {
                    backend,
                    entries: extraction.result.len(),
                },
                ResultSource::Fallback => FileStatus::Fallback {
                    reason: extraction
                        .last_failure()
                        .unwrap_or("no backend configured")
                        .to_string(),
                },
            };
            (extraction.result, status)
        }
        Err(e) => {
            log::warn!("Error processing {}: {}", input.display(), e);
            (
                ExtractionResult::new(raw_stem(input)),
                FileStatus::Failed {
                    error: e.to_string(),
                },
            )
        }
    };

    let status = match write_json(&output, &result, options.json_format) {
        Ok(()) => status,
        Err(e) => {
            log::warn!("Failed to write {}: {}", output.display(), e);
            FileStatus::Failed {
                error: format!("writing {}: {}", output.display(), e),
            }
        }
    };

    FileOutcome {
        input: input.to_path_buf(),
        output,
        title: result.title,
        status,
    }
}
