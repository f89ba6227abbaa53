//! Config file loading and option resolution.
//!
//! Values are layered: built-in defaults, then the config file, then
//! environment variables and command-line flags (clap merges those two).

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use pdf_outline::parser::{DEFAULT_MAX_HEADINGS, DEFAULT_TITLE_MAX_CHARS};
use pdf_outline::{BackendKind, BatchOptions, ExtractOptions, JsonFormat};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "pdf-outline.toml";

/// Container mount point searched for `input/` and `output/`.
pub const APP_ROOT: &str = "/app";

/// Contents of a `pdf-outline.toml` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backends: Option<Vec<BackendKind>>,

    /// 0 = unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_headings: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_max_chars: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact: Option<bool>,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("reading config {}: {}", path.display(), e))?;
        let config = toml::from_str(&text)
            .map_err(|e| format!("parsing config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String, Box<dyn Error>> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Config files tried when none is given explicitly, in order.
pub fn discovered_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pdf-outline").join("config.toml"));
    }
    paths
}

/// Load the config file.
///
/// An explicit path must exist and parse. Discovered files that fail to
/// parse are skipped with a warning.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, Box<dyn Error>> {
    match explicit {
        Some(path) => FileConfig::read(path),
        None => Ok(load_first(&discovered_paths())),
    }
}

fn load_first(paths: &[PathBuf]) -> FileConfig {
    for path in paths.iter().filter(|p| p.is_file()) {
        match FileConfig::read(path) {
            Ok(config) => {
                log::debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => log::warn!("Ignoring {}", e),
        }
    }
    FileConfig::default()
}

/// Values taken from flags and environment variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub backends: Option<Vec<BackendKind>>,
    pub max_headings: Option<usize>,
    pub strict: bool,
    pub parallel: bool,
    pub compact: bool,
}

/// Effective settings after merging every layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub backends: Vec<BackendKind>,
    pub max_headings: Option<usize>,
    pub title_max_chars: usize,
    pub strict: bool,
    pub parallel: bool,
    pub compact: bool,
}

impl Settings {
    /// Merge a config file with overrides, using the container defaults.
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Self {
        Self::resolve_with_defaults(file, overrides, default_dirs(Path::new(APP_ROOT)))
    }

    /// Merge a config file with overrides over the given default
    /// input and output directories.
    pub fn resolve_with_defaults(
        file: FileConfig,
        overrides: Overrides,
        (default_input, default_output): (PathBuf, PathBuf),
    ) -> Self {
        let max_headings = match overrides.max_headings.or(file.max_headings) {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_MAX_HEADINGS),
        };

        Self {
            input: overrides.input.or(file.input).unwrap_or(default_input),
            output: overrides.output.or(file.output).unwrap_or(default_output),
            backends: overrides
                .backends
                .or(file.backends)
                .unwrap_or_else(|| BackendKind::DEFAULT_ORDER.to_vec()),
            max_headings,
            title_max_chars: file.title_max_chars.unwrap_or(DEFAULT_TITLE_MAX_CHARS),
            strict: overrides.strict || file.strict.unwrap_or(false),
            parallel: overrides.parallel || file.parallel.unwrap_or(false),
            compact: overrides.compact || file.compact.unwrap_or(false),
        }
    }

    /// Per-document extraction options.
    pub fn extract_options(&self) -> ExtractOptions {
        let options = ExtractOptions::new()
            .with_backends(self.backends.iter().copied())
            .with_max_headings(self.max_headings)
            .with_title_max_chars(self.title_max_chars);
        if self.strict {
            options.strict()
        } else {
            options.lenient()
        }
    }

    /// Output JSON format.
    pub fn json_format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }

    /// Options for a directory run.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::new()
            .with_extract_options(self.extract_options())
            .with_json_format(self.json_format())
            .with_parallel(self.parallel)
    }

    /// The settings as a fully populated config file.
    pub fn to_file_config(&self) -> FileConfig {
        FileConfig {
            input: Some(self.input.clone()),
            output: Some(self.output.clone()),
            backends: Some(self.backends.clone()),
            max_headings: Some(self.max_headings.unwrap_or(0)),
            title_max_chars: Some(self.title_max_chars),
            strict: Some(self.strict),
            parallel: Some(self.parallel),
            compact: Some(self.compact),
        }
    }
}

/// `<root>/input` and `<root>/output` when `<root>/input` exists, otherwise
/// the sample dataset directories relative to the working directory.
pub fn default_dirs(root: &Path) -> (PathBuf, PathBuf) {
    let input = root.join("input");
    if input.is_dir() {
        (input, root.join("output"))
    } else {
        (
            PathBuf::from("sample_dataset/pdfs"),
            PathBuf::from("sample_dataset/outputs_generated"),
        )
    }
}
