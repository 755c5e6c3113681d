//! Analysis options and configuration.

use std::path::PathBuf;

use crate::report::JsonFormat;

/// Options for an analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Directory the request's filenames are resolved against
    pub document_dir: PathBuf,

    /// Error handling mode for page-level extraction failures
    pub error_mode: ErrorMode,

    /// Whether to dispatch embedding calls in parallel
    pub parallel: bool,

    /// JSON layout of the written report
    pub json_format: JsonFormat,
}

impl AnalyzeOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document directory.
    pub fn with_document_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.document_dir = dir.into();
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages whose content cannot be decoded).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel embedding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Embed one text at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            document_dir: PathBuf::from("."),
            error_mode: ErrorMode::Strict,
            parallel: true,
            json_format: JsonFormat::Pretty,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    #[default]
    Strict,
    /// Skip pages that cannot be decoded and continue
    Lenient,
}
