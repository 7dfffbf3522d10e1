use std::path::PathBuf;

use crate::error::LiteralError;

/// Status of formatting a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Nothing to rewrite, or every SQL literal was already formatted.
    Unchanged,
    /// File was rewritten (or would be, in check mode).
    Changed,
    /// At least one SQL literal was rejected by the SQL formatter. Other
    /// literals may still have been rewritten.
    Failed,
    /// The file could not be read, parsed, printed or written.
    Error,
}

/// Result of formatting a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Whether the file was (or would be) rewritten. A `Failed` file can
    /// still be changed when some of its literals succeeded.
    pub changed: bool,
    pub literal_errors: Vec<LiteralError>,
    pub error: Option<String>,
}

impl FileResult {
    pub fn error(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            status: FileStatus::Error,
            changed: false,
            literal_errors: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Aggregated report of formatting results.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<FileResult>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn unchanged(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == FileStatus::Unchanged)
            .count()
    }

    pub fn changed(&self) -> usize {
        self.results.iter().filter(|r| r.changed).count()
    }

    /// Files with at least one unrecoverable condition.
    pub fn errors(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, FileStatus::Failed | FileStatus::Error))
            .count()
    }

    pub fn literal_errors(&self) -> usize {
        self.results.iter().map(|r| r.literal_errors.len()).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn has_changes(&self) -> bool {
        self.changed() > 0
    }

    /// Generate a summary string.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("{} file(s) processed", self.total()));
        if self.changed() > 0 {
            parts.push(format!("{} reformatted", self.changed()));
        }
        if self.unchanged() > 0 {
            parts.push(format!("{} unchanged", self.unchanged()));
        }
        if self.errors() > 0 {
            parts.push(format!("failed to format {} file(s)", self.errors()));
        }
        parts.join(", ")
    }

    /// Print error details: every rejected literal as
    /// `<file>:<line>:<col>:` followed by the SQL formatter's message, then
    /// every file-level error.
    pub fn print_errors(&self) {
        for result in &self.results {
            for literal_error in &result.literal_errors {
                eprintln!("{}", literal_error);
            }
            if let Some(ref error) = result.error {
                eprintln!("error: {}: {}", result.path.display(), error);
            }
        }
    }
}
