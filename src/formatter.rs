use std::path::PathBuf;

use log::{debug, info};

use crate::error::{LiteralError, Result};
use crate::locator::CandidateLiteral;
use crate::printer::{self, SourceFormatter};
use crate::quote;
use crate::source::SourceFile;
use crate::sql::{SqlError, SqlFormatter};
use crate::verbs;

/// What happened to one candidate literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The literal's new source text, delimiters included.
    Formatted(String),
    Failed(LiteralError),
}

/// The result of formatting every SQL literal in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFormatResult {
    pub path: PathBuf,
    /// The rewritten source; present only when `changed`.
    pub output: Option<String>,
    /// Per-literal failures in document order.
    pub errors: Vec<LiteralError>,
    pub changed: bool,
}

impl FileFormatResult {
    fn unchanged(path: PathBuf, errors: Vec<LiteralError>) -> Self {
        Self {
            path,
            output: None,
            errors,
            changed: false,
        }
    }
}

/// LiteralFormatter runs the per-literal pipeline:
///   1. Decode the Go literal
///   2. Mask printf verbs
///   3. Format the SQL
///   4. Unmask verbs (and optionally drop the trailing `;`)
///   5. Re-encode as a Go literal
pub struct LiteralFormatter<'a> {
    sql: &'a dyn SqlFormatter,
    no_trailing_semicolon: bool,
}

impl<'a> LiteralFormatter<'a> {
    pub fn new(sql: &'a dyn SqlFormatter, no_trailing_semicolon: bool) -> Self {
        Self {
            sql,
            no_trailing_semicolon,
        }
    }

    /// Format the SQL held by one literal, returning the literal's new
    /// source text.
    ///
    /// A literal whose escapes do not denote UTF-8 text is rejected rather
    /// than re-encoded, as is a template that already holds the sentinel of
    /// a verb it uses, since that verb could not be restored unambiguously.
    pub fn format_literal(&self, raw: &str) -> std::result::Result<String, SqlError> {
        let text = quote::decode(raw).ok_or_else(|| {
            SqlError::new("string literal contains escapes that do not denote UTF-8 text")
        })?;
        let (masked, used) = verbs::mask_verbs(&text);
        if let Some(verb) = used.iter().find(|verb| text.contains(verb.sentinel())) {
            return Err(SqlError::new(format!(
                "query contains {} and the {} verb it stands in for",
                verb.sentinel(),
                verb.placeholder()
            )));
        }
        let formatted = verbs::unmask_verbs(&self.sql.format(&masked)?, &used);
        let formatted = if self.no_trailing_semicolon {
            strip_terminator(&formatted)
        } else {
            &formatted
        };
        Ok(quote::encode(formatted))
    }

    pub fn format_candidate(&self, file: &SourceFile, candidate: &CandidateLiteral) -> FormatOutcome {
        match self.format_literal(&candidate.raw) {
            Ok(text) => FormatOutcome::Formatted(text),
            Err(e) => FormatOutcome::Failed(LiteralError {
                path: file.path().to_path_buf(),
                line: candidate.position.line,
                column: candidate.position.column,
                message: e.message,
            }),
        }
    }

    /// Format every candidate of a file and print the result.
    ///
    /// A failing literal is recorded and left untouched; the others are
    /// still rewritten. The file is reported as changed only if some
    /// literal's text actually changed, so a file whose every candidate
    /// failed is never printed.
    pub fn run(
        &self,
        mut file: SourceFile,
        candidates: &[CandidateLiteral],
        source_formatter: &dyn SourceFormatter,
    ) -> Result<FileFormatResult> {
        let path = file.path().to_path_buf();
        if candidates.is_empty() {
            return Ok(FileFormatResult::unchanged(path, Vec::new()));
        }

        let mut errors = Vec::new();
        for candidate in candidates {
            match self.format_candidate(&file, candidate) {
                FormatOutcome::Formatted(text) if text == candidate.raw => {
                    debug!("{}:{}: already formatted", path.display(), candidate.position);
                }
                FormatOutcome::Formatted(text) => {
                    debug!("{}:{}: reformatted", path.display(), candidate.position);
                    file.replace(candidate.range.clone(), text);
                }
                FormatOutcome::Failed(err) => {
                    debug!("{}: SQL formatter rejected literal", err.position());
                    errors.push(err);
                }
            }
        }

        if file.replacements().is_empty() {
            return Ok(FileFormatResult::unchanged(path, errors));
        }

        let original = file.source().to_string();
        let output = printer::print(file, source_formatter)?;
        if output == original {
            return Ok(FileFormatResult::unchanged(path, errors));
        }

        info!(
            "{}: reformatted SQL ({} failure(s))",
            path.display(),
            errors.len()
        );
        Ok(FileFormatResult {
            path,
            output: Some(output),
            errors,
            changed: true,
        })
    }
}

/// Drop one trailing statement terminator.
fn strip_terminator(sql: &str) -> &str {
    let trimmed = sql.trim_end();
    trimmed.strip_suffix(';').unwrap_or(trimmed)
}
