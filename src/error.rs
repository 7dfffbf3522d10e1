use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// User-facing errors. Each one is fatal for the file it concerns, but never
/// for the whole batch.
#[derive(Error, Debug)]
pub enum StmtfmtError {
    #[error("stmtfmt config error: {0}")]
    Config(String),

    #[error("{}:{line}:{column}: failed to parse Go source: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{}: failed to print rewritten source: {message}", path.display())]
    Print { path: PathBuf, message: String },

    #[error("{}: failed to format source: {message}", path.display())]
    Canonical { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A per-literal formatting failure. The literal is left untouched and the
/// rest of the file is still processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    /// The SQL formatter's message, verbatim.
    pub message: String,
}

impl LiteralError {
    /// `<file>:<line>:<col>`
    pub fn position(&self) -> String {
        format!("{}:{}:{}", self.path.display(), self.line, self.column)
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\n{}", self.position(), self.message)
    }
}

pub type Result<T> = std::result::Result<T, StmtfmtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_error_display() {
        let err = LiteralError {
            path: PathBuf::from("invalid_sql.go"),
            line: 9,
            column: 11,
            message: "Syntax error".to_string(),
        };
        assert_eq!(err.to_string(), "invalid_sql.go:9:11:\nSyntax error");
    }

    #[test]
    fn test_parse_error_display() {
        let err = StmtfmtError::Parse {
            path: PathBuf::from("a.go"),
            line: 3,
            column: 1,
            message: "unexpected token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "a.go:3:1: failed to parse Go source: unexpected token"
        );
    }
}
