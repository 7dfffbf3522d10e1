use std::fmt;

use sqlparser::dialect::{dialect_from_str, Dialect};
use sqlparser::parser::Parser;

use crate::error::StmtfmtError;
use crate::source::Position;

/// A rejection from a SQL formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlError {
    pub message: String,
    /// Where in the SQL text the formatter gave up, when it says.
    pub position: Option<Position>,
}

impl SqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }
}

impl fmt::Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Turns raw SQL text into canonically formatted SQL text.
///
/// Implementations are treated as pure: the same input always yields the
/// same output, and nothing about the call is retried or interpreted.
pub trait SqlFormatter {
    fn format(&self, sql: &str) -> Result<String, SqlError>;
}

impl<F> SqlFormatter for F
where
    F: Fn(&str) -> Result<String, SqlError>,
{
    fn format(&self, sql: &str) -> Result<String, SqlError> {
        self(sql)
    }
}

/// Formats SQL by parsing it with `sqlparser` and pretty-printing the AST.
/// Every statement is terminated with `;`.
pub struct SqlparserFormatter {
    dialect: Box<dyn Dialect>,
}

impl SqlparserFormatter {
    pub fn new(dialect: Box<dyn Dialect>) -> Self {
        Self { dialect }
    }
}

impl SqlFormatter for SqlparserFormatter {
    fn format(&self, sql: &str) -> Result<String, SqlError> {
        let statements = Parser::parse_sql(self.dialect.as_ref(), sql).map_err(|e| {
            let message = e.to_string();
            SqlError {
                position: error_position(&message),
                message,
            }
        })?;
        if statements.is_empty() {
            return Err(SqlError::new("no SQL statement found"));
        }
        Ok(statements
            .iter()
            .map(|statement| format!("{:#};", statement))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Create a formatter for a dialect name such as `generic`, `bigquery` or
/// `postgres`.
pub fn formatter_from_name(name: &str) -> Result<SqlparserFormatter, StmtfmtError> {
    dialect_from_str(name.to_ascii_lowercase())
        .map(SqlparserFormatter::new)
        .ok_or_else(|| StmtfmtError::Config(format!("Unknown dialect: {}", name)))
}

/// Pull `Line: L, Column: C` out of a sqlparser error message.
fn error_position(message: &str) -> Option<Position> {
    let rest = &message[message.rfind("Line: ")? + "Line: ".len()..];
    let (line, rest) = rest.split_once(", Column: ")?;
    let column: String = rest.chars().take_while(char::is_ascii_digit).collect();
    Some(Position {
        line: line.trim().parse().ok()?,
        column: column.parse().ok()?,
    })
}
