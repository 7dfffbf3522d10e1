//! A deterministic stand-in for an external SQL formatter.

use stmtfmt::sql::SqlError;

/// Puts `SELECT`, `FROM` and `WHERE` on their own lines with their bodies
/// indented, starts `ORDER`/`GROUP` clauses on a new line, and collapses all
/// other whitespace. Rejects the identifier `FROM_TABLE`, like a real parser
/// would reject `SELECT * FROM_TABLE`.
pub fn clause_formatter(sql: &str) -> Result<String, SqlError> {
    let words: Vec<&str> = sql.split_whitespace().collect();
    if words.is_empty() {
        return Err(SqlError::new("Syntax error: Unexpected end of statement"));
    }
    if let Some(bad) = words
        .iter()
        .map(|w| w.trim_end_matches(';'))
        .find(|w| *w == "FROM_TABLE")
    {
        return Err(SqlError::new(format!(
            "Syntax error: Expected end of input but got identifier \"{}\"",
            bad
        )));
    }

    let mut out = String::new();
    for word in words {
        match word {
            "SELECT" | "FROM" | "WHERE" => {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(word);
                out.push_str("\n ");
            }
            "ORDER" | "GROUP" => {
                out.push('\n');
                out.push_str(word);
            }
            _ => {
                out.push(' ');
                out.push_str(word);
            }
        }
    }
    Ok(out)
}
