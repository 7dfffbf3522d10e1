mod common;

use std::path::Path;

use pretty_assertions::assert_eq;
use stmtfmt::error::StmtfmtError;
use stmtfmt::formatter::FileFormatResult;
use stmtfmt::printer::{SourceFormatter, Verbatim};
use stmtfmt::quote::decode;
use stmtfmt::sql::{SqlError, SqlFormatter};
use stmtfmt::{format_source_with, Mode};

use common::clause_formatter;

fn default_mode() -> Mode {
    Mode {
        gofmt: false,
        ..Mode::default()
    }
}

fn format_with(source: &str, mode: &Mode, sql: &dyn SqlFormatter) -> FileFormatResult {
    format_source_with(Path::new("query.go"), source, mode, sql, &Verbatim).unwrap()
}

fn format(source: &str) -> FileFormatResult {
    format_with(source, &default_mode(), &clause_formatter)
}

/// A Go file holding one `spanner.Statement` per query, each on its own line.
fn statements(queries: &[&str]) -> String {
    let mut source = String::from(
        "package store\n\nimport (\n\t\"fmt\"\n\n\t\"cloud.google.com/go/spanner\"\n)\n\nvar _ = fmt.Sprintf\n\nvar statements = []*spanner.Statement{\n",
    );
    for query in queries {
        source.push_str(&format!("\t&spanner.Statement{{SQL: {}}},\n", query));
    }
    source.push_str("}\n");
    source
}

fn one_line(sql: &str) -> Result<String, SqlError> {
    Ok(sql.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// The single-line query literals of a file built by [`statements`].
fn query_literals(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("&spanner.Statement{SQL: "))
        .map(|rest| rest.strip_suffix("},").unwrap_or(rest))
        .collect()
}

#[test]
fn test_single_literal_reformats_to_multi_line() {
    let result = format(&statements(&["\"SELECT * FROM TABLE;\""]));
    assert!(result.changed);
    assert!(result.errors.is_empty());
    assert!(result
        .output
        .unwrap()
        .contains("&spanner.Statement{SQL: `\nSELECT\n  *\nFROM\n  TABLE;\n`},"));
}

#[test]
fn test_invalid_sql_reports_literal_position() {
    let result = format(&statements(&["\"SELECT * FROM_TABLE;\""]));
    assert!(!result.changed);
    assert!(result.output.is_none());
    assert_eq!(result.errors.len(), 1);
    // Line 12, after a tab and `&spanner.Statement{SQL: `.
    assert_eq!((result.errors[0].line, result.errors[0].column), (12, 26));
    assert!(result.errors[0].message.contains("FROM_TABLE"));
}

#[test]
fn test_templated_literal_keeps_verbs_and_arguments() {
    let source = statements(&["fmt.Sprintf(\"SELECT * FROM TABLE ORDER BY %s;\", \"X\")"]);
    let output = format(&source).output.unwrap();
    assert!(output.contains("fmt.Sprintf(`\nSELECT\n  *\nFROM\n  TABLE\nORDER BY %s;\n`, \"X\")"));
}

#[test]
fn test_all_verbs_survive_formatting() {
    let source = statements(&[
        "fmt.Sprintf(\"SELECT %v FROM t WHERE a = %d AND b = %s;\", x, 1, y)",
    ]);
    let output = format(&source).output.unwrap();
    assert!(output.contains("SELECT\n  %v\nFROM\n  t\nWHERE\n  a = %d AND b = %s;"));
    assert!(output.contains("`, x, 1, y)"));
}

#[test]
fn test_mixed_outcomes_update_only_successful_literals() {
    let invalid = "\"SELECT * FROM_TABLE;\"";
    let source = statements(&["\"SELECT a FROM t;\"", invalid, "\"SELECT b FROM u;\""]);
    let result = format(&source);

    assert!(result.changed);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 13);

    let output = result.output.unwrap();
    assert!(output.contains(&format!("&spanner.Statement{{SQL: {}}},", invalid)));
    assert!(output.contains("`\nSELECT\n  a\nFROM\n  t;\n`"));
    assert!(output.contains("`\nSELECT\n  b\nFROM\n  u;\n`"));
    assert!(!output.contains("\"SELECT a FROM t;\""));
}

#[test]
fn test_all_failures_leave_file_unchanged() {
    let source = statements(&["\"SELECT * FROM_TABLE;\"", "\"SELECT a FROM_TABLE;\""]);
    let result = format(&source);
    assert!(!result.changed);
    assert!(result.output.is_none());
    let lines: Vec<usize> = result.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![12, 13]);
}

#[test]
fn test_zero_candidates() {
    let result = format("package store\n\nfunc main() {}\n");
    assert!(!result.changed);
    assert!(result.output.is_none());
    assert!(result.errors.is_empty());
}

#[test]
fn test_second_pass_is_a_no_op() {
    let source = statements(&[
        "\"SELECT a FROM t WHERE b = 1;\"",
        "fmt.Sprintf(`SELECT * FROM t ORDER BY %s;`, o)",
    ]);
    let first = format(&source);
    assert!(first.changed);

    let second = format(&first.output.unwrap());
    assert!(!second.changed);
    assert!(second.output.is_none());
    assert!(second.errors.is_empty());
}

#[test]
fn test_no_trailing_semicolon_option() {
    let mode = Mode {
        no_trailing_semicolon: true,
        ..default_mode()
    };
    let result = format_with(&statements(&["\"SELECT * FROM t;\""]), &mode, &clause_formatter);
    assert!(result
        .output
        .unwrap()
        .contains("`\nSELECT\n  *\nFROM\n  t\n`"));
}

#[test]
fn test_backtick_in_formatted_sql_stays_interpreted() {
    let result = format(&statements(&["\"SELECT `a` FROM t;\""]));
    // Flattening the formatted text gives back the original literal.
    assert!(!result.changed);
    assert!(result.errors.is_empty());
}

#[test]
fn test_quotes_in_sql_are_escaped() {
    let result = format_with(
        &statements(&["`SELECT \"a\"   FROM t;`"]),
        &default_mode(),
        &one_line,
    );
    assert!(result
        .output
        .unwrap()
        .contains(r#"&spanner.Statement{SQL: "SELECT \"a\" FROM t;"},"#));
}

#[test]
fn test_canonical_formatter_failure_is_fatal() {
    struct Broken;
    impl SourceFormatter for Broken {
        fn format_source(&self, _: &str) -> Result<String, String> {
            Err("expected declaration".to_string())
        }
    }

    let source = statements(&["\"SELECT * FROM t;\""]);
    let err = format_source_with(
        Path::new("query.go"),
        &source,
        &default_mode(),
        &clause_formatter,
        &Broken,
    )
    .unwrap_err();
    assert!(matches!(err, StmtfmtError::Canonical { .. }));
}

#[test]
fn test_unparsable_go_is_rejected() {
    let err = format_source_with(
        Path::new("broken.go"),
        "package store\n\nvar x = spanner.Statement{SQL: \"SELECT 1\"\n",
        &default_mode(),
        &clause_formatter,
        &Verbatim,
    )
    .unwrap_err();
    assert!(matches!(err, StmtfmtError::Parse { .. }));
}

#[test]
fn test_custom_target_names() {
    let source = "package db\n\nimport \"example.com/sql/builder\"\n\nvar q = builder.Query{Text: builder.Format(\"SELECT %d FROM t;\", 1)}\n";
    let mode = Mode {
        target_type: "example.com/sql/builder.Query".to_string(),
        query_field: "Text".to_string(),
        template_function: "example.com/sql/builder.Format".to_string(),
        ..default_mode()
    };
    let result = format_with(source, &mode, &clause_formatter);
    assert!(result
        .output
        .unwrap()
        .contains("builder.Format(`\nSELECT\n  %d\nFROM\n  t;\n`, 1)"));
}

#[test]
fn test_escaped_literals_denote_formatted_text() {
    let inputs = [
        r#""SELECT  '\x01',  '\a' FROM t;""#,
        r#""SELECT  '\u00e9\"',   x FROM t;""#,
        r#""SELECT  `a`,  '\x1b' FROM t;""#,
    ];
    let result = format_with(&statements(&inputs), &default_mode(), &one_line);
    assert!(result.changed);
    assert!(result.errors.is_empty());

    let output = result.output.unwrap();
    let literals = query_literals(&output);
    assert_eq!(literals.len(), inputs.len());
    for (input, literal) in inputs.iter().zip(literals) {
        let expected = one_line(&decode(input).unwrap()).unwrap();
        assert_eq!(decode(literal).unwrap(), expected);
    }
}

#[test]
fn test_non_utf8_escape_is_reported_not_rewritten() {
    let bad = r#""SELECT  '\xff';""#;
    let result = format_with(
        &statements(&[bad, "\"SELECT  a FROM t;\""]),
        &default_mode(),
        &one_line,
    );
    assert!(result.changed);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 12);
    assert!(result.errors[0].message.contains("UTF-8"));

    let output = result.output.unwrap();
    assert_eq!(query_literals(&output), vec![bad, "\"SELECT a FROM t;\""]);
}

#[test]
fn test_nul_escape_survives_rewrite() {
    let result = format_with(
        &statements(&[r#""SELECT  '\x00';""#, "\"SELECT  a FROM t;\""]),
        &default_mode(),
        &one_line,
    );
    assert!(result.errors.is_empty());
    let output = result.output.unwrap();
    assert_eq!(
        query_literals(&output),
        vec![r#""SELECT '\x00';""#, "\"SELECT a FROM t;\""]
    );
}

#[test]
fn test_direct_literal_keeps_sentinel_lookalike() {
    let result = format_with(
        &statements(&["\"SELECT  a FROM t WHERE x = -999;\""]),
        &default_mode(),
        &one_line,
    );
    let output = result.output.unwrap();
    assert_eq!(
        query_literals(&output),
        vec!["\"SELECT a FROM t WHERE x = -999;\""]
    );
}
