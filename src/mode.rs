use std::path::PathBuf;

use serde::Deserialize;

use crate::error::StmtfmtError;
use crate::locator::Targets;
use crate::printer::{Gofmt, SourceFormatter, Verbatim};
use crate::sql::{self, SqlparserFormatter};

/// Mode holds all configuration for stmtfmt.
#[derive(Debug, Clone, Deserialize)]
pub struct Mode {
    /// Fully-qualified type of the statement constructor.
    #[serde(default = "default_target_type")]
    pub target_type: String,

    /// Field of the constructor holding the query text.
    #[serde(default = "default_query_field")]
    pub query_field: String,

    /// Fully-qualified printf-style function whose format string is SQL.
    #[serde(default = "default_template_function")]
    pub template_function: String,

    /// Drop the trailing `;` the SQL formatter emits.
    #[serde(default)]
    pub no_trailing_semicolon: bool,

    #[serde(default = "default_dialect", alias = "dialect")]
    pub dialect_name: String,

    /// Run gofmt over every rewritten file.
    #[serde(default = "default_true")]
    pub gofmt: bool,

    #[serde(default = "default_gofmt_path")]
    pub gofmt_path: PathBuf,

    #[serde(default)]
    pub check: bool,

    #[serde(default)]
    pub diff: bool,

    /// Glob patterns for directory and file names to skip.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// File name suffixes of generated code, never rewritten.
    #[serde(default = "default_generated_suffixes")]
    pub generated_suffixes: Vec<String>,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub no_progressbar: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[serde(default)]
    pub threads: usize,

    #[serde(default)]
    pub single_process: bool,
}

fn default_target_type() -> String {
    "cloud.google.com/go/spanner.Statement".to_string()
}
fn default_query_field() -> String {
    "SQL".to_string()
}
fn default_template_function() -> String {
    "fmt.Sprintf".to_string()
}
fn default_dialect() -> String {
    "generic".to_string()
}
fn default_true() -> bool {
    true
}
fn default_gofmt_path() -> PathBuf {
    PathBuf::from("gofmt")
}
fn default_exclude() -> Vec<String> {
    vec!["testdata".to_string(), "vendor".to_string()]
}
fn default_generated_suffixes() -> Vec<String> {
    vec!["_gen.go".to_string()]
}

impl Mode {
    /// Create the SQL formatter for the configured dialect.
    pub fn sql_formatter(&self) -> Result<SqlparserFormatter, StmtfmtError> {
        sql::formatter_from_name(&self.dialect_name)
    }

    /// The canonical Go formatter applied to rewritten files.
    pub fn source_formatter(&self) -> Box<dyn SourceFormatter> {
        if self.gofmt {
            Box::new(Gofmt {
                program: self.gofmt_path.clone(),
            })
        } else {
            Box::new(Verbatim)
        }
    }

    pub fn targets(&self) -> Targets {
        Targets {
            type_name: self.target_type.clone(),
            query_field: self.query_field.clone(),
            template_function: self.template_function.clone(),
        }
    }

    /// Whether rewritten files are written back to disk.
    pub fn should_write(&self) -> bool {
        !self.check && !self.diff
    }

    pub fn show_progress(&self) -> bool {
        !self.no_progressbar && !self.quiet
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            target_type: default_target_type(),
            query_field: default_query_field(),
            template_function: default_template_function(),
            no_trailing_semicolon: false,
            dialect_name: default_dialect(),
            gofmt: true,
            gofmt_path: default_gofmt_path(),
            check: false,
            diff: false,
            exclude: default_exclude(),
            generated_suffixes: default_generated_suffixes(),
            verbose: false,
            quiet: false,
            no_progressbar: false,
            threads: 0,
            single_process: false,
        }
    }
}
