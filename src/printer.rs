use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, StmtfmtError};
use crate::source::{first_error, parse_go, SourceFile};

/// The host language's canonical whitespace/indentation pass, applied to the
/// whole rewritten file.
pub trait SourceFormatter {
    fn format_source(&self, source: &str) -> std::result::Result<String, String>;
}

/// Leaves the rewritten text exactly as spliced.
#[derive(Debug, Default, Clone, Copy)]
pub struct Verbatim;

impl SourceFormatter for Verbatim {
    fn format_source(&self, source: &str) -> std::result::Result<String, String> {
        Ok(source.to_string())
    }
}

/// Pipes the rewritten text through `gofmt`.
#[derive(Debug, Clone)]
pub struct Gofmt {
    pub program: PathBuf,
}

impl Default for Gofmt {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gofmt"),
        }
    }
}

impl SourceFormatter for Gofmt {
    fn format_source(&self, source: &str) -> std::result::Result<String, String> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to run {}: {}", self.program.display(), e))?;

        // Feed stdin from another thread so a large file cannot deadlock
        // against a full stdout pipe.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| "failed to open gofmt stdin".to_string())?;
        let input = source.to_string();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output().map_err(|e| e.to_string())?;
        writer
            .join()
            .map_err(|_| "gofmt stdin writer panicked".to_string())?
            .map_err(|e| e.to_string())?;

        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
        }
        String::from_utf8(output.stdout).map_err(|e| e.to_string())
    }
}

/// Serialize a file with its replacements applied, check that the result is
/// still valid Go, then run the canonical formatter over it.
///
/// Any failure here means the rewrite itself is broken, so the whole file is
/// rejected rather than emitting corrupt output.
pub fn print(file: SourceFile, formatter: &dyn SourceFormatter) -> Result<String> {
    let path = file.path().to_path_buf();
    let rewritten = file.rewritten();
    validate(&path, &rewritten)?;

    formatter
        .format_source(&rewritten)
        .map_err(|message| StmtfmtError::Canonical { path, message })
}

fn validate(path: &Path, source: &str) -> Result<()> {
    let tree = parse_go(path, source)?;
    match first_error(tree.root_node()) {
        None => Ok(()),
        Some(node) => {
            let pos = node.start_position();
            Err(StmtfmtError::Print {
                path: path.to_path_buf(),
                message: format!(
                    "rewritten source is not valid Go at {}:{}",
                    pos.row + 1,
                    pos.column + 1
                ),
            })
        }
    }
}
