use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::error::Result;
use crate::formatter::{FileFormatResult, LiteralFormatter};
use crate::locator;
use crate::mode::Mode;
use crate::printer::SourceFormatter;
use crate::report::{FileResult, FileStatus, Report};
use crate::resolver::ImportResolver;
use crate::source::SourceFile;
use crate::sql::SqlFormatter;

const GO_EXTENSION: &str = "go";

/// Format the SQL literals of one Go source file according to the given mode.
/// This is the core API function.
pub fn format_source(path: &Path, source: &str, mode: &Mode) -> Result<FileFormatResult> {
    let sql = mode.sql_formatter()?;
    let canonical = mode.source_formatter();
    format_source_with(path, source, mode, &sql, canonical.as_ref())
}

/// Like [`format_source`], with explicit SQL and Go formatters.
pub fn format_source_with(
    path: &Path,
    source: &str,
    mode: &Mode,
    sql: &dyn SqlFormatter,
    canonical: &dyn SourceFormatter,
) -> Result<FileFormatResult> {
    // Step 1: Parse
    let file = SourceFile::parse(path, source.to_string())?;

    // Step 2: Locate SQL literals
    let resolver = ImportResolver::new(&file);
    let candidates = locator::locate(&file, &resolver, &mode.targets());

    // Step 3: Format literals and print
    LiteralFormatter::new(sql, mode.no_trailing_semicolon).run(file, &candidates, canonical)
}

/// Run the formatter on a collection of files.
pub fn run(files: &[PathBuf], mode: &Mode) -> Report {
    let matching_paths = get_matching_paths(files, mode);
    let mut report = Report::new();
    debug!("found {} Go file(s)", matching_paths.len());

    let progress = if mode.show_progress() && matching_paths.len() > 1 {
        let bar = ProgressBar::new(matching_paths.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let format_one = |path: &PathBuf| {
        progress.set_message(path.display().to_string());
        let result = format_file(path, mode);
        progress.inc(1);
        result
    };

    if mode.single_process || matching_paths.len() <= 1 {
        for path in &matching_paths {
            report.add(format_one(path));
        }
    } else {
        // Parallel processing with rayon. Results are gathered by rayon's
        // collector, so no per-file report is lost or duplicated.
        use rayon::prelude::*;

        match rayon::ThreadPoolBuilder::new()
            .num_threads(mode.threads)
            .build()
        {
            Ok(pool) => {
                let results: Vec<FileResult> =
                    pool.install(|| matching_paths.par_iter().map(format_one).collect());
                for result in results {
                    report.add(result);
                }
            }
            Err(e) => {
                warn!("failed to build thread pool, formatting sequentially: {}", e);
                for path in &matching_paths {
                    report.add(format_one(path));
                }
            }
        }
    }

    progress.finish_and_clear();
    report
}

/// Format a single file, writing it back when it changed.
fn format_file(path: &Path, mode: &Mode) -> FileResult {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => return FileResult::error(path.to_path_buf(), format!("Read error: {}", e)),
    };

    let result = match format_source(path, &source, mode) {
        Ok(r) => r,
        Err(e) => {
            warn!("skipping {}: {}", path.display(), e);
            return FileResult::error(path.to_path_buf(), e.to_string());
        }
    };

    let status = if !result.errors.is_empty() {
        FileStatus::Failed
    } else if result.changed {
        FileStatus::Changed
    } else {
        FileStatus::Unchanged
    };
    let file_result = FileResult {
        path: path.to_path_buf(),
        status,
        changed: result.changed,
        literal_errors: result.errors,
        error: None,
    };

    let Some(formatted) = result.output else {
        return file_result;
    };

    if mode.diff {
        print_diff(path, &source, &formatted);
    }
    if !mode.should_write() {
        return file_result;
    }

    // Write formatted output
    match std::fs::write(path, &formatted) {
        Ok(_) => {
            info!("rewrote {}", path.display());
            file_result
        }
        Err(e) => FileResult {
            status: FileStatus::Error,
            changed: false,
            error: Some(format!("Write error: {}", e)),
            ..file_result
        },
    }
}

/// Get all Go file paths that match the given inputs.
pub fn get_matching_paths(paths: &[PathBuf], mode: &Mode) -> Vec<PathBuf> {
    let mut result = HashSet::new();

    for path in paths {
        if path.is_file() {
            if is_go_file(path) && !is_generated(path, &mode.generated_suffixes) {
                result.insert(path.clone());
            }
        } else if path.is_dir() {
            collect_go_files(path, mode, &mut result);
        }
    }

    let mut sorted: Vec<PathBuf> = result.into_iter().collect();
    sorted.sort();
    sorted
}

fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == GO_EXTENSION)
}

fn is_generated(path: &Path, suffixes: &[String]) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// Recursively collect Go files from a directory.
fn collect_go_files(dir: &Path, mode: &Mode, result: &mut HashSet<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("cannot read directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Skip hidden entries and excluded patterns
        if name.starts_with('.') {
            continue;
        }
        if mode.exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(&name))
                .unwrap_or(false)
        }) {
            continue;
        }

        if path.is_dir() {
            collect_go_files(&path, mode, result);
        } else if is_go_file(&path) && !is_generated(&path, &mode.generated_suffixes) {
            result.insert(path);
        }
    }
}

/// Print a diff between original and formatted content.
fn print_diff(path: &Path, original: &str, formatted: &str) {
    use similar::{ChangeTag, TextDiff};

    eprintln!("--- {}", path.display());
    eprintln!("+++ {}", path.display());

    let diff = TextDiff::from_lines(original, formatted);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        eprint!("{}{}", sign, change);
    }
}
