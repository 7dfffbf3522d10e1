use std::path::{Path, PathBuf};

use crate::error::StmtfmtError;
use crate::mode::Mode;

const CONFIG_FILE_NAME: &str = "stmtfmt.toml";

/// Keys a config file may set. Everything else on `Mode` is per-invocation.
const KNOWN_KEYS: &[&str] = &[
    "target_type",
    "query_field",
    "template_function",
    "no_trailing_semicolon",
    "dialect",
    "dialect_name",
    "gofmt",
    "gofmt_path",
    "exclude",
    "generated_suffixes",
    "threads",
];

/// Load stmtfmt configuration from a stmtfmt.toml file.
/// Searches parent directories of the inputs if no config path is given.
pub fn load_config(files: &[PathBuf], config_path: Option<&Path>) -> Result<Mode, StmtfmtError> {
    let config_file = match config_path {
        Some(path) => {
            if path.exists() {
                Some(path.to_path_buf())
            } else {
                return Err(StmtfmtError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }
        None => find_config_file(files),
    };

    match config_file {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            parse_config(&content, &path)
        }
        None => Ok(Mode::default()),
    }
}

/// Search for a stmtfmt.toml in the common parent directories of the given files.
fn find_config_file(files: &[PathBuf]) -> Option<PathBuf> {
    get_common_parents(files)
        .into_iter()
        .map(|parent| parent.join(CONFIG_FILE_NAME))
        .find(|config| config.exists())
}

/// Get the parent directories of the given file paths, ordered from most
/// specific to least specific.
fn get_common_parents(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut parents = Vec::new();

    for file in files {
        let parent = if file.is_dir() {
            file.clone()
        } else {
            file.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };

        let mut current = Some(parent.as_path());
        while let Some(dir) = current {
            let dir_buf = dir.to_path_buf();
            if !parents.contains(&dir_buf) {
                parents.push(dir_buf);
            }
            current = dir.parent();
        }
    }

    parents
}

/// Parse config file contents into a Mode. Settings live at the top level,
/// or under a `[tool.stmtfmt]` table.
fn parse_config(content: &str, path: &Path) -> Result<Mode, StmtfmtError> {
    let parsed: toml::Table = content
        .parse()
        .map_err(|e| StmtfmtError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    let section = match parsed
        .get("tool")
        .and_then(|t| t.get("stmtfmt"))
        .and_then(|s| s.as_table())
        .cloned()
    {
        Some(table) => table,
        None => parsed,
    };

    for key in section.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            return Err(StmtfmtError::Config(format!(
                "Unknown config option: {}",
                key
            )));
        }
    }

    toml::Value::Table(section)
        .try_into()
        .map_err(|e| StmtfmtError::Config(format!("Invalid config in {}: {}", path.display(), e)))
}
