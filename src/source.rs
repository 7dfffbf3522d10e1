use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser, Tree};

use crate::error::{Result, StmtfmtError};

/// A 1-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A pending replacement of one literal's source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub range: Range<usize>,
    pub text: String,
}

/// A parsed Go source file plus the literal replacements recorded against it.
///
/// The syntax tree itself is never edited: replacements are keyed by the
/// byte range of the literal they overwrite and spliced in when the file is
/// printed. Tree topology is therefore unchanged until then.
pub struct SourceFile {
    path: PathBuf,
    source: String,
    tree: Tree,
    replacements: Vec<Replacement>,
}

impl SourceFile {
    /// Parse Go source. A file containing syntax errors is rejected, pointing
    /// at the first error node.
    pub fn parse(path: impl Into<PathBuf>, source: String) -> Result<Self> {
        let path = path.into();
        let tree = parse_go(&path, &source)?;

        if let Some(node) = first_error(tree.root_node()) {
            let pos = node.start_position();
            let message = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "syntax error".to_string()
            };
            return Err(StmtfmtError::Parse {
                path,
                line: pos.row + 1,
                column: pos.column + 1,
                message,
            });
        }

        Ok(Self {
            path,
            source,
            tree,
            replacements: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The source text spanned by a node.
    pub fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    pub fn position(&self, node: Node<'_>) -> Position {
        let point = node.start_position();
        Position {
            line: point.row + 1,
            column: point.column + 1,
        }
    }

    /// Record new source text for the node occupying `range`.
    pub fn replace(&mut self, range: Range<usize>, text: String) {
        self.replacements.retain(|r| r.range != range);
        self.replacements.push(Replacement { range, text });
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// The source with all recorded replacements spliced in.
    pub fn rewritten(&self) -> String {
        let mut ordered: Vec<&Replacement> = self.replacements.iter().collect();
        ordered.sort_by_key(|r| r.range.start);

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for replacement in ordered {
            out.push_str(&self.source[cursor..replacement.range.start]);
            out.push_str(&replacement.text);
            cursor = replacement.range.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

pub(crate) fn parse_go(path: &Path, source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| StmtfmtError::Parse {
            path: path.to_path_buf(),
            line: 1,
            column: 1,
            message: format!("incompatible Go grammar: {}", e),
        })?;
    parser.parse(source, None).ok_or_else(|| StmtfmtError::Parse {
        path: path.to_path_buf(),
        line: 1,
        column: 1,
        message: "parser returned no tree".to_string(),
    })
}

/// The first `ERROR` or missing node in document order.
pub(crate) fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "package main\n\nvar q = \"SELECT 1\"\n";

    #[test]
    fn test_parse_valid_file() {
        let file = SourceFile::parse("main.go", SOURCE.to_string()).unwrap();
        assert_eq!(file.root().kind(), "source_file");
        assert_eq!(file.path(), Path::new("main.go"));
    }

    #[test]
    fn test_parse_rejects_syntax_errors() {
        let err = SourceFile::parse("bad.go", "package main\n\nfunc {\n".to_string())
            .err()
            .unwrap();
        assert!(matches!(err, StmtfmtError::Parse { .. }));
        assert!(err.to_string().starts_with("bad.go:"));
    }

    #[test]
    fn test_rewritten_splices_replacements() {
        let mut file = SourceFile::parse("main.go", SOURCE.to_string()).unwrap();
        let start = SOURCE.find('"').unwrap();
        let end = SOURCE.rfind('"').unwrap() + 1;
        file.replace(start..end, "`SELECT 2`".to_string());
        assert_eq!(file.rewritten(), "package main\n\nvar q = `SELECT 2`\n");
        assert_eq!(file.source(), SOURCE);
    }

    #[test]
    fn test_replace_same_range_overwrites() {
        let mut file = SourceFile::parse("main.go", SOURCE.to_string()).unwrap();
        let start = SOURCE.find('"').unwrap();
        let end = SOURCE.rfind('"').unwrap() + 1;
        file.replace(start..end, "\"a\"".to_string());
        file.replace(start..end, "\"b\"".to_string());
        assert_eq!(file.replacements().len(), 1);
        assert_eq!(file.rewritten(), "package main\n\nvar q = \"b\"\n");
    }

    #[test]
    fn test_position_is_one_based() {
        let file = SourceFile::parse("main.go", SOURCE.to_string()).unwrap();
        let root = file.root();
        assert_eq!(file.position(root), Position { line: 1, column: 1 });
        assert_eq!(Position { line: 9, column: 11 }.to_string(), "9:11");
    }
}
