use std::ops::Range;

use log::debug;
use smallvec::SmallVec;
use tree_sitter::Node;

use crate::resolver::TypeResolver;
use crate::source::{Position, SourceFile};

/// The names that identify a statement constructor and its query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    /// Fully-qualified type of the composite literal, e.g.
    /// `cloud.google.com/go/spanner.Statement`.
    pub type_name: String,
    /// Field holding the query text, e.g. `SQL`.
    pub query_field: String,
    /// Fully-qualified templating function, e.g. `fmt.Sprintf`.
    pub template_function: String,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            type_name: "cloud.google.com/go/spanner.Statement".to_string(),
            query_field: "SQL".to_string(),
            template_function: "fmt.Sprintf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `SQL: "..."`
    Direct,
    /// `SQL: fmt.Sprintf("...", args...)`; only the format string is rewritten.
    Templated,
}

/// A string literal holding SQL, eligible for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLiteral {
    pub kind: LiteralKind,
    /// Byte range of the literal, delimiters included.
    pub range: Range<usize>,
    pub position: Position,
    /// Source text of the literal, delimiters included.
    pub raw: String,
}

/// Find every SQL literal bound to a recognized constructor, in document
/// order.
pub fn locate(
    file: &SourceFile,
    resolver: &dyn TypeResolver,
    targets: &Targets,
) -> Vec<CandidateLiteral> {
    let mut found = Vec::new();
    let mut stack: SmallVec<[Node<'_>; 32]> = SmallVec::new();
    stack.push(file.root());

    // Children are pushed in reverse so nodes pop in document order.
    while let Some(node) = stack.pop() {
        if node.kind() == "composite_literal" {
            if let Some(candidate) = inspect_composite(file, resolver, targets, node) {
                found.push(candidate);
            }
        }
        let mut cursor = node.walk();
        let children: SmallVec<[Node<'_>; 8]> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    debug!(
        "{}: located {} candidate literal(s)",
        file.path().display(),
        found.len()
    );
    found
}

fn inspect_composite(
    file: &SourceFile,
    resolver: &dyn TypeResolver,
    targets: &Targets,
    node: Node<'_>,
) -> Option<CandidateLiteral> {
    let type_node = node.child_by_field_name("type")?;
    if resolver.type_name(file, type_node)? != targets.type_name {
        return None;
    }

    let body = node.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let value = body
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "keyed_element")
        .find_map(|element| query_value(file, targets, element))?;

    match value.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            Some(candidate(file, LiteralKind::Direct, value))
        }
        "call_expression" => {
            if resolver.callee_name(file, value)? != targets.template_function {
                return None;
            }
            let format = first_argument(value)?;
            if !is_string_literal(format) {
                debug!(
                    "{}:{}: format argument is not a string literal, skipping",
                    file.path().display(),
                    file.position(format)
                );
                return None;
            }
            Some(candidate(file, LiteralKind::Templated, format))
        }
        _ => None,
    }
}

/// The value of a keyed element whose key is the query field.
fn query_value<'t>(file: &SourceFile, targets: &Targets, element: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = element.walk();
    let parts: Vec<Node<'t>> = element
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    let (key, value) = match parts.as_slice() {
        [key, .., value] => (unwrap_element(*key), unwrap_element(*value)),
        _ => return None,
    };
    if !matches!(key.kind(), "identifier" | "field_identifier") {
        return None;
    }
    (file.text(key) == targets.query_field).then_some(value)
}

/// Newer grammars wrap keys and values in `literal_element`.
fn unwrap_element(node: Node<'_>) -> Node<'_> {
    if node.kind() == "literal_element" {
        node.named_child(0).unwrap_or(node)
    } else {
        node
    }
}

fn first_argument(call: Node<'_>) -> Option<Node<'_>> {
    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let first = arguments
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment");
    first
}

fn is_string_literal(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "interpreted_string_literal" | "raw_string_literal"
    )
}

fn candidate(file: &SourceFile, kind: LiteralKind, node: Node<'_>) -> CandidateLiteral {
    CandidateLiteral {
        kind,
        range: node.byte_range(),
        position: file.position(node),
        raw: file.text(node).to_string(),
    }
}
