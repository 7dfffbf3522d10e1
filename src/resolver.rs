use std::collections::HashMap;

use tree_sitter::Node;

use crate::source::SourceFile;

/// Resolves syntax nodes to fully-qualified names, e.g.
/// `cloud.google.com/go/spanner.Statement` or `fmt.Sprintf`.
pub trait TypeResolver {
    /// The fully-qualified name of a type expression.
    fn type_name(&self, file: &SourceFile, node: Node<'_>) -> Option<String>;

    /// The fully-qualified name of the function a call expression invokes.
    fn callee_name(&self, file: &SourceFile, node: Node<'_>) -> Option<String>;
}

/// Name resolution through the file's own package clause and import table.
///
/// This resolves exactly the shapes that matter for locating statements:
/// qualified names like `spanner.Statement` and `fmt.Sprintf`, and
/// unqualified names declared in the file's own package. Local shadowing of
/// an import name is not tracked.
#[derive(Debug, Default)]
pub struct ImportResolver {
    package: String,
    imports: HashMap<String, String>,
}

impl ImportResolver {
    pub fn new(file: &SourceFile) -> Self {
        let mut resolver = Self::default();
        let root = file.root();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    let mut inner = child.walk();
                    let name = child
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "package_identifier");
                    if let Some(name) = name {
                        resolver.package = file.text(name).to_string();
                    }
                }
                "import_declaration" => resolver.collect_imports(file, child),
                _ => {}
            }
        }
        resolver
    }

    fn collect_imports(&mut self, file: &SourceFile, node: Node<'_>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => self.add_import(file, child),
                "import_spec_list" => self.collect_imports(file, child),
                _ => {}
            }
        }
    }

    fn add_import(&mut self, file: &SourceFile, spec: Node<'_>) {
        let Some(path_node) = spec.child_by_field_name("path") else {
            return;
        };
        let Some(path) = crate::quote::decode(file.text(path_node)) else {
            return;
        };
        let name = match spec.child_by_field_name("name") {
            Some(n) if n.kind() == "package_identifier" => file.text(n).to_string(),
            // `_` and `.` imports introduce no qualifier.
            Some(_) => return,
            None => default_package_name(&path).to_string(),
        };
        self.imports.insert(name, path);
    }

    /// The import path bound to a package qualifier.
    pub fn import_path(&self, qualifier: &str) -> Option<&str> {
        self.imports.get(qualifier).map(String::as_str)
    }

    fn qualify(&self, file: &SourceFile, qualifier: Node<'_>, name: Node<'_>) -> Option<String> {
        let path = self.import_path(file.text(qualifier))?;
        Some(format!("{}.{}", path, file.text(name)))
    }
}

impl TypeResolver for ImportResolver {
    fn type_name(&self, file: &SourceFile, node: Node<'_>) -> Option<String> {
        match node.kind() {
            "qualified_type" => self.qualify(
                file,
                node.child_by_field_name("package")?,
                node.child_by_field_name("name")?,
            ),
            "type_identifier" => Some(format!("{}.{}", self.package, file.text(node))),
            _ => None,
        }
    }

    fn callee_name(&self, file: &SourceFile, node: Node<'_>) -> Option<String> {
        let function = node.child_by_field_name("function")?;
        match function.kind() {
            "selector_expression" => {
                let operand = function.child_by_field_name("operand")?;
                if operand.kind() != "identifier" {
                    return None;
                }
                self.qualify(file, operand, function.child_by_field_name("field")?)
            }
            "identifier" => Some(format!("{}.{}", self.package, file.text(function))),
            _ => None,
        }
    }
}

/// The package name Go assumes for an import without an explicit name: the
/// last path element, skipping a `/vN` major-version suffix.
fn default_package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].bytes().all(|b| b.is_ascii_digit());
    if is_major_version {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}
