use std::cell::RefCell;
use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::{AnalysisError, Result};
use crate::language::Dialect;

use super::SyntaxBackend;
use super::tree::{
    ExportSpecifier, ExportedDeclaration, ImportedName, NodeKind, SyntaxNode, SyntaxTree,
};

// Thread-local Parser instances: one per rayon worker thread, zero lock contention.
// Each Parser is initialised once per thread with the appropriate grammar.
thread_local! {
    static PARSER_TS: RefCell<Parser> = RefCell::new(new_parser(Dialect::TypeScript));
    static PARSER_TSX: RefCell<Parser> = RefCell::new(new_parser(Dialect::Tsx));
    static PARSER_JS: RefCell<Parser> = RefCell::new(new_parser(Dialect::JavaScript));
}

fn new_parser(dialect: Dialect) -> Parser {
    let language: tree_sitter::Language = match dialect {
        Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
    };
    let mut parser = Parser::new();
    // Grammars are compiled into the binary; a version mismatch is a build defect.
    parser
        .set_language(&language)
        .expect("bundled tree-sitter grammar has an incompatible ABI version");
    parser
}

/// Syntax backend built on the tree-sitter TypeScript/JavaScript grammars.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterBackend;

impl SyntaxBackend for TreeSitterBackend {
    fn name(&self) -> &'static str {
        "tree-sitter"
    }

    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree> {
        let dialect = Dialect::for_path(path).ok_or_else(|| AnalysisError::UnsupportedExtension {
            path: path.to_path_buf(),
        })?;

        let parse_with = |p: &RefCell<Parser>| p.borrow_mut().parse(source.as_bytes(), None);
        let tree = match dialect {
            Dialect::TypeScript => PARSER_TS.with(parse_with),
            Dialect::Tsx => PARSER_TSX.with(parse_with),
            Dialect::JavaScript => PARSER_JS.with(parse_with),
        }
        .ok_or_else(|| self.parse_error(path, "parser returned no tree".to_owned()))?;

        if let Some(message) = syntax_error(&tree) {
            return Err(self.parse_error(path, message));
        }

        let bytes = source.as_bytes();
        let root = tree.root_node();
        let mut cursor = root.walk();
        let children = root
            .named_children(&mut cursor)
            .filter_map(|child| convert(child, bytes))
            .collect();
        Ok(SyntaxTree::new(children))
    }
}

impl TreeSitterBackend {
    fn parse_error(&self, path: &Path, message: String) -> AnalysisError {
        AnalysisError::Parse {
            path: path.to_path_buf(),
            backend: self.name(),
            message,
        }
    }
}

/// Describe the first ERROR or MISSING node, if the tree has any.
fn syntax_error(tree: &Tree) -> Option<String> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }
    let node = first_error_node(root).unwrap_or(root);
    let pos = node.start_position();
    let what = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        "unexpected syntax".to_owned()
    };
    Some(format!("{what} at line {}, column {}", pos.row + 1, pos.column + 1))
}

fn first_error_node(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Conversion into the generic tree
// ---------------------------------------------------------------------------

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Convert a tree-sitter node and its subtree. Pass-through nodes without any
/// interesting descendant are dropped.
fn convert(node: Node, source: &[u8]) -> Option<SyntaxNode> {
    let kind = match node.kind() {
        "export_statement" => classify_export(node, source),
        "import_statement" => classify_import(node, source),
        "call_expression" => classify_call(node, source),
        _ => NodeKind::Other,
    };

    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter_map(|child| convert(child, source))
        .collect();

    let converted = SyntaxNode::with_children(kind, children);
    (!converted.is_empty_passthrough()).then_some(converted)
}

/// Text of a string literal node without quotes. `''` has no fragment child.
fn string_value(node: Node, source: &[u8]) -> String {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() == "string_fragment")
        .map(|c| node_text(c, source))
        .collect()
}

/// Identifier or string module export name (`export { a as "b-c" }`).
fn module_export_name(node: Node, source: &[u8]) -> String {
    if node.kind() == "string" {
        string_value(node, source)
    } else {
        node_text(node, source).to_owned()
    }
}

fn find_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

fn classify_export(node: Node, source: &[u8]) -> NodeKind {
    let source_str = node
        .child_by_field_name("source")
        .map(|s| string_value(s, source));

    // `export * as ns from './m'`: the star lives inside namespace_export.
    if let Some(ns) = find_child_of_kind(node, "namespace_export") {
        let mut cursor = ns.walk();
        let alias = ns
            .named_children(&mut cursor)
            .next()
            .map(|n| module_export_name(n, source));
        return NodeKind::ExportAll {
            source: source_str.unwrap_or_default(),
            alias,
        };
    }

    if find_child_of_kind(node, "*").is_some() {
        return NodeKind::ExportAll {
            source: source_str.unwrap_or_default(),
            alias: None,
        };
    }

    // `export default ...` wins over the declaration field: the declared name of
    // `export default function f() {}` is not an export.
    if find_child_of_kind(node, "default").is_some() {
        return NodeKind::ExportDefault;
    }

    if let Some(clause) = find_child_of_kind(node, "export_clause") {
        return NodeKind::ExportNamed {
            declaration: None,
            specifiers: export_clause_specifiers(clause, source),
            source: source_str,
        };
    }

    if let Some(declaration) = node.child_by_field_name("declaration") {
        return NodeKind::ExportNamed {
            declaration: Some(exported_declaration(declaration, source)),
            specifiers: Vec::new(),
            source: None,
        };
    }

    // `export = x`, `export as namespace X`, `export import A = B.C`
    NodeKind::Other
}

fn export_clause_specifiers(clause: Node, source: &[u8]) -> Vec<ExportSpecifier> {
    let mut specifiers = Vec::new();
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        if child.kind() != "export_specifier" {
            continue;
        }
        let Some(name) = child.child_by_field_name("name") else {
            continue;
        };
        let local = module_export_name(name, source);
        let exported = child
            .child_by_field_name("alias")
            .map(|a| module_export_name(a, source))
            .unwrap_or_else(|| local.clone());
        specifiers.push(ExportSpecifier { local, exported });
    }
    specifiers
}

fn exported_declaration(declaration: Node, source: &[u8]) -> ExportedDeclaration {
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = declaration.walk();
            let names = declaration
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "variable_declarator")
                .map(|declarator| {
                    declarator
                        .child_by_field_name("name")
                        .filter(|n| n.kind() == "identifier")
                        .map(|n| node_text(n, source).to_owned())
                })
                .collect();
            ExportedDeclaration::Variables(names)
        }
        // `export declare const x: T` / `export declare function f(): void`
        "ambient_declaration" => {
            let mut cursor = declaration.walk();
            let inner = declaration.named_children(&mut cursor).next();
            match inner {
                Some(inner) => exported_declaration(inner, source),
                None => ExportedDeclaration::Named(None),
            }
        }
        _ => ExportedDeclaration::Named(
            declaration
                .child_by_field_name("name")
                .map(|n| node_text(n, source).to_owned()),
        ),
    }
}

fn classify_import(node: Node, source: &[u8]) -> NodeKind {
    // `import x = require('y')` has no `source` field on the statement.
    let Some(source_node) = node.child_by_field_name("source") else {
        return NodeKind::Other;
    };

    let mut specifiers = Vec::new();
    if let Some(clause) = find_child_of_kind(node, "import_clause") {
        let mut cursor = clause.walk();
        for child in clause.named_children(&mut cursor) {
            match child.kind() {
                "identifier" => specifiers.push(ImportedName::Default),
                "namespace_import" => specifiers.push(ImportedName::Namespace),
                "named_imports" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        // In `import { foo as bar }` the `name` field is `foo`.
                        if let Some(name) = spec.child_by_field_name("name") {
                            let imported = module_export_name(name, source);
                            if imported == "default" {
                                specifiers.push(ImportedName::Default);
                            } else {
                                specifiers.push(ImportedName::Named(imported));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    NodeKind::Import {
        source: string_value(source_node, source),
        specifiers,
    }
}

fn classify_call(node: Node, source: &[u8]) -> NodeKind {
    let is_import = node
        .child_by_field_name("function")
        .is_some_and(|f| f.kind() == "import");
    if !is_import {
        return NodeKind::Other;
    }

    let first_arg = node.child_by_field_name("arguments").and_then(|args| {
        let mut cursor = args.walk();
        args.named_children(&mut cursor).next()
    });
    let source = first_arg
        .filter(|arg| arg.kind() == "string")
        .map(|arg| string_value(arg, source));
    NodeKind::DynamicImport { source }
}
