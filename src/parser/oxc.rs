use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPatternKind, Declaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportNamedDeclaration, Expression, ImportDeclaration, ImportDeclarationSpecifier,
    ImportExpression, ModuleExportName, TSModuleDeclaration,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::{AnalysisError, Result};
use crate::language::Dialect;

use super::SyntaxBackend;
use super::tree::{
    ExportSpecifier, ExportedDeclaration, ImportedName, NodeKind, SyntaxNode, SyntaxTree,
};

/// Syntax backend built on `oxc_parser`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxcBackend;

impl SyntaxBackend for OxcBackend {
    fn name(&self) -> &'static str {
        "oxc"
    }

    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree> {
        let unsupported = || AnalysisError::UnsupportedExtension {
            path: path.to_path_buf(),
        };
        Dialect::for_path(path).ok_or_else(unsupported)?;
        // `.cjs` would otherwise be parsed as a script and reject `import`.
        let source_type = SourceType::from_path(path)
            .map_err(|_| unsupported())?
            .with_module(true);

        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, source_type).parse();
        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "parser aborted".to_owned());
            return Err(AnalysisError::Parse {
                path: path.to_path_buf(),
                backend: self.name(),
                message,
            });
        }

        let mut builder = TreeBuilder::default();
        builder.visit_program(&ret.program);
        Ok(SyntaxTree::new(builder.finish()))
    }
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

fn exported_declaration(declaration: &Declaration) -> ExportedDeclaration {
    match declaration {
        Declaration::VariableDeclaration(var) => ExportedDeclaration::Variables(
            var.declarations
                .iter()
                .map(|decl| match &decl.id.kind {
                    BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        Declaration::FunctionDeclaration(func) => {
            ExportedDeclaration::Named(func.id.as_ref().map(|id| id.name.to_string()))
        }
        Declaration::ClassDeclaration(class) => {
            ExportedDeclaration::Named(class.id.as_ref().map(|id| id.name.to_string()))
        }
        Declaration::TSTypeAliasDeclaration(alias) => {
            ExportedDeclaration::Named(Some(alias.id.name.to_string()))
        }
        Declaration::TSInterfaceDeclaration(iface) => {
            ExportedDeclaration::Named(Some(iface.id.name.to_string()))
        }
        Declaration::TSEnumDeclaration(en) => {
            ExportedDeclaration::Named(Some(en.id.name.to_string()))
        }
        Declaration::TSModuleDeclaration(module) => {
            ExportedDeclaration::Named(Some(module.id.name().to_string()))
        }
        _ => ExportedDeclaration::Named(None),
    }
}

/// Builds the generic tree from the oxc AST.
///
/// Only recognised nodes are materialised; each one becomes a child of the
/// nearest recognised ancestor (or of the root). Every frame on `stack` collects
/// the children of one open node.
struct TreeBuilder {
    stack: Vec<Vec<SyntaxNode>>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            stack: vec![Vec::new()],
        }
    }
}

impl TreeBuilder {
    fn open(&mut self) {
        self.stack.push(Vec::new());
    }

    fn close(&mut self, kind: NodeKind) {
        let children = self.stack.pop().unwrap_or_default();
        let node = SyntaxNode::with_children(kind, children);
        if node.is_empty_passthrough() {
            return;
        }
        if let Some(parent) = self.stack.last_mut() {
            parent.push(node);
        }
    }

    fn finish(mut self) -> Vec<SyntaxNode> {
        self.stack.pop().unwrap_or_default()
    }
}

impl<'a> Visit<'a> for TreeBuilder {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        let specifiers = it
            .specifiers
            .iter()
            .flatten()
            .map(|spec| match spec {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(_) => ImportedName::Default,
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => ImportedName::Namespace,
                ImportDeclarationSpecifier::ImportSpecifier(named) => {
                    match export_name(&named.imported) {
                        name if name == "default" => ImportedName::Default,
                        name => ImportedName::Named(name),
                    }
                }
            })
            .collect();

        self.open();
        walk::walk_import_declaration(self, it);
        self.close(NodeKind::Import {
            source: it.source.value.to_string(),
            specifiers,
        });
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        let kind = NodeKind::ExportNamed {
            declaration: it.declaration.as_ref().map(exported_declaration),
            specifiers: it
                .specifiers
                .iter()
                .map(|spec| ExportSpecifier {
                    local: export_name(&spec.local),
                    exported: export_name(&spec.exported),
                })
                .collect(),
            source: it.source.as_ref().map(|s| s.value.to_string()),
        };

        self.open();
        walk::walk_export_named_declaration(self, it);
        self.close(kind);
    }

    fn visit_export_default_declaration(&mut self, it: &ExportDefaultDeclaration<'a>) {
        self.open();
        walk::walk_export_default_declaration(self, it);
        self.close(NodeKind::ExportDefault);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.open();
        walk::walk_export_all_declaration(self, it);
        self.close(NodeKind::ExportAll {
            source: it.source.value.to_string(),
            alias: it.exported.as_ref().map(export_name),
        });
    }

    // `namespace N { ... }` and `declare module 'm' { ... }` open a scope of
    // their own; nodes inside stay below it instead of at module level.
    fn visit_ts_module_declaration(&mut self, it: &TSModuleDeclaration<'a>) {
        self.open();
        walk::walk_ts_module_declaration(self, it);
        self.close(NodeKind::Other);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        let source = match &it.source {
            Expression::StringLiteral(lit) => Some(lit.value.to_string()),
            _ => None,
        };

        self.open();
        walk::walk_import_expression(self, it);
        self.close(NodeKind::DynamicImport { source });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(file: &str, src: &str) -> SyntaxTree {
        OxcBackend
            .parse(Path::new(file), src)
            .expect("source should parse")
    }

    #[test]
    fn test_nested_dynamic_import_is_child_of_export() {
        let tree = parse("a.ts", "export const load = () => import('./lazy');");
        assert_eq!(tree.root.children.len(), 1);
        let export = &tree.root.children[0];
        assert!(matches!(export.kind, NodeKind::ExportNamed { .. }));
        assert_eq!(
            export.children,
            vec![SyntaxNode::new(NodeKind::DynamicImport {
                source: Some("./lazy".into())
            })]
        );
    }

    #[test]
    fn test_namespace_body_stays_below_its_export() {
        let tree = parse("a.ts", "export namespace NS { export const x = 1; }");
        assert_eq!(tree.root.children.len(), 1);
        let export = &tree.root.children[0];
        assert!(matches!(
            &export.kind,
            NodeKind::ExportNamed { declaration: Some(ExportedDeclaration::Named(Some(name))), .. }
                if name == "NS"
        ));
        assert_eq!(export.children.len(), 1);
        assert_eq!(export.children[0].kind, NodeKind::Other);
        assert!(matches!(
            export.children[0].children[0].kind,
            NodeKind::ExportNamed { .. }
        ));
    }

    #[test]
    fn test_empty_namespace_leaves_no_node() {
        let tree = parse("a.ts", "namespace Empty {}");
        assert!(tree.root.children.is_empty());
    }

    #[test]
    fn test_export_specifier_alias_and_reexport_source() {
        let tree = parse("a.js", "export { x as y } from './m';");
        assert_eq!(
            tree.root.children[0].kind,
            NodeKind::ExportNamed {
                declaration: None,
                specifiers: vec![ExportSpecifier {
                    local: "x".into(),
                    exported: "y".into()
                }],
                source: Some("./m".into()),
            }
        );
    }

    #[test]
    fn test_import_default_named_and_namespace() {
        let tree = parse(
            "a.tsx",
            "import D, { a as b } from './x';\nimport * as ns from './y';\nimport './side';",
        );
        let kinds: Vec<_> = tree.root.children.iter().map(|n| n.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Import {
                    source: "./x".into(),
                    specifiers: vec![ImportedName::Default, ImportedName::Named("a".into())],
                },
                NodeKind::Import {
                    source: "./y".into(),
                    specifiers: vec![ImportedName::Namespace],
                },
                NodeKind::Import {
                    source: "./side".into(),
                    specifiers: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_commonjs_extension_parses_as_module() {
        let tree = parse("a.cjs", "import x from './x';");
        assert_eq!(tree.root.children.len(), 1);
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let err = OxcBackend
            .parse(Path::new("bad.ts"), "export const = ;")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { backend: "oxc", .. }));
    }
}
