//! Backend-neutral syntax tree.
//!
//! Only the node kinds the extractor consumes are modelled as variants; every other
//! construct is an [`NodeKind::Other`] pass-through container whose children are
//! still walked. Backends prune `Other` nodes that have no interesting descendants.

/// A declaration attached to `export <declaration>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportedDeclaration {
    /// `export const a = 1, b = 2` - one entry per declarator; `None` for
    /// destructuring patterns, which contribute no names.
    Variables(Vec<Option<String>>),
    /// `export function f() {}`, `export class C {}`, `export interface I {}`, ...
    Named(Option<String>),
}

/// One entry of an `export { local as exported }` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

/// One binding of an import declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportedName {
    /// `import { original as local }` - holds the original (imported) name.
    Named(String),
    /// `import Default from`
    Default,
    /// `import * as ns from`
    Namespace,
}

/// The node kinds the extractor understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    ExportNamed {
        declaration: Option<ExportedDeclaration>,
        specifiers: Vec<ExportSpecifier>,
        /// Present for `export { a } from './m'`.
        source: Option<String>,
    },
    ExportDefault,
    /// `export * from './m'` or `export * as alias from './m'`.
    ExportAll {
        source: String,
        alias: Option<String>,
    },
    Import {
        source: String,
        specifiers: Vec<ImportedName>,
    },
    /// `import(...)`; `source` is `None` when the argument is not a string literal.
    DynamicImport {
        source: Option<String>,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<SyntaxNode>) -> Self {
        Self { kind, children }
    }

    /// Pre-order traversal over this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SyntaxNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// An `Other` leaf carries no information and can be dropped from the tree.
    pub(crate) fn is_empty_passthrough(&self) -> bool {
        matches!(self.kind, NodeKind::Other) && self.children.is_empty()
    }
}

/// A parsed module: the root node of a generic syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub root: SyntaxNode,
}

impl SyntaxTree {
    pub fn new(children: Vec<SyntaxNode>) -> Self {
        Self {
            root: SyntaxNode::with_children(NodeKind::Other, children),
        }
    }
}
