//! Export and import extraction over the generic syntax tree.
//!
//! Every function here is a pure function of the [`SyntaxTree`]: the same rules
//! apply whichever backend produced it. Absent data (an anonymous declaration, a
//! destructuring pattern) contributes nothing instead of failing.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::parser::tree::{ExportedDeclaration, ImportedName, NodeKind, SyntaxTree};

/// Exported names of one module. Contains `default` when a default export exists.
pub type ExportSet = BTreeSet<String>;

/// How a dependency is introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import ... from './m'` or `import './m'`
    Static,
    /// `import('./m')`
    Dynamic,
    /// `export { a } from './m'`, `export * from './m'`
    ReExport,
}

/// One raw import statement, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub specifier: String,
    pub kind: ImportKind,
    pub names: Vec<ImportedName>,
}

impl ImportRecord {
    /// The names this record consumes from its target module.
    ///
    /// Namespace, dynamic and side-effect-only imports consume everything.
    pub fn imported_names(&self) -> ImportedNames {
        if self.kind == ImportKind::Dynamic
            || self.names.is_empty()
            || self.names.contains(&ImportedName::Namespace)
        {
            return ImportedNames::All;
        }
        ImportedNames::Names(
            self.names
                .iter()
                .filter_map(|name| match name {
                    ImportedName::Named(n) => Some(n.clone()),
                    ImportedName::Default => Some("default".to_owned()),
                    ImportedName::Namespace => None,
                })
                .collect(),
        )
    }
}

/// Names consumed from one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportedNames {
    Names(BTreeSet<String>),
    All,
}

impl ImportedNames {
    /// Combine the names of two records that target the same file.
    pub fn merge(&mut self, other: ImportedNames) {
        match (&mut *self, other) {
            (ImportedNames::All, _) => {}
            (_, ImportedNames::All) => *self = ImportedNames::All,
            (ImportedNames::Names(mine), ImportedNames::Names(theirs)) => mine.extend(theirs),
        }
    }

    pub fn uses(&self, name: &str) -> bool {
        match self {
            ImportedNames::All => true,
            ImportedNames::Names(names) => names.contains(name),
        }
    }
}

/// Everything one parse yields for a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSummary {
    pub exports: ExportSet,
    /// Static, dynamic and re-export records in source order.
    pub imports: Vec<ImportRecord>,
}

pub fn summarize(tree: &SyntaxTree) -> ModuleSummary {
    ModuleSummary {
        exports: extract_exports(tree),
        imports: extract_imports(tree),
    }
}

/// Collect the exported names of a module.
pub fn extract_exports(tree: &SyntaxTree) -> ExportSet {
    let mut exports = ExportSet::new();
    // Module-level statements only. Exports inside `namespace` and
    // `declare module` bodies belong to those scopes.
    for node in &tree.root.children {
        match &node.kind {
            NodeKind::ExportNamed {
                declaration,
                specifiers,
                ..
            } => {
                match declaration {
                    Some(ExportedDeclaration::Variables(names)) => {
                        exports.extend(names.iter().flatten().cloned());
                    }
                    Some(ExportedDeclaration::Named(Some(name))) => {
                        exports.insert(name.clone());
                    }
                    Some(ExportedDeclaration::Named(None)) | None => {}
                }
                exports.extend(specifiers.iter().map(|s| s.exported.clone()));
            }
            NodeKind::ExportDefault => {
                exports.insert("default".to_owned());
            }
            NodeKind::ExportAll {
                alias: Some(alias), ..
            } => {
                exports.insert(alias.clone());
            }
            _ => {}
        }
    }
    exports
}

/// Collect import records: static imports, literal dynamic imports and re-export sources.
pub fn extract_imports(tree: &SyntaxTree) -> Vec<ImportRecord> {
    let mut imports = Vec::new();
    tree.root.walk(&mut |node| {
        let record = match &node.kind {
            NodeKind::Import { source, specifiers } => ImportRecord {
                specifier: source.clone(),
                kind: ImportKind::Static,
                names: specifiers.clone(),
            },
            NodeKind::DynamicImport {
                source: Some(source),
            } => ImportRecord {
                specifier: source.clone(),
                kind: ImportKind::Dynamic,
                names: Vec::new(),
            },
            NodeKind::ExportNamed {
                specifiers,
                source: Some(source),
                ..
            } => ImportRecord {
                specifier: source.clone(),
                kind: ImportKind::ReExport,
                names: specifiers
                    .iter()
                    .map(|s| match s.local.as_str() {
                        "default" => ImportedName::Default,
                        local => ImportedName::Named(local.to_owned()),
                    })
                    .collect(),
            },
            NodeKind::ExportAll { source, .. } => ImportRecord {
                specifier: source.clone(),
                kind: ImportKind::ReExport,
                names: vec![ImportedName::Namespace],
            },
            _ => return,
        };
        if !record.specifier.is_empty() {
            imports.push(record);
        }
    });
    imports
}
