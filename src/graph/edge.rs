use serde::Serialize;

use crate::cache::ResolvedImport;
use crate::extract::{ImportKind, ImportedNames};

/// File -> File: the source file imports from the target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEdge {
    /// The raw import path as written in source.
    pub specifier: String,
    pub kind: ImportKind,
    /// Names consumed from the target.
    pub names: ImportedNames,
}

impl From<&ResolvedImport> for ImportEdge {
    fn from(import: &ResolvedImport) -> Self {
        Self {
            specifier: import.specifier.clone(),
            kind: import.kind,
            names: import.names.clone(),
        }
    }
}
