use std::path::PathBuf;

use serde::Serialize;

use crate::extract::ExportSet;
use crate::language::Dialect;

/// A source file in the dependency graph.
#[derive(Debug, Clone, Serialize)]
pub struct FileNode {
    /// Canonical path to the file.
    pub path: PathBuf,
    /// The grammar used: "typescript", "tsx" or "javascript". `None` for
    /// configured extensions without a grammar.
    pub language: Option<&'static str>,
    /// Names the file exports, `default` included.
    pub exports: ExportSet,
}

impl FileNode {
    pub fn new(path: PathBuf, exports: ExportSet) -> Self {
        let language = Dialect::for_path(&path).map(|d| d.display_name());
        Self {
            path,
            language,
            exports,
        }
    }
}
