pub mod tree;
pub mod treesitter;

#[cfg(feature = "oxc")]
pub mod oxc;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

use tree::SyntaxTree;

/// A producer of generic syntax trees.
///
/// Implementations are adapters only: every extraction rule lives in
/// [`crate::extract`] and runs over the returned [`SyntaxTree`], so all backends
/// give the same answers for the same source.
pub trait SyntaxBackend: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Parse `source` (the contents of `path`). The path selects the grammar.
    ///
    /// # Errors
    /// - [`AnalysisError::UnsupportedExtension`] when no grammar matches the path
    /// - [`AnalysisError::Parse`] when the source contains syntax errors
    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree>;
}

/// Which syntax backend an analysis uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    TreeSitter,
    Oxc,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::TreeSitter => "tree-sitter",
            Backend::Oxc => "oxc",
        }
    }

    /// Whether this build can instantiate the backend.
    pub fn is_available(&self) -> bool {
        match self {
            Backend::TreeSitter => true,
            Backend::Oxc => cfg!(feature = "oxc"),
        }
    }

    /// Instantiate the backend.
    ///
    /// # Errors
    /// [`AnalysisError::BackendUnavailable`] when the backend was compiled out.
    pub fn instantiate(self) -> Result<Arc<dyn SyntaxBackend>> {
        match self {
            Backend::TreeSitter => Ok(Arc::new(treesitter::TreeSitterBackend)),
            #[cfg(feature = "oxc")]
            Backend::Oxc => Ok(Arc::new(oxc::OxcBackend)),
            #[cfg(not(feature = "oxc"))]
            Backend::Oxc => Err(AnalysisError::BackendUnavailable {
                backend: "oxc",
                feature: "oxc",
                alternative: Backend::TreeSitter.name(),
            }),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read `path` from disk and parse it with `backend`.
///
/// # Errors
/// [`AnalysisError::Read`] on I/O failure (including non-UTF-8 content), otherwise
/// whatever the backend reports.
pub fn parse_file(backend: &dyn SyntaxBackend, path: &Path) -> Result<SyntaxTree> {
    let source = std::fs::read_to_string(path).map_err(|source| AnalysisError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    backend.parse(path, &source)
}
