//! ES module graph analysis for TypeScript and JavaScript source trees.
//!
//! Create an [`AnalysisContext`], then ask it for a file's exports and imports,
//! the files related to a set of targets, import cycles, unused exports or the
//! dependency closure of a file:
//!
//! ```no_run
//! use std::path::Path;
//! use esgraph::{AnalysisContext, AnalysisOptions};
//!
//! let ctx = AnalysisContext::new(AnalysisOptions::default())?;
//! for cycle in ctx.find_circular_dependencies(Path::new("src"))? {
//!     println!("{cycle:?}");
//! }
//! # Ok::<(), esgraph::AnalysisError>(())
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod graph;
pub mod language;
pub mod parser;
pub mod query;
pub mod resolver;
pub mod walker;

pub use cache::{CacheStats, ResolvedImport, ResolvedImports};
pub use config::{AnalysisOptions, EsGraphConfig};
pub use context::AnalysisContext;
pub use error::{AnalysisError, Result};
pub use extract::{ExportSet, ImportKind, ImportedNames};
pub use graph::DependencyGraph;
pub use parser::Backend;
pub use query::circular::Cycle;
pub use query::stats::ProjectStats;
pub use query::unused::UnusedExportMode;
pub use resolver::{PathResolver, ResolutionOutcome};
