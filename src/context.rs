use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheStats, ModuleCache, ResolvedImports};
use crate::config::{AnalysisOptions, EsGraphConfig};
use crate::error::{AnalysisError, Result};
use crate::extract::{ExportSet, ImportKind, ModuleSummary, summarize};
use crate::graph::DependencyGraph;
use crate::parser::{SyntaxBackend, parse_file};
use crate::query::{circular::Cycle, deps, related, stats::ProjectStats};
use crate::resolver::{PathResolver, ResolutionOutcome};

/// One analysis session: configuration, syntax backend, path resolver and
/// per-file caches. Every public operation is a method on this type.
///
/// Independent contexts share nothing, so concurrent analyses (tests, tools
/// embedding the library) never see each other's cache entries. A context is
/// `Send + Sync` and can be shared across threads behind an `Arc`.
pub struct AnalysisContext {
    options: AnalysisOptions,
    backend: Arc<dyn SyntaxBackend>,
    resolver: PathResolver,
    cache: ModuleCache,
}

impl std::fmt::Debug for AnalysisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("options", &self.options)
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

impl AnalysisContext {
    /// Create a context with empty caches.
    ///
    /// # Errors
    /// [`AnalysisError::BackendUnavailable`] when the selected backend was compiled out.
    pub fn new(options: AnalysisOptions) -> Result<Self> {
        let backend = options.backend.instantiate()?;
        let resolver = PathResolver::new(options.extensions.clone());
        debug!(backend = backend.name(), extensions = ?options.extensions, "analysis context created");
        Ok(Self {
            options,
            backend,
            resolver,
            cache: ModuleCache::new(),
        })
    }

    /// Create a context configured by `esgraph.toml` in `root`, if present.
    pub fn for_root(root: &Path) -> Result<Self> {
        Self::new(EsGraphConfig::load(root).into_options())
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    // -----------------------------------------------------------------------
    // Cached per-file data
    // -----------------------------------------------------------------------

    /// Resolve a directly named input file or fail with [`AnalysisError::Unresolved`].
    pub(crate) fn resolve_input(&self, path: &Path) -> Result<PathBuf> {
        match self.resolver.resolve_path(path) {
            ResolutionOutcome::Resolved(resolved) => Ok(resolved),
            _ => Err(AnalysisError::Unresolved {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parse summary of a canonical path, through the cache.
    pub(crate) fn module_summary(&self, path: &Path) -> Result<Arc<ModuleSummary>> {
        self.cache.summary(path, || -> Result<ModuleSummary> {
            let tree = parse_file(self.backend.as_ref(), path)?;
            let summary = summarize(&tree);
            debug!(
                file = %path.display(),
                exports = summary.exports.len(),
                imports = summary.imports.len(),
                "parsed"
            );
            Ok(summary)
        })
    }

    /// Resolved imports of a canonical path, through the cache.
    pub(crate) fn resolved_imports(&self, path: &Path) -> Result<Arc<ResolvedImports>> {
        self.cache
            .resolved_imports(path, || self.resolve_summary_imports(path))
    }

    fn resolve_summary_imports(&self, path: &Path) -> Result<ResolvedImports> {
        let summary = self.module_summary(path)?;
        let base = path.parent().unwrap_or(Path::new("/"));
        let mut resolved = ResolvedImports::default();

        for record in &summary.imports {
            if record.kind == ImportKind::ReExport && !self.options.follow_reexports {
                continue;
            }
            match self.resolver.resolve_specifier(&record.specifier, base) {
                ResolutionOutcome::Resolved(target) => {
                    resolved.insert(target, &record.specifier, record.kind, record.imported_names());
                }
                ResolutionOutcome::External(name) => {
                    resolved.external.insert(name);
                }
                ResolutionOutcome::NotFound => {
                    warn!(
                        "{}: cannot resolve import '{}'",
                        path.display(),
                        record.specifier
                    );
                    resolved.unresolved.push(record.specifier.clone());
                }
            }
        }
        Ok(resolved)
    }

    // -----------------------------------------------------------------------
    // Public operations
    // -----------------------------------------------------------------------

    /// Exported names of `path` (`default` included).
    pub fn parse_exports(&self, path: &Path) -> Result<ExportSet> {
        let resolved = self.resolve_input(path)?;
        Ok(self.module_summary(&resolved)?.exports.clone())
    }

    /// Files `path` imports, resolved to canonical paths.
    pub fn parse_imports(&self, path: &Path) -> Result<Arc<ResolvedImports>> {
        let resolved = self.resolve_input(path)?;
        self.resolved_imports(&resolved)
    }

    /// Files under `dir` that import one of `files`, directly or by a symbol it exports.
    ///
    /// `extensions` overrides the configured list for discovering candidates under `dir`.
    pub fn get_related_files(
        &self,
        files: &[PathBuf],
        dir: &Path,
        extensions: Option<&[String]>,
    ) -> Result<Vec<PathBuf>> {
        related::related_files(self, files, dir, extensions)
    }

    /// Build the dependency graph of every source file under `root`.
    pub fn build_dependency_graph(
        &self,
        root: &Path,
        extensions: Option<&[String]>,
    ) -> Result<DependencyGraph> {
        crate::graph::build::build_dependency_graph(self, root, extensions)
    }

    /// Import cycles under `root`, in depth-first discovery order.
    pub fn find_circular_dependencies(&self, root: &Path) -> Result<Vec<Cycle>> {
        let graph = self.build_dependency_graph(root, None)?;
        Ok(crate::query::circular::find_cycles(&graph))
    }

    /// Exports nobody imports, per file, using the configured mode.
    pub fn find_unused_exports(&self, root: &Path) -> Result<BTreeMap<PathBuf, BTreeSet<String>>> {
        let graph = self.build_dependency_graph(root, None)?;
        Ok(crate::query::unused::find_unused_exports(
            &graph,
            self.options.unused_exports,
        ))
    }

    /// Every file reachable from `path` through imports.
    pub fn get_all_dependencies(&self, path: &Path) -> Result<BTreeSet<PathBuf>> {
        deps::all_dependencies(self, path)
    }

    /// Files under `root` that import `target`, sorted.
    pub fn get_reverse_dependencies(&self, target: &Path, root: &Path) -> Result<Vec<PathBuf>> {
        deps::reverse_dependencies(self, target, root)
    }

    /// Size and shape of the graph under `root`.
    pub fn project_stats(&self, root: &Path) -> Result<ProjectStats> {
        let graph = self.build_dependency_graph(root, None)?;
        Ok(crate::query::stats::project_stats(self, &graph))
    }

    /// Empty every cache table.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.resolver.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        let (exports, imports) = self.cache.counts();
        CacheStats {
            exports,
            imports,
            path_resolution: self.resolver.len(),
            candidate_resolution: self.resolver.candidate_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Backend;
    use std::fs;

    fn context() -> AnalysisContext {
        AnalysisContext::new(AnalysisOptions::default()).unwrap()
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnalysisContext>();
    }

    #[test]
    fn test_parse_exports_resolves_extensionless_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.ts"), "export const x = 1;\nexport default x;").unwrap();
        let ctx = context();

        let exports = ctx.parse_exports(&dir.path().join("lib")).unwrap();
        assert_eq!(exports, ExportSet::from(["default".to_owned(), "x".to_owned()]));
    }

    #[test]
    fn test_parse_exports_unresolved_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = context()
            .parse_exports(&dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Unresolved { .. }));
    }

    #[test]
    fn test_parse_exports_surfaces_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.ts"), "export const = ;").unwrap();
        let err = context().parse_exports(&dir.path().join("bad.ts")).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_parse_imports_classifies_specifiers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.ts"), "export const b = 1;").unwrap();
        fs::write(
            dir.path().join("a.ts"),
            "import { b } from './b';\nimport React from 'react';\nimport './gone';\nexport * from './b';",
        )
        .unwrap();
        let ctx = context();

        let imports = ctx.parse_imports(&dir.path().join("a.ts")).unwrap();
        let b = fs::canonicalize(dir.path().join("b.ts")).unwrap();
        assert_eq!(imports.paths().collect::<Vec<_>>(), vec![&b]);
        assert_eq!(imports.files[&b].kind, ImportKind::Static);
        assert!(imports.external.contains("react"));
        assert_eq!(imports.unresolved, vec!["./gone".to_owned()]);
    }

    #[test]
    fn test_follow_reexports_adds_reexport_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.ts"), "export const b = 1;").unwrap();
        fs::write(dir.path().join("index.ts"), "export * from './b';").unwrap();
        let ctx = AnalysisContext::new(AnalysisOptions {
            follow_reexports: true,
            ..AnalysisOptions::default()
        })
        .unwrap();

        let imports = ctx.parse_imports(&dir.path().join("index.ts")).unwrap();
        assert_eq!(imports.files.len(), 1);
        assert!(imports.files.values().all(|i| i.kind == ImportKind::ReExport));
    }

    #[test]
    fn test_clear_cache_then_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "import './b';\nexport const a = 1;").unwrap();
        fs::write(dir.path().join("b.ts"), "export const b = 1;").unwrap();
        let ctx = context();
        ctx.parse_imports(&dir.path().join("a.ts")).unwrap();
        let stats = ctx.cache_stats();
        assert!(stats.path_resolution > 0);
        assert!(stats.candidate_resolution > 0);

        ctx.clear_cache();
        assert_eq!(ctx.cache_stats(), CacheStats::default());

        ctx.parse_exports(&dir.path().join("b.ts")).unwrap();
        assert_eq!(ctx.cache_stats().exports, 1);
    }

    #[test]
    fn test_repeat_parse_exports_served_from_memo() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.ts"), "export const app = 1;").unwrap();
        let ctx = context();

        let first = ctx.parse_exports(&dir.path().join("app")).unwrap();
        let probes = ctx.resolver().probe_count();
        let second = ctx.parse_exports(&dir.path().join("app")).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.resolver().probe_count(), probes);
        assert_eq!(ctx.cache_stats().path_resolution, 1);
    }

    #[test]
    fn test_for_root_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("esgraph.toml"), "extensions = [\"ts\"]").unwrap();
        let ctx = AnalysisContext::for_root(dir.path()).unwrap();
        assert_eq!(ctx.options().extensions, vec![".ts".to_owned()]);
        assert_eq!(ctx.options().backend, Backend::TreeSitter);
    }
}
