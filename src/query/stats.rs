use std::collections::BTreeSet;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::context::AnalysisContext;
use crate::graph::DependencyGraph;

/// Aggregated project statistics derived from the dependency graph.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStats {
    /// Syntax backend that parsed the files.
    pub backend: &'static str,
    pub file_count: usize,
    pub import_edges: usize,
    pub export_count: usize,
    /// Distinct bare package specifiers.
    pub external_packages: usize,
    /// Path specifiers that matched no file.
    pub unresolved_imports: usize,
    pub avg_imports_per_file: f64,
    pub avg_exports_per_file: f64,
    pub cache: CacheStats,
}

/// Compute project statistics from a built `DependencyGraph`.
pub fn project_stats(ctx: &AnalysisContext, graph: &DependencyGraph) -> ProjectStats {
    let file_count = graph.file_count();
    let import_edges = graph.import_count();
    let export_count: usize = graph
        .graph
        .node_weights()
        .map(|file| file.exports.len())
        .sum();

    let mut external = BTreeSet::new();
    let mut unresolved_imports = 0usize;
    for file in graph.graph.node_weights() {
        if let Ok(imports) = ctx.resolved_imports(&file.path) {
            external.extend(imports.external.iter().cloned());
            unresolved_imports += imports.unresolved.len();
        }
    }

    let per_file = |n: usize| {
        if file_count == 0 {
            0.0
        } else {
            n as f64 / file_count as f64
        }
    };

    ProjectStats {
        backend: ctx.backend_name(),
        file_count,
        import_edges,
        export_count,
        external_packages: external.len(),
        unresolved_imports,
        avg_imports_per_file: per_file(import_edges),
        avg_exports_per_file: per_file(export_count),
        cache: ctx.cache_stats(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisOptions;
    use std::fs;

    #[test]
    fn test_project_stats_counts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.ts"),
            "import { b } from './b';\nimport React from 'react';\nimport './gone';\nexport const a = 1;",
        )
        .unwrap();
        fs::write(dir.path().join("b.ts"), "export const b = 1;\nexport default b;").unwrap();
        let ctx = AnalysisContext::new(AnalysisOptions::default()).unwrap();

        let stats = ctx.project_stats(dir.path()).unwrap();
        assert_eq!(stats.backend, "tree-sitter");
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.import_edges, 1);
        assert_eq!(stats.export_count, 3);
        assert_eq!(stats.external_packages, 1);
        assert_eq!(stats.unresolved_imports, 1);
        assert!((stats.avg_exports_per_file - 1.5).abs() < f64::EPSILON);
        assert_eq!(stats.cache.exports, 2);
    }

    #[test]
    fn test_project_stats_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AnalysisContext::new(AnalysisOptions::default()).unwrap();
        let stats = ctx.project_stats(dir.path()).unwrap();
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.avg_imports_per_file, 0.0);
    }
}
