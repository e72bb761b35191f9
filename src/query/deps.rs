use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::context::AnalysisContext;
use crate::error::Result;

/// Every file reachable from `path` by following resolved imports.
///
/// The start file is part of the result only when an import chain leads back
/// to it. Transitive files that fail to parse are skipped with a warning; a
/// failure on `path` itself is returned.
pub fn all_dependencies(ctx: &AnalysisContext, path: &Path) -> Result<BTreeSet<PathBuf>> {
    let start = ctx.resolve_input(path)?;
    let direct = ctx.resolved_imports(&start)?;

    let mut found = BTreeSet::new();
    let mut expanded = BTreeSet::from([start]);
    let mut pending: Vec<PathBuf> = direct.paths().cloned().collect();

    while let Some(next) = pending.pop() {
        found.insert(next.clone());
        if !expanded.insert(next.clone()) {
            continue;
        }
        match ctx.resolved_imports(&next) {
            Ok(imports) => pending.extend(imports.paths().cloned()),
            Err(err) => warn!("skipping {}: {err}", next.display()),
        }
    }

    Ok(found)
}

/// Files under `root` whose resolved imports contain `target`, sorted.
///
/// A linear scan over the cached imports of every file under `root`, so targets
/// outside `root` work too.
pub fn reverse_dependencies(
    ctx: &AnalysisContext,
    target: &Path,
    root: &Path,
) -> Result<Vec<PathBuf>> {
    let target = ctx.resolve_input(target)?;
    let graph = ctx.build_dependency_graph(root, None)?;

    let mut importers = Vec::new();
    for idx in graph.sorted_files() {
        let file = graph.path(idx);
        // The graph build already cached these; failures were logged there.
        if let Ok(imports) = ctx.resolved_imports(file)
            && imports.contains(&target)
        {
            importers.push(file.to_path_buf());
        }
    }
    Ok(importers)
}
