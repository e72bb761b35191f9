use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cache::ResolvedImports;
use crate::context::AnalysisContext;
use crate::error::Result;
use crate::extract::ModuleSummary;
use crate::language::normalize_extension;
use crate::walker::walk_sources;

use super::DependencyGraph;
use super::edge::ImportEdge;

/// Walk `root`, parse and resolve every source file through the context cache,
/// and assemble the file graph.
///
/// Files are processed in parallel; nodes are inserted in sorted path order so
/// the graph is identical across runs. A file that fails to read or parse is
/// skipped with a warning. Imports of files outside the walked set do not
/// become edges.
pub fn build_dependency_graph(
    ctx: &AnalysisContext,
    root: &Path,
    extensions: Option<&[String]>,
) -> Result<DependencyGraph> {
    let extensions: Vec<String> = match extensions {
        Some(exts) => exts.iter().map(|e| normalize_extension(e)).collect(),
        None => ctx.options().extensions.clone(),
    };
    let files = walk_sources(root, &extensions, &ctx.options().exclude)?;

    let analysed: Vec<(PathBuf, Arc<ModuleSummary>, Arc<ResolvedImports>)> = files
        .par_iter()
        .filter_map(|path| {
            let result = ctx
                .module_summary(path)
                .and_then(|summary| Ok((summary, ctx.resolved_imports(path)?)));
            match result {
                Ok((summary, imports)) => Some((path.clone(), summary, imports)),
                Err(err) => {
                    warn!("skipping {}: {err}", path.display());
                    None
                }
            }
        })
        .collect();

    let mut graph = DependencyGraph::new();
    for (path, summary, _) in &analysed {
        graph.add_file(path.clone(), summary.exports.clone());
    }

    for (path, _, imports) in &analysed {
        let Some(from) = graph.index_of(path) else {
            continue;
        };
        for (target, import) in &imports.files {
            if let Some(to) = graph.index_of(target) {
                graph.add_import(from, to, ImportEdge::from(import));
            }
        }
    }

    debug!(
        root = %root.display(),
        files = graph.file_count(),
        edges = graph.import_count(),
        skipped = files.len() - analysed.len(),
        "dependency graph built"
    );
    Ok(graph)
}
