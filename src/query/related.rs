use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::context::AnalysisContext;
use crate::error::Result;
use crate::extract::ImportKind;
use crate::language::normalize_extension;
use crate::resolver::ResolutionOutcome;
use crate::walker::walk_sources;

/// Files under `dir` that import one of `files`.
///
/// A candidate is related when one of its static or dynamic imports resolves
/// to a target, using the same candidate order and memo as every other
/// resolution. An import that resolves to a higher-priority sibling (`x.js`
/// before `x.ts`, `lib.ts` before `lib/index.ts`) is not a match for the other
/// file. A named or default import of a target is a match whether or not the
/// target still exports that name.
///
/// Targets that cannot be resolved are skipped with a warning. Candidates that
/// fail to parse are skipped too. The result is sorted.
pub fn related_files(
    ctx: &AnalysisContext,
    files: &[PathBuf],
    dir: &Path,
    extensions: Option<&[String]>,
) -> Result<Vec<PathBuf>> {
    let mut targets = BTreeSet::new();
    for file in files {
        match ctx.resolver().resolve_path(file) {
            ResolutionOutcome::Resolved(path) => {
                targets.insert(path);
            }
            _ => warn!("could not resolve file path: {}", file.display()),
        }
    }
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    let extensions: Vec<String> = match extensions {
        Some(exts) => exts.iter().map(|e| normalize_extension(e)).collect(),
        None => ctx.options().extensions.clone(),
    };
    let candidates = walk_sources(dir, &extensions, &ctx.options().exclude)?;

    let related: Vec<PathBuf> = candidates
        .par_iter()
        .filter(|candidate| is_related(ctx, candidate, &targets))
        .cloned()
        .collect();

    debug!(
        targets = targets.len(),
        candidates = candidates.len(),
        related = related.len(),
        "related files"
    );
    Ok(related)
}

fn is_related(ctx: &AnalysisContext, candidate: &Path, targets: &BTreeSet<PathBuf>) -> bool {
    let summary = match ctx.module_summary(candidate) {
        Ok(summary) => summary,
        Err(err) => {
            warn!("skipping {}: {err}", candidate.display());
            return false;
        }
    };
    let base = candidate.parent().unwrap_or(Path::new("/"));

    summary
        .imports
        .iter()
        .filter(|record| record.kind != ImportKind::ReExport)
        .any(|record| {
            matches!(
                ctx.resolver().resolve_specifier(&record.specifier, base),
                ResolutionOutcome::Resolved(path) if targets.contains(&path)
            )
        })
}
