//! Extensionless import resolution with memoisation.
//!
//! [`PathResolver`] turns `./foo`, `../bar/index` or `./baz.ts` into the
//! canonical path of an existing file, probing candidates in a fixed order
//! (see [`file_resolver::candidate_paths`]). Every success is remembered twice:
//! under the `(base directory, specifier)` pair and under the winning candidate
//! path, so later lookups that produce the same candidate skip the filesystem.

pub mod file_resolver;

pub use file_resolver::{ResolutionOutcome, candidate_paths, is_path_specifier, join_specifier};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use path_clean::PathClean;
use tracing::debug;

#[derive(Debug, Default)]
struct ResolutionMemo {
    by_specifier: HashMap<(PathBuf, String), PathBuf>,
    by_candidate: HashMap<PathBuf, PathBuf>,
}

/// Caching resolver for relative and absolute import specifiers.
///
/// Safe to share across rayon workers. Two threads resolving the same
/// specifier at once may both probe; they always agree on the answer.
#[derive(Debug)]
pub struct PathResolver {
    extensions: Vec<String>,
    memo: RwLock<ResolutionMemo>,
    probes: AtomicUsize,
}

impl PathResolver {
    /// `extensions` are dotted (`.ts`) and tried in the given order.
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions,
            memo: RwLock::new(ResolutionMemo::default()),
            probes: AtomicUsize::new(0),
        }
    }

    /// Resolve an import specifier written in a file inside `base_dir`.
    pub fn resolve_specifier(&self, specifier: &str, base_dir: &Path) -> ResolutionOutcome {
        if !is_path_specifier(specifier) {
            return ResolutionOutcome::External(specifier.to_owned());
        }

        let key = (base_dir.to_path_buf(), specifier.to_owned());
        if let Some(hit) = self.memo.read().by_specifier.get(&key) {
            return ResolutionOutcome::Resolved(hit.clone());
        }

        let bare = join_specifier(base_dir, specifier);
        match self.resolve_bare(&bare) {
            Some(resolved) => {
                debug!(specifier, base = %base_dir.display(), resolved = %resolved.display(), "resolved");
                self.memo.write().by_specifier.insert(key, resolved.clone());
                ResolutionOutcome::Resolved(resolved)
            }
            None => ResolutionOutcome::NotFound,
        }
    }

    /// Resolve a path given on the command line or by a library caller.
    ///
    /// Relative paths are taken against the current directory. The extension
    /// rules are the same as for specifiers, so `src/app` finds `src/app.ts`.
    /// Successes are memoised under `(current directory, path)`; absolute
    /// paths use an empty base.
    pub fn resolve_path(&self, path: &Path) -> ResolutionOutcome {
        let base = if path.is_absolute() {
            PathBuf::new()
        } else {
            match std::env::current_dir() {
                Ok(cwd) => cwd,
                Err(_) => return ResolutionOutcome::NotFound,
            }
        };

        let key = (base, path.to_string_lossy().into_owned());
        if let Some(hit) = self.memo.read().by_specifier.get(&key) {
            return ResolutionOutcome::Resolved(hit.clone());
        }

        let absolute = key.0.join(path).clean();
        match self.resolve_bare(&absolute) {
            Some(resolved) => {
                self.memo.write().by_specifier.insert(key, resolved.clone());
                ResolutionOutcome::Resolved(resolved)
            }
            None => ResolutionOutcome::NotFound,
        }
    }

    /// The memoised resolution of a candidate path, if it was ever a winning candidate.
    fn memoized(&self, candidate: &Path) -> Option<PathBuf> {
        self.memo.read().by_candidate.get(candidate).cloned()
    }

    fn resolve_bare(&self, bare: &Path) -> Option<PathBuf> {
        for candidate in candidate_paths(bare, &self.extensions) {
            if let Some(hit) = self.memoized(&candidate) {
                return Some(hit);
            }
            self.probes.fetch_add(1, Ordering::Relaxed);
            if !candidate.is_file() {
                continue;
            }
            let Ok(canonical) = std::fs::canonicalize(&candidate) else {
                continue;
            };
            self.memo
                .write()
                .by_candidate
                .insert(candidate, canonical.clone());
            return Some(canonical);
        }
        None
    }

    /// Number of filesystem existence checks performed so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    /// Number of memoised `(base, specifier)` resolutions, input paths included.
    pub fn len(&self) -> usize {
        self.memo.read().by_specifier.len()
    }

    /// Number of memoised winning candidate paths.
    pub fn candidate_len(&self) -> usize {
        self.memo.read().by_candidate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every memoised resolution.
    pub fn clear(&self) {
        *self.memo.write() = ResolutionMemo::default();
    }
}
