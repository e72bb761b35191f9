use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::language::has_extension;

/// The outcome of resolving a single import specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Resolved to a canonical absolute path of an existing file.
    Resolved(PathBuf),
    /// A bare package specifier (`react`, `@scope/pkg`, `node:fs`). Skipped, not an error.
    External(String),
    /// No candidate exists on disk.
    NotFound,
}

impl ResolutionOutcome {
    pub fn resolved(self) -> Option<PathBuf> {
        match self {
            ResolutionOutcome::Resolved(path) => Some(path),
            _ => None,
        }
    }
}

/// True for `./x`, `../x`, `/x`, `.` and `..`: specifiers that name a file.
pub fn is_path_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// Lexically join `specifier` onto `base_dir`. No filesystem access.
pub fn join_specifier(base_dir: &Path, specifier: &str) -> PathBuf {
    base_dir.join(specifier).clean()
}

/// Candidate paths for `bare`, in probe order.
///
/// A path that already carries one of `extensions` is its only candidate.
/// Otherwise: the bare path, then `bare + ext` for each extension, then
/// `bare/index + ext` for each extension.
pub fn candidate_paths(bare: &Path, extensions: &[String]) -> Vec<PathBuf> {
    if has_extension(bare, extensions) {
        return vec![bare.to_path_buf()];
    }

    let mut candidates = Vec::with_capacity(1 + extensions.len() * 2);
    candidates.push(bare.to_path_buf());
    for ext in extensions {
        let mut with_ext = bare.as_os_str().to_owned();
        with_ext.push(ext);
        candidates.push(PathBuf::from(with_ext));
    }
    for ext in extensions {
        candidates.push(bare.join(format!("index{ext}")));
    }
    candidates
}
