use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::language::has_extension;

/// Canonicalise `root` and make sure it is a directory.
pub fn canonical_root(root: &Path) -> Result<PathBuf> {
    let canonical = std::fs::canonicalize(root).map_err(|err| AnalysisError::Walk {
        root: root.to_path_buf(),
        message: err.to_string(),
    })?;
    if !canonical.is_dir() {
        return Err(AnalysisError::Walk {
            root: root.to_path_buf(),
            message: "not a directory".to_owned(),
        });
    }
    Ok(canonical)
}

/// Walk `root` and collect source files, sorted by path.
///
/// Respects `.gitignore` rules, always excludes `node_modules`, applies the
/// `exclude` glob patterns and keeps only files ending in one of `extensions`.
/// Returned paths are canonical.
pub fn walk_sources(root: &Path, extensions: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let root = canonical_root(root)?;
    let patterns: Vec<glob::Pattern> = exclude
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!("ignoring invalid exclude pattern '{p}': {err}");
                None
            }
        })
        .collect();

    let walker = ignore::WalkBuilder::new(&root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(&root).unwrap_or(path);
        if is_excluded(relative, &patterns) || !has_extension(path, extensions) {
            continue;
        }

        // Symlinked files collapse onto their target.
        match std::fs::canonicalize(path) {
            Ok(canonical) => files.push(canonical),
            Err(err) => warn!("skipping {}: {err}", path.display()),
        }
    }

    files.sort();
    files.dedup();
    debug!(root = %root.display(), files = files.len(), "walk complete");
    Ok(files)
}

/// Returns true if the root-relative `path`, or any one of its components, matches an
/// exclusion pattern.
fn is_excluded(path: &Path, patterns: &[glob::Pattern]) -> bool {
    let path_str = path.to_string_lossy();
    patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|s| pattern.matches(s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::default_extensions;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_walk_returns_only_source_files_sorted() {
        let dir = tmp();
        fs::write(dir.path().join("b.ts"), "").unwrap();
        fs::write(dir.path().join("a.jsx"), "").unwrap();
        fs::write(dir.path().join("README.md"), "# Hello").unwrap();
        fs::write(dir.path().join("styles.css"), "").unwrap();

        let files = walk_sources(dir.path(), &default_extensions(), &[]).unwrap();
        assert_eq!(names(&files), vec!["a.jsx", "b.ts"]);
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn test_walk_excludes_node_modules() {
        let dir = tmp();
        let nm = dir.path().join("node_modules").join("pkg");
        fs::create_dir_all(&nm).unwrap();
        fs::write(nm.join("index.js"), "").unwrap();
        fs::write(dir.path().join("app.js"), "").unwrap();

        let files = walk_sources(dir.path(), &default_extensions(), &[]).unwrap();
        assert!(
            !files.iter().any(|f| f.to_string_lossy().contains("node_modules")),
            "should not include node_modules files"
        );
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_walk_respects_exclude_patterns() {
        let dir = tmp();
        fs::create_dir(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist").join("bundle.js"), "").unwrap();
        fs::write(dir.path().join("app.ts"), "").unwrap();
        fs::write(dir.path().join("app.spec.ts"), "").unwrap();

        let exclude = vec!["dist".to_string(), "*.spec.ts".to_string()];
        let files = walk_sources(dir.path(), &default_extensions(), &exclude).unwrap();
        assert_eq!(names(&files), vec!["app.ts"]);
    }

    #[test]
    fn test_walk_respects_gitignore_without_git() {
        let dir = tmp();
        fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        fs::create_dir(dir.path().join("generated")).unwrap();
        fs::write(dir.path().join("generated").join("api.ts"), "").unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();

        let files = walk_sources(dir.path(), &default_extensions(), &[]).unwrap();
        assert_eq!(names(&files), vec!["main.ts"]);
    }

    #[test]
    fn test_walk_custom_extensions() {
        let dir = tmp();
        fs::write(dir.path().join("App.vue"), "").unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();

        let files = walk_sources(dir.path(), &[".vue".to_string()], &[]).unwrap();
        assert_eq!(names(&files), vec!["App.vue"]);
    }

    #[test]
    fn test_missing_root_is_walk_error() {
        let dir = tmp();
        let err = walk_sources(&dir.path().join("nope"), &default_extensions(), &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::Walk { .. }));
    }
}
