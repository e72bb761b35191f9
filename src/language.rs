use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extensions probed by the resolver and discovered by the walker, in priority order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".ts", ".jsx", ".tsx", ".mjs", ".cjs"];

/// Owned copy of [`DEFAULT_EXTENSIONS`].
pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_owned()).collect()
}

/// The grammar a source file is parsed with.
///
/// Uses a plain enum (not trait objects): cheap to copy and pattern-matched at
/// the backend dispatch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// `.ts`, `.mts`, `.cts`
    TypeScript,
    /// `.tsx`
    Tsx,
    /// `.js`, `.jsx`, `.mjs`, `.cjs`
    JavaScript,
}

impl Dialect {
    /// Pick the grammar for a file by its extension, or `None` when no backend can parse it.
    ///
    /// `.ts` and `.tsx` MUST map to different grammars: the TypeScript grammar cannot
    /// parse JSX, and the TSX grammar rejects angle-bracket type assertions (`<T>expr`).
    pub fn for_path(path: &Path) -> Option<Dialect> {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
            "ts" | "mts" | "cts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            "js" | "jsx" | "mjs" | "cjs" => Some(Dialect::JavaScript),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
            Dialect::JavaScript => "javascript",
        }
    }
}

/// Normalise a user-supplied extension to the dotted form (`ts` -> `.ts`).
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_owned()
    } else {
        format!(".{ext}")
    }
}

/// Returns true if `path`'s file name ends with one of `extensions` (dotted form).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    extensions
        .iter()
        .any(|ext| name.len() > ext.len() && name.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_for_path() {
        assert_eq!(Dialect::for_path(Path::new("a.ts")), Some(Dialect::TypeScript));
        assert_eq!(Dialect::for_path(Path::new("a.mts")), Some(Dialect::TypeScript));
        assert_eq!(Dialect::for_path(Path::new("a.tsx")), Some(Dialect::Tsx));
        assert_eq!(Dialect::for_path(Path::new("a.jsx")), Some(Dialect::JavaScript));
        assert_eq!(Dialect::for_path(Path::new("a.cjs")), Some(Dialect::JavaScript));
        assert_eq!(Dialect::for_path(Path::new("a.vue")), None);
        assert_eq!(Dialect::for_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("ts"), ".ts");
        assert_eq!(normalize_extension(".tsx"), ".tsx");
        assert_eq!(normalize_extension(" vue "), ".vue");
    }

    #[test]
    fn test_has_extension() {
        let exts = default_extensions();
        assert!(has_extension(Path::new("/p/a.ts"), &exts));
        assert!(has_extension(Path::new("/p/a.test.tsx"), &exts));
        assert!(!has_extension(Path::new("/p/a.json"), &exts));
        assert!(!has_extension(Path::new("/p/.ts"), &exts));
        assert!(!has_extension(Path::new("/p/foo.service"), &exts));
    }
}
