use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::language::{default_extensions, normalize_extension};
use crate::parser::Backend;
use crate::query::unused::UnusedExportMode;

/// Name of the optional configuration file at the analysed root.
pub const CONFIG_FILE: &str = "esgraph.toml";

/// Configuration loaded from `esgraph.toml`. Every field is optional.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EsGraphConfig {
    /// Glob patterns to exclude from directory walks (beyond .gitignore and node_modules).
    pub exclude: Option<Vec<String>>,
    /// Extensions to probe and discover, in priority order. `ts` and `.ts` both work.
    pub extensions: Option<Vec<String>>,
    pub backend: Option<Backend>,
    pub unused_exports: Option<UnusedExportMode>,
    /// Treat `export ... from` sources as dependencies.
    pub follow_reexports: Option<bool>,
}

impl EsGraphConfig {
    /// Load configuration from `esgraph.toml` in the given root directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Fill every unset field with its default.
    pub fn into_options(self) -> AnalysisOptions {
        let defaults = AnalysisOptions::default();
        AnalysisOptions {
            backend: self.backend.unwrap_or(defaults.backend),
            extensions: self
                .extensions
                .map(|exts| exts.iter().map(|e| normalize_extension(e)).collect())
                .unwrap_or(defaults.extensions),
            exclude: self.exclude.unwrap_or(defaults.exclude),
            unused_exports: self.unused_exports.unwrap_or(defaults.unused_exports),
            follow_reexports: self.follow_reexports.unwrap_or(defaults.follow_reexports),
        }
    }
}

/// Settings of one analysis context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub backend: Backend,
    /// Dotted extensions in probe order.
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub unused_exports: UnusedExportMode,
    pub follow_reexports: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            extensions: default_extensions(),
            exclude: Vec::new(),
            unused_exports: UnusedExportMode::default(),
            follow_reexports: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(EsGraphConfig::load(dir.path()), EsGraphConfig::default());
        assert_eq!(
            EsGraphConfig::default().into_options(),
            AnalysisOptions::default()
        );
    }

    #[test]
    fn test_full_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
exclude = ["dist", "*.spec.ts"]
extensions = ["ts", ".tsx", "vue"]
backend = "oxc"
unused_exports = "symbol"
follow_reexports = true
"#,
        )
        .unwrap();

        let options = EsGraphConfig::load(dir.path()).into_options();
        assert_eq!(options.backend, Backend::Oxc);
        assert_eq!(options.extensions, vec![".ts", ".tsx", ".vue"]);
        assert_eq!(options.exclude, vec!["dist", "*.spec.ts"]);
        assert_eq!(options.unused_exports, UnusedExportMode::Symbol);
        assert!(options.follow_reexports);
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "backend = 42").unwrap();
        assert_eq!(EsGraphConfig::load(dir.path()), EsGraphConfig::default());
    }
}
