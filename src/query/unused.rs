use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Deserialize;

use crate::extract::ImportedNames;
use crate::graph::DependencyGraph;

/// How export usage is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnusedExportMode {
    /// A file imported by any other file has all of its exports counted as used.
    #[default]
    File,
    /// Each export name is tracked separately.
    Symbol,
}

/// Exports no other file consumes, keyed by file. Files with nothing unused are omitted.
///
/// `default` is never reported. Self-imports do not count as usage.
pub fn find_unused_exports(
    graph: &DependencyGraph,
    mode: UnusedExportMode,
) -> BTreeMap<PathBuf, BTreeSet<String>> {
    let mut unused = BTreeMap::new();

    for idx in graph.sorted_files() {
        let file = graph.file(idx);
        let importers: Vec<&ImportedNames> = graph
            .importer_edges(idx)
            .into_iter()
            .filter(|(from, _)| *from != idx)
            .map(|(_, edge)| &edge.names)
            .collect();

        let names: BTreeSet<String> = match mode {
            UnusedExportMode::File if !importers.is_empty() => continue,
            UnusedExportMode::File => file
                .exports
                .iter()
                .filter(|name| *name != "default")
                .cloned()
                .collect(),
            UnusedExportMode::Symbol => file
                .exports
                .iter()
                .filter(|name| *name != "default")
                .filter(|name| !importers.iter().any(|used| used.uses(name)))
                .cloned()
                .collect(),
        };

        if !names.is_empty() {
            unused.insert(file.path.clone(), names);
        }
    }

    unused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExportSet, ImportKind};
    use crate::graph::edge::ImportEdge;

    fn exports(names: &[&str]) -> ExportSet {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    fn names(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    /// main.ts imports `used` from lib.ts; orphan.ts is imported by nobody.
    fn fixture() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        let main = graph.add_file(PathBuf::from("/p/main.ts"), exports(&[]));
        let lib = graph.add_file(
            PathBuf::from("/p/lib.ts"),
            exports(&["used", "unused", "default"]),
        );
        graph.add_file(PathBuf::from("/p/orphan.ts"), exports(&["lonely", "default"]));
        graph.add_import(
            main,
            lib,
            ImportEdge {
                specifier: "./lib".into(),
                kind: ImportKind::Static,
                names: ImportedNames::Names(names(&["used"])),
            },
        );
        graph
    }

    #[test]
    fn test_file_mode_reports_only_unimported_files() {
        let unused = find_unused_exports(&fixture(), UnusedExportMode::File);
        assert_eq!(
            unused,
            BTreeMap::from([(PathBuf::from("/p/orphan.ts"), names(&["lonely"]))])
        );
    }

    #[test]
    fn test_symbol_mode_tracks_each_name() {
        let unused = find_unused_exports(&fixture(), UnusedExportMode::Symbol);
        assert_eq!(
            unused,
            BTreeMap::from([
                (PathBuf::from("/p/lib.ts"), names(&["unused"])),
                (PathBuf::from("/p/orphan.ts"), names(&["lonely"])),
            ])
        );
    }

    #[test]
    fn test_symbol_mode_namespace_import_uses_everything() {
        let mut graph = fixture();
        let main = graph.index_of(&PathBuf::from("/p/orphan.ts")).unwrap();
        let lib = graph.index_of(&PathBuf::from("/p/lib.ts")).unwrap();
        graph.add_import(
            main,
            lib,
            ImportEdge {
                specifier: "./lib".into(),
                kind: ImportKind::Dynamic,
                names: ImportedNames::All,
            },
        );
        let unused = find_unused_exports(&graph, UnusedExportMode::Symbol);
        assert!(!unused.contains_key(&PathBuf::from("/p/lib.ts")));
    }

    #[test]
    fn test_self_import_does_not_count() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_file(PathBuf::from("/p/a.ts"), exports(&["x"]));
        graph.add_import(
            a,
            a,
            ImportEdge {
                specifier: "./a".into(),
                kind: ImportKind::Static,
                names: ImportedNames::All,
            },
        );
        let unused = find_unused_exports(&graph, UnusedExportMode::File);
        assert_eq!(unused.get(&PathBuf::from("/p/a.ts")), Some(&names(&["x"])));
    }
}
