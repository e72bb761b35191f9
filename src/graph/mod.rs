pub mod build;
pub mod edge;
pub mod node;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Directed;

use crate::extract::ExportSet;

use edge::ImportEdge;
use node::FileNode;

/// The file-level dependency graph of one directory: a directed petgraph
/// StableGraph with O(1) path lookup.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph.
    pub graph: StableGraph<FileNode, ImportEdge, Directed>,
    /// Maps file paths to their node indices for O(1) lookup.
    pub file_index: HashMap<PathBuf, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file node. If the file has already been added, returns the existing index.
    pub fn add_file(&mut self, path: PathBuf, exports: ExportSet) -> NodeIndex {
        if let Some(&existing) = self.file_index.get(&path) {
            return existing;
        }
        let idx = self.graph.add_node(FileNode::new(path.clone(), exports));
        self.file_index.insert(path, idx);
        idx
    }

    /// Add an import edge `from -> to`. A second edge between the same pair is ignored.
    pub fn add_import(&mut self, from: NodeIndex, to: NodeIndex, edge: ImportEdge) {
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, edge);
        }
    }

    pub fn index_of(&self, path: &Path) -> Option<NodeIndex> {
        self.file_index.get(path).copied()
    }

    pub fn file(&self, idx: NodeIndex) -> &FileNode {
        &self.graph[idx]
    }

    pub fn path(&self, idx: NodeIndex) -> &Path {
        &self.graph[idx].path
    }

    /// Number of file nodes.
    pub fn file_count(&self) -> usize {
        self.file_index.len()
    }

    /// Number of import edges.
    pub fn import_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All file nodes ordered by path.
    pub fn sorted_files(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        nodes.sort_by(|a, b| self.path(*a).cmp(self.path(*b)));
        nodes
    }

    /// Files `idx` imports, ordered by path.
    pub fn imports_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_sorted(idx, Direction::Outgoing)
    }

    /// Outgoing edges of `idx` with their targets, ordered by target path.
    pub fn import_edges(&self, idx: NodeIndex) -> Vec<(NodeIndex, &ImportEdge)> {
        let mut edges: Vec<(NodeIndex, &ImportEdge)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect();
        edges.sort_by(|a, b| self.path(a.0).cmp(self.path(b.0)));
        edges
    }

    /// Incoming edges of `idx` with their sources, ordered by source path.
    pub fn importer_edges(&self, idx: NodeIndex) -> Vec<(NodeIndex, &ImportEdge)> {
        let mut edges: Vec<(NodeIndex, &ImportEdge)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
            .collect();
        edges.sort_by(|a, b| self.path(a.0).cmp(self.path(b.0)));
        edges
    }

    fn neighbors_sorted(&self, idx: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        nodes.sort_by(|a, b| self.path(*a).cmp(self.path(*b)));
        nodes.dedup();
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ImportKind, ImportedNames};

    fn edge(specifier: &str) -> ImportEdge {
        ImportEdge {
            specifier: specifier.to_owned(),
            kind: ImportKind::Static,
            names: ImportedNames::All,
        }
    }

    #[test]
    fn test_add_duplicate_file_returns_same_index() {
        let mut graph = DependencyGraph::new();
        let idx1 = graph.add_file(PathBuf::from("/p/app.ts"), ExportSet::new());
        let idx2 = graph.add_file(PathBuf::from("/p/app.ts"), ExportSet::new());
        assert_eq!(idx1, idx2, "duplicate add_file should return the same index");
        assert_eq!(graph.file_count(), 1);
        assert_eq!(graph.file(idx1).language, Some("typescript"));
    }

    #[test]
    fn test_neighbors_are_sorted_by_path() {
        let mut graph = DependencyGraph::new();
        let main = graph.add_file(PathBuf::from("/p/main.ts"), ExportSet::new());
        let z = graph.add_file(PathBuf::from("/p/z.ts"), ExportSet::new());
        let a = graph.add_file(PathBuf::from("/p/a.ts"), ExportSet::new());
        graph.add_import(main, z, edge("./z"));
        graph.add_import(main, a, edge("./a"));
        graph.add_import(main, a, edge("./a.ts"));

        assert_eq!(graph.imports_of(main), vec![a, z]);
        assert_eq!(
            graph.importer_edges(a).iter().map(|(from, _)| *from).collect::<Vec<_>>(),
            vec![main]
        );
        assert_eq!(graph.import_count(), 2, "duplicate edge must be ignored");
        assert_eq!(graph.import_edges(main)[0].1.specifier, "./a");
        assert_eq!(graph.sorted_files(), vec![a, main, z]);
    }
}
