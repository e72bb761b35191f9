use std::collections::HashMap;
use std::path::PathBuf;

use petgraph::stable_graph::NodeIndex;

use crate::graph::DependencyGraph;

/// A closed import chain. The first file is repeated at the end: a -> b -> a.
pub type Cycle = Vec<PathBuf>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS path.
    Active,
    /// Fully explored.
    Done,
}

/// Detect import cycles with a gray/black depth-first search.
///
/// Searches start from every unexplored file in path order and visit
/// neighbours in path order, so output is deterministic. When an edge reaches
/// a file on the current path, the path suffix from that file plus the file
/// again is reported. Every file is fully explored once; this reports one
/// cycle per back edge, not every simple cycle.
///
/// The search is iterative, so deep import chains cannot overflow the stack.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut marks: HashMap<NodeIndex, Mark> = HashMap::new();
    let mut cycles = Vec::new();

    for start in graph.sorted_files() {
        if marks.contains_key(&start) {
            continue;
        }

        // Each frame: a node and its sorted neighbours with a cursor.
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
        let mut path: Vec<NodeIndex> = Vec::new();

        marks.insert(start, Mark::Active);
        path.push(start);
        stack.push((start, graph.imports_of(start), 0));

        while let Some((node, neighbours, cursor)) = stack.last_mut() {
            let Some(&next) = neighbours.get(*cursor) else {
                marks.insert(*node, Mark::Done);
                path.pop();
                stack.pop();
                continue;
            };
            *cursor += 1;

            match marks.get(&next) {
                Some(Mark::Active) => {
                    let from = path.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle: Cycle = path[from..]
                        .iter()
                        .map(|&n| graph.path(n).to_path_buf())
                        .collect();
                    cycle.push(graph.path(next).to_path_buf());
                    cycles.push(cycle);
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(next, Mark::Active);
                    path.push(next);
                    stack.push((next, graph.imports_of(next), 0));
                }
            }
        }
    }

    cycles
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExportSet, ImportKind, ImportedNames};
    use crate::graph::edge::ImportEdge;

    fn graph_with(files: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for f in files {
            graph.add_file(PathBuf::from(format!("/proj/{f}")), ExportSet::new());
        }
        for (from, to) in edges {
            let from = graph.index_of(&PathBuf::from(format!("/proj/{from}"))).unwrap();
            let to = graph.index_of(&PathBuf::from(format!("/proj/{to}"))).unwrap();
            graph.add_import(
                from,
                to,
                ImportEdge {
                    specifier: "./x".into(),
                    kind: ImportKind::Static,
                    names: ImportedNames::All,
                },
            );
        }
        graph
    }

    fn p(name: &str) -> PathBuf {
        PathBuf::from(format!("/proj/{name}"))
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = graph_with(
            &["a.ts", "b.ts", "c.ts"],
            &[("a.ts", "b.ts"), ("b.ts", "c.ts"), ("a.ts", "c.ts")],
        );
        assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn test_two_file_mutual_cycle_detected() {
        let graph = graph_with(&["a.ts", "b.ts"], &[("a.ts", "b.ts"), ("b.ts", "a.ts")]);
        assert_eq!(find_cycles(&graph), vec![vec![p("a.ts"), p("b.ts"), p("a.ts")]]);
    }

    #[test]
    fn test_three_file_cycle_reports_stack_suffix() {
        let graph = graph_with(
            &["entry.ts", "a.ts", "b.ts", "c.ts"],
            &[
                ("entry.ts", "a.ts"),
                ("a.ts", "b.ts"),
                ("b.ts", "c.ts"),
                ("c.ts", "a.ts"),
            ],
        );
        // `a.ts` sorts first, so the search starts there.
        assert_eq!(
            find_cycles(&graph),
            vec![vec![p("a.ts"), p("b.ts"), p("c.ts"), p("a.ts")]]
        );
    }

    #[test]
    fn test_self_import_is_length_one_cycle() {
        let graph = graph_with(&["self.ts"], &[("self.ts", "self.ts")]);
        assert_eq!(find_cycles(&graph), vec![vec![p("self.ts"), p("self.ts")]]);
    }

    #[test]
    fn test_explored_nodes_are_not_re_searched() {
        // Two back edges into the same cycle from different entry points.
        let graph = graph_with(
            &["a.ts", "b.ts", "x.ts", "y.ts"],
            &[
                ("a.ts", "b.ts"),
                ("b.ts", "a.ts"),
                ("x.ts", "a.ts"),
                ("y.ts", "b.ts"),
            ],
        );
        assert_eq!(find_cycles(&graph).len(), 1);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let names: Vec<String> = (0..5000).map(|i| format!("f{i:05}.ts")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = refs.windows(2).map(|w| (w[0], w[1])).collect();
        let graph = graph_with(&refs, &edges);
        assert!(find_cycles(&graph).is_empty());
    }
}
