use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use esgraph::extract::{ImportKind, ImportedNames};
use esgraph::{Cycle, DependencyGraph, ExportSet, ProjectStats, ResolvedImports};

use crate::cli::GraphFormat;

/// Display `path` relative to `root` when it lies below it.
fn rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_exports(exports: &ExportSet, json: bool) -> Result<()> {
    if json {
        return print_json(exports);
    }
    for name in exports {
        println!("export {name}");
    }
    println!("{} exports found", exports.len());
    Ok(())
}

pub fn format_imports(imports: &ResolvedImports, root: &Path, json: bool) -> Result<()> {
    if json {
        let files: Vec<serde_json::Value> = imports
            .files
            .iter()
            .map(|(path, import)| {
                serde_json::json!({
                    "file": rel(path, root),
                    "specifier": import.specifier,
                    "kind": import.kind,
                    "names": import.names,
                })
            })
            .collect();
        return print_json(&serde_json::json!({
            "files": files,
            "external": imports.external,
            "unresolved": imports.unresolved,
        }));
    }

    for (path, import) in &imports.files {
        println!(
            "{} {} ({})",
            kind_label(import.kind),
            rel(path, root),
            import.specifier
        );
    }
    for package in &imports.external {
        println!("external {package}");
    }
    for specifier in &imports.unresolved {
        println!("unresolved {specifier}");
    }
    println!(
        "{} files, {} external, {} unresolved",
        imports.files.len(),
        imports.external.len(),
        imports.unresolved.len()
    );
    Ok(())
}

fn kind_label(kind: ImportKind) -> &'static str {
    match kind {
        ImportKind::Static => "import",
        ImportKind::Dynamic => "dynamic",
        ImportKind::ReExport => "reexport",
    }
}

/// Print a flat list of files, with `noun` in the trailing count line.
pub fn format_paths<'a>(
    paths: impl IntoIterator<Item = &'a PathBuf>,
    root: &Path,
    noun: &str,
    json: bool,
) -> Result<()> {
    let paths: Vec<String> = paths.into_iter().map(|p| rel(p, root)).collect();
    if json {
        return print_json(&paths);
    }
    for path in &paths {
        println!("{path}");
    }
    println!("{} {noun}", paths.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// Graph output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GraphReport {
    files: Vec<GraphFile>,
    edges: Vec<GraphEdge>,
}

#[derive(Serialize)]
struct GraphFile {
    path: String,
    language: Option<&'static str>,
    exports: ExportSet,
}

#[derive(Serialize)]
struct GraphEdge {
    from: String,
    to: String,
    specifier: String,
    kind: ImportKind,
    names: ImportedNames,
}

fn graph_report(graph: &DependencyGraph, root: &Path) -> GraphReport {
    let mut files = Vec::new();
    let mut edges = Vec::new();
    for idx in graph.sorted_files() {
        let file = graph.file(idx);
        files.push(GraphFile {
            path: rel(&file.path, root),
            language: file.language,
            exports: file.exports.clone(),
        });
        for (target, edge) in graph.import_edges(idx) {
            edges.push(GraphEdge {
                from: rel(&file.path, root),
                to: rel(graph.path(target), root),
                specifier: edge.specifier.clone(),
                kind: edge.kind,
                names: edge.names.clone(),
            });
        }
    }
    GraphReport { files, edges }
}

pub fn format_graph(graph: &DependencyGraph, root: &Path, format: &GraphFormat) -> Result<()> {
    match format {
        GraphFormat::Json => print_json(&graph_report(graph, root)),
        GraphFormat::Text => {
            for idx in graph.sorted_files() {
                let from = rel(graph.path(idx), root);
                for (target, edge) in graph.import_edges(idx) {
                    println!(
                        "{from} -> {} [{}]",
                        rel(graph.path(target), root),
                        kind_label(edge.kind)
                    );
                }
            }
            println!(
                "{} files, {} imports",
                graph.file_count(),
                graph.import_count()
            );
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Whole-project reports
// ---------------------------------------------------------------------------

fn cycle_strings(cycles: &[Cycle], root: &Path) -> Vec<Vec<String>> {
    cycles
        .iter()
        .map(|cycle| cycle.iter().map(|p| rel(p, root)).collect())
        .collect()
}

pub fn format_cycles(cycles: &[Cycle], root: &Path, json: bool) -> Result<()> {
    let cycles = cycle_strings(cycles, root);
    if json {
        return print_json(&cycles);
    }
    for cycle in &cycles {
        println!("cycle {}", cycle.join(" -> "));
    }
    println!("{} cycles found", cycles.len());
    Ok(())
}

pub fn format_unused(
    unused: &BTreeMap<PathBuf, BTreeSet<String>>,
    root: &Path,
    json: bool,
) -> Result<()> {
    if json {
        let by_file: BTreeMap<String, &BTreeSet<String>> = unused
            .iter()
            .map(|(path, names)| (rel(path, root), names))
            .collect();
        return print_json(&by_file);
    }
    let mut total = 0;
    for (path, names) in unused {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        println!("{} {}", rel(path, root), names.join(", "));
        total += names.len();
    }
    println!("{total} unused exports in {} files", unused.len());
    Ok(())
}

pub fn format_check(stats: &ProjectStats, cycles: &[Cycle], root: &Path, json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "stats": stats,
            "cycles": cycle_strings(cycles, root),
        }));
    }
    println!("backend {}", stats.backend);
    println!("files {}", stats.file_count);
    println!(
        "imports {} external {} unresolved {}",
        stats.import_edges, stats.external_packages, stats.unresolved_imports,
    );
    println!(
        "exports {} (avg {:.2} per file, avg {:.2} imports per file)",
        stats.export_count, stats.avg_exports_per_file, stats.avg_imports_per_file,
    );
    println!(
        "cache exports {} imports {} resolutions {} candidates {}",
        stats.cache.exports,
        stats.cache.imports,
        stats.cache.path_resolution,
        stats.cache.candidate_resolution,
    );
    for cycle in cycle_strings(cycles, root) {
        println!("cycle {}", cycle.join(" -> "));
    }
    println!("{} cycles found", cycles.len());
    Ok(())
}
