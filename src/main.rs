mod cli;
mod logger;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use esgraph::{AnalysisContext, EsGraphConfig, UnusedExportMode};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    let cwd = std::env::current_dir().context("cannot read the current directory")?;

    match &cli.command {
        Commands::Exports { file } => {
            let ctx = open_context(&cli, &cwd, false)?;
            let exports = ctx.parse_exports(file)?;
            output::format_exports(&exports, cli.json)?;
        }

        Commands::Imports { file } => {
            let ctx = open_context(&cli, &cwd, false)?;
            let imports = ctx.parse_imports(file)?;
            output::format_imports(&imports, &display_root(&cwd), cli.json)?;
        }

        Commands::Related {
            files,
            dir,
            extensions,
        } => {
            let ctx = open_context(&cli, dir, false)?;
            let extensions = (!extensions.is_empty()).then_some(extensions.as_slice());
            let related = ctx.get_related_files(files, dir, extensions)?;
            output::format_paths(&related, &display_root(dir), "related files", cli.json)?;
        }

        Commands::Graph { dir, format } => {
            let ctx = open_context(&cli, dir, false)?;
            let graph = ctx.build_dependency_graph(dir, None)?;
            output::format_graph(&graph, &display_root(dir), format)?;
        }

        Commands::Circular { dir } => {
            let ctx = open_context(&cli, dir, false)?;
            let cycles = ctx.find_circular_dependencies(dir)?;
            output::format_cycles(&cycles, &display_root(dir), cli.json)?;
        }

        Commands::Unused { dir, per_symbol } => {
            let ctx = open_context(&cli, dir, *per_symbol)?;
            let unused = ctx.find_unused_exports(dir)?;
            output::format_unused(&unused, &display_root(dir), cli.json)?;
        }

        Commands::Deps { file } => {
            let ctx = open_context(&cli, &cwd, false)?;
            let deps = ctx.get_all_dependencies(file)?;
            output::format_paths(&deps, &display_root(&cwd), "dependencies", cli.json)?;
        }

        Commands::Rdeps { file, dir } => {
            let ctx = open_context(&cli, dir, false)?;
            let importers = ctx.get_reverse_dependencies(file, dir)?;
            output::format_paths(&importers, &display_root(dir), "importers", cli.json)?;
        }

        Commands::Check { dir } => {
            let ctx = open_context(&cli, dir, false)?;
            let cycles = ctx.find_circular_dependencies(dir)?;
            let stats = ctx.project_stats(dir)?;
            output::format_check(&stats, &cycles, &display_root(dir), cli.json)?;
            if !cycles.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Build a context from `esgraph.toml` in `config_root`, with command-line overrides applied.
fn open_context(cli: &Cli, config_root: &Path, per_symbol: bool) -> Result<AnalysisContext> {
    let mut options = EsGraphConfig::load(config_root).into_options();
    if let Some(backend) = cli.backend {
        options.backend = backend.into();
    }
    if per_symbol {
        options.unused_exports = UnusedExportMode::Symbol;
    }
    Ok(AnalysisContext::new(options)?)
}

/// Canonical form of `dir`, used to print paths relative to it.
fn display_root(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}
