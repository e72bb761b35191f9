use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use esgraph::Backend;

/// ES module graph analyzer for TypeScript/JavaScript codebases.
///
/// esgraph extracts exports and imports, resolves extensionless and directory
/// specifiers, and answers whole-project questions: import cycles, unused
/// exports, dependency closures and the files that exercise a given module.
#[derive(Parser, Debug)]
#[command(
    name = "esgraph",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Syntax backend used to parse source files. Overrides `esgraph.toml`.
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Log resolution and cache activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendArg {
    /// tree-sitter TypeScript/TSX/JavaScript grammars.
    TreeSitter,
    /// The oxc parser.
    Oxc,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::TreeSitter => Backend::TreeSitter,
            BackendArg::Oxc => Backend::Oxc,
        }
    }
}

/// Output format of the `graph` command.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum GraphFormat {
    /// One line per import edge (default).
    #[default]
    Text,
    /// Nodes and edges as a JSON document.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the names a file exports (`default` included).
    Exports {
        /// Source file; the extension may be omitted.
        file: PathBuf,
    },

    /// List the files a file imports, plus external packages and unresolved specifiers.
    Imports {
        /// Source file; the extension may be omitted.
        file: PathBuf,
    },

    /// Find the files under a directory that import any of the given files.
    ///
    /// Typically used to select the tests that exercise a set of changed modules.
    Related {
        /// Target files.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory searched for importers.
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Extensions of candidate files (comma-separated, e.g. ts,tsx).
        #[arg(long, value_delimiter = ',')]
        extensions: Vec<String>,
    },

    /// Print the file-level import graph of a directory.
    Graph {
        /// Project root.
        dir: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
    },

    /// Detect import cycles. Each cycle starts and ends with the same file.
    Circular {
        /// Project root.
        dir: PathBuf,
    },

    /// Report exports that no other file imports.
    Unused {
        /// Project root.
        dir: PathBuf,

        /// Track each exported name separately instead of whole files.
        #[arg(long)]
        per_symbol: bool,
    },

    /// List every file reachable from a file through imports.
    Deps {
        /// Source file; the extension may be omitted.
        file: PathBuf,
    },

    /// List the files under a directory that import a file directly.
    Rdeps {
        /// Target file.
        file: PathBuf,

        /// Project root.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Project overview: files, edges, exports, cycles. Exits non-zero when cycles exist.
    Check {
        /// Project root.
        dir: PathBuf,
    },
}
