use std::path::PathBuf;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by analysis operations.
///
/// Directory-wide operations never return per-file `Read`/`Parse` errors: the
/// offending file is skipped and the failure is emitted as a `tracing` warning.
/// Errors on a directly named input are always returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("could not resolve file path: {}", path.display())]
    Unresolved { path: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}' with the {backend} backend: {message}", path.display())]
    Parse {
        path: PathBuf,
        backend: &'static str,
        message: String,
    },

    #[error("unsupported file extension: {}", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error(
        "the {backend} backend is not available in this build (enable the `{feature}` cargo feature) \
         - use the {alternative} backend instead"
    )]
    BackendUnavailable {
        backend: &'static str,
        feature: &'static str,
        alternative: &'static str,
    },

    #[error("cannot walk '{}': {message}", root.display())]
    Walk { root: PathBuf, message: String },
}
