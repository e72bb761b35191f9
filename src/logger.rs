use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber, writing to stderr.
///
/// `--verbose` selects `esgraph=debug`. Otherwise `RUST_LOG` applies, falling
/// back to `esgraph=warn` so skipped files and unresolved imports still show.
pub fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("esgraph=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("esgraph=warn"))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
