//! Telemetry helpers for structured logging.

use tracing_subscriber::EnvFilter;

/// Install the default subscriber on stderr, unless one is already set.
///
/// `RUST_LOG` wins when present. Otherwise the filter is `debug` when
/// `verbose` is set and `info` when not. Stdout is reserved for the bar
/// protocol.
pub fn init_tracing(verbose: bool) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
