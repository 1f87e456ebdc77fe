use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber.
///
/// Log level comes from `RUST_LOG` (defaults to `info`). Output goes to
/// stderr so command output on stdout stays clean.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
