use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Human-readable lines on stdout, filtered by `RUST_LOG` (default `info`).
/// Call once at start-up; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
