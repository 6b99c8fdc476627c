use tracing_subscriber::EnvFilter;

/// Install the default fmt subscriber. Honours `RUST_LOG`, falls back to `info`.
///
/// Calling this twice is harmless: the second install is ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .try_init();
}
