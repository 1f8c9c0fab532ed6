use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "show_directory=info";

/// Installs the global fmt subscriber. `RUST_LOG` wins over the configured filter.
/// Calling it twice is harmless; the second install is ignored.
pub fn init(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
