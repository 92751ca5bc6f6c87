use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber filtered by `level`.
///
/// `level` accepts any `EnvFilter` directive (`info`, `gpu_stock_watcher=debug`, ...);
/// an unparseable value falls back to `info`.
pub fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
