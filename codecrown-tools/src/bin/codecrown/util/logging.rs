use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// Filtering is controlled through `RUST_LOG`; by default only warnings and
/// errors are shown. Log output goes to stderr so it cannot mix with
/// dumped data on stdout.
pub fn setup() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
