use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV: &str = "INCAST_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn build_filter(configured: Option<String>, verbose: bool) -> EnvFilter {
    let fallback = default_directive(verbose);
    configured.map_or_else(
        || EnvFilter::new(fallback),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(fallback)),
    )
}

/// Installs the global subscriber. Log lines go to stderr so the report on
/// stdout stays machine-readable.
pub fn init_logging(verbose: bool, no_color: bool) {
    let configured = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(configured, verbose))
        .with_ansi(!no_color)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
