use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;

/// Install the global `fmt` subscriber. Output goes to stderr so that
/// command output on stdout stays clean. Calling it twice is a no-op.
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let logging_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let subscriber = tracing_subscriber::Registry::default().with(logging_layer);
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
