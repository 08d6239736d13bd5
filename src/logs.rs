use super::*;

const DEFAULT_FILTER: &str = "warn,swimmer=info";

/// Installs the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub(crate) fn init() -> tracing_appender::non_blocking::WorkerGuard {
    let (writer, guard) = non_blocking(io::stderr());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(writer),
        )
        .with(filter)
        .init();

    guard
}
