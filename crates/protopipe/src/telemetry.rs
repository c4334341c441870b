use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with the requested filter and bridge `log` records.
///
/// - `directives` is the level string from the command line (e.g., "info",
///   "debug,rdkafka=trace"). Unparseable directives fall back to "info".
/// - Forwards `log` crate records to `tracing` via `LogTracer`. librdkafka
///   emits through `log`, so broker internals land in the same output.
/// - Sets up a compact formatter to stdout.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(directives: &str) {
    let _ = LogTracer::init();

    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
