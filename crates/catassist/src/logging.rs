use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "catassist=info";

/// Installs the global subscriber. `RUST_LOG` takes precedence over the default filter.
///
/// Returns an error if a global subscriber was already set.
pub fn init_logging(format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(json_layer())
            .try_init(),
    }
}

/// One JSON object per line, without the enclosing span repeated on every event.
fn json_layer<S>() -> fmt::Layer<S, JsonFields, Format<Json>> {
    fmt::layer()
        .with_target(true)
        .json()
        .with_current_span(false)
}
