// Logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,helpdesk=trace,tokio_postgres=info,reqwest=info,hyper=info"
    } else {
        "info,tokio_postgres=warn,reqwest=warn,hyper=warn"
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// one JSON object per line.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter()))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
