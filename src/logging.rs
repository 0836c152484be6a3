use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "upload_guard=debug,tower_http=debug,axum::rejection=trace";

static INIT: Once = Once::new();

/// Installs the global tracing subscriber. Later calls are ignored.
pub fn init_tracing(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let registry = tracing_subscriber::registry().with(env_filter);
        match format {
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_target(true),
                )
                .init(),
            LogFormat::Text => registry
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .init(),
        }
    });
}
