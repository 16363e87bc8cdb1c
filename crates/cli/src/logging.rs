//! Tracing setup
//!
//! - `RUST_LOG` controls filtering (default: info for dealhub crates)
//! - `DEALHUB_LOG_FORMAT=json|pretty|compact` selects the stderr format
//! - `DEALHUB_LOG_DIR` additionally writes daily-rolled JSON logs there

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn,dealhub=info,dealhub_core=info,dealhub_sdk=info";

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init() -> Result<Option<WorkerGuard>> {
    let log_format = std::env::var("DEALHUB_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let (file_writer, guard) = match std::env::var_os("DEALHUB_LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "dealhub.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };
    let file_layer = file_writer.map(|writer| fmt::layer().json().with_writer(writer));

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    match log_format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
