//! Tracing subscriber setup.
//!
//! Human-readable output by default; JSON lines when `json_logs` is set.
//! `RUST_LOG` directives take precedence over the configured level.

use crate::config::RuntimeConfig;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tracing could not be initialized.
#[derive(Debug, Error)]
#[error("failed to initialize tracing: {0}")]
pub struct TelemetryError(String);

/// Build the level filter for `config`.
///
/// # Errors
///
/// `TelemetryError` if neither `RUST_LOG` nor the configured level parses.
pub fn env_filter(config: &RuntimeConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError(e.to_string()))
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// emitted records.
///
/// # Errors
///
/// `TelemetryError` if the filter does not parse or a subscriber is already
/// installed.
pub fn init_tracing(config: &RuntimeConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError(e.to_string()))?;
    }

    tracing::debug!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Tracing initialized"
    );
    Ok(())
}
