//! Structured JSON logging setup using tracing.
//!
//! Logs go to stderr; stdout carries the command's JSON output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CliError, CliResult};

/// Initialize the tracing subscriber with JSON logging.
///
/// `RUST_LOG` wins over `filter` when it parses.
pub fn init_logging(filter: &str) -> CliResult<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| CliError::Logging(format!("invalid log filter {filter:?}: {e}")))?;

    let fmt_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    tracing::debug!(filter = %filter, "Logging initialized");
    Ok(())
}
