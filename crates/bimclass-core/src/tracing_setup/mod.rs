//! Tracing setup: structured logging plus span definitions.

pub mod spans;

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;
use crate::constants::LOG_ENV_VAR;

/// Initialize the tracing subscriber.
///
/// Respects the `BIMCLASS_LOG` environment variable for filtering and falls
/// back to `config.log_level`. Returns quietly if a global subscriber is
/// already installed.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    let _ = if config.json_logs {
        builder
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
    } else {
        builder.try_init()
    };
}
