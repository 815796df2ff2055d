//! Tracing setup: structured logging and span definitions.

pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Initialize the tracing subscriber.
///
/// Reads `CAUSIM_LOG` for filtering, e.g. `CAUSIM_LOG=causim_experiment=debug`.
/// Falls back to `info` if unset or invalid. Idempotent.
pub fn init_tracing() {
    init_tracing_with_config(&ObservabilityConfig::default());
}

/// Initialize tracing from an [`ObservabilityConfig`]. `CAUSIM_LOG` still
/// takes precedence over `config.log_level`. Idempotent.
pub fn init_tracing_with_config(config: &ObservabilityConfig) {
    let level = config.log_level.clone();
    let json = config.json_logs;
    INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));

        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        // `try_init` so an embedding application's subscriber wins.
        let result = if json {
            tracing_subscriber::registry()
                .with(layer.json())
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(layer)
                .with(filter)
                .try_init()
        };
        if result.is_err() {
            tracing::debug!("global tracing subscriber already set");
        }
    });
}
