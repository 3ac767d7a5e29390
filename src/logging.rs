//! Logging
//!
//! Structured logging via `tracing`. The engine only emits events; embedders
//! that want the crate to own subscriber setup can use [`init_logging`].

use crate::error::CascadeError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format: text, json
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_level(),
            format: default_format(),
        }
    }
}

/// Install a global subscriber writing to stderr. `RUST_LOG` overrides the
/// configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CascadeError> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| CascadeError::Config(format!("invalid log level: {}", e)))?;

    let registry = Registry::default().with(filter);
    let result = match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "text" => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        other => {
            return Err(CascadeError::Config(format!(
                "unknown log format: {}",
                other
            )))
        }
    };

    result.map_err(|e| CascadeError::Config(format!("failed to install subscriber: {}", e)))
}
