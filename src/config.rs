//! Engine configuration
//!
//! Layered configuration: an optional file source overridden by
//! `CASCADE_`-prefixed environment variables (e.g. `CASCADE_LOGGING__LEVEL`).

use crate::error::CascadeError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration, optionally from a file, with environment
    /// overrides applied on top.
    pub fn load(file: Option<&Path>) -> Result<Self, CascadeError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("CASCADE").separator("__"),
        );

        let settings = builder
            .build()
            .map_err(|e| CascadeError::Config(e.to_string()))?;
        settings
            .try_deserialize()
            .map_err(|e| CascadeError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = EngineConfig::load(None).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = EngineConfig::load(Some(Path::new("/nonexistent/cascade.toml")));
        assert!(matches!(result, Err(CascadeError::Config(_))));
    }
}
