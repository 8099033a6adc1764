//! Engine configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `METASCOPE` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use metascope::config::EngineConfig;
//!
//! let config = EngineConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Hint cap: {}", config.personalization.hint_concurrency_cap);
//! ```

mod catalog;
mod error;
mod logging;
mod personalization;
mod storage;

pub use catalog::{CatalogConfig, CatalogOverrides};
pub use error::{CatalogError, ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use personalization::PersonalizationConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root engine configuration
///
/// Load using [`EngineConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Hint cap and notification lifetime
    #[serde(default)]
    pub personalization: PersonalizationConfig,

    /// Persistence backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Catalog override file
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `METASCOPE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `METASCOPE__PERSONALIZATION__HINT_CONCURRENCY_CAP=3` -> `personalization.hint_concurrency_cap = 3`
    /// - `METASCOPE__STORAGE__BACKEND=file` -> `storage.backend = file`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("METASCOPE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.personalization.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
