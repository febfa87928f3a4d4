//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all ledger settings.
//! Configuration is loaded from a TOML file; the store path can be
//! overridden with the `LEDGER_STORE_PATH` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use betledger::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("ledger.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use tracing_subscriber::EnvFilter;

use super::ledger::LedgerConfig;
use super::logging::LoggingConfig;
use super::store::{StoreBackend, StoreConfig, STORE_PATH_ENV};
use crate::error::{ConfigError, Result};

/// Main ledger configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Balance policy and first-run behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Persistence backend.
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.override_store_path(std::env::var(STORE_PATH_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    fn override_store_path(&mut self, path: Option<String>) {
        if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
            self.store.path = path;
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackend::Json && self.store.path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "store.path",
            }
            .into());
        }
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level",
                reason: e.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) -> bool {
        self.logging.init()
    }
}
