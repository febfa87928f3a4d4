//! Persistence backend configuration.

use serde::Deserialize;

/// Environment variable overriding [`StoreConfig::path`].
pub const STORE_PATH_ENV: &str = "LEDGER_STORE_PATH";

/// Which store adapter backs the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One JSON file per collection under `path`.
    #[default]
    Json,
    /// Process memory only; nothing survives a restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Data directory for the JSON backend.
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    "ledger-data".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_path(),
        }
    }
}
