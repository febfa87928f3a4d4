//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use std::path::Path;

use crate::domain::BalancePolicy;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::config::store::StoreBackend;

/// In-memory ledger with the given balance policy.
pub fn memory(policy: BalancePolicy) -> Config {
    let mut config = Config::default();
    config.store.backend = StoreBackend::Memory;
    config.ledger.balance_policy = policy;
    config
}

/// JSON-file ledger rooted at `dir`, floor policy.
pub fn json(dir: &Path) -> Config {
    let mut config = Config::default();
    config.store.backend = StoreBackend::Json;
    config.store.path = dir.display().to_string();
    config
}
