//! Composition root: builds a ledger from configuration.

use tracing::info;

use crate::adapter::store::{JsonFileStore, MemoryStore};
use crate::application::Ledger;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::config::store::StoreBackend;
use crate::port::Store;

/// Store selected by configuration.
pub type DynStore = Box<dyn Store + Send + Sync>;

/// Build the configured store adapter.
pub fn build_store(config: &Config) -> Result<DynStore> {
    let store: DynStore = match config.store.backend {
        StoreBackend::Json => Box::new(JsonFileStore::open(&config.store.path)?),
        StoreBackend::Memory => Box::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Open a ledger over the configured store.
///
/// Installs the default providers when `ledger.install_defaults` is set and
/// the ledger has none yet.
pub fn open_ledger(config: &Config) -> Result<Ledger<DynStore>> {
    let store = build_store(config)?;
    let ledger = Ledger::new(store, config.ledger.balance_policy);

    if config.ledger.install_defaults && ledger.install_default_providers()? {
        info!("Default providers installed");
    }

    info!(
        backend = ?config.store.backend,
        path = %config.store.path,
        policy = ?config.ledger.balance_policy,
        "Ledger opened"
    );
    Ok(ledger)
}
