//! Ledger behaviour configuration.

use serde::Deserialize;

use crate::domain::BalancePolicy;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    /// What to do when a debit exceeds the tracked balance.
    #[serde(default)]
    pub balance_policy: BalancePolicy,
    /// Install the default provider catalogue into an empty ledger on open.
    #[serde(default)]
    pub install_defaults: bool,
}
