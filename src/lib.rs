//! Betledger - Matched-betting bankroll ledger.
//!
//! Tracks money across bookmaker and exchange accounts, computes lay stakes
//! and liabilities for back/lay bet pairs, and propagates the balance effects
//! of placing and settling them.
//!
//! # Architecture
//!
//! The crate is laid out in hexagonal layers:
//!
//! - **`domain`** - Pure records and formulas
//!   - `calculator` - Lay stake, liability and profit
//!   - `settlement` - Balance effects of placing, settling and reversing bets
//!   - `report` - Aggregates such as float and seed progress
//!
//! - **`port`** - The `Store` trait the ledger persists through
//! - **`adapter`** - `MemoryStore` and `JsonFileStore`
//! - **`application`** - The `Ledger` service
//! - **`infrastructure`** - TOML config, logging and bootstrap
//!
//! # Modules
//!
//! - [`domain`] - Records, calculator, settlement math and errors
//! - [`port`] - Persistence port
//! - [`adapter`] - Store adapters
//! - [`application`] - Ledger operations
//! - [`infrastructure`] - Configuration loading and ledger wiring
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use betledger::adapter::store::MemoryStore;
//! use betledger::application::Ledger;
//! use betledger::domain::{BalancePolicy, BetDraft, BetKind, BetOutcome, ProviderKind};
//! use betledger::domain::{TransactionDraft, TransactionKind};
//! use rust_decimal_macros::dec;
//!
//! # fn main() -> betledger::error::Result<()> {
//! let ledger = Ledger::new(MemoryStore::new(), BalancePolicy::Floor);
//! ledger.record_transaction(TransactionDraft::new(
//!     ProviderKind::Bookmaker,
//!     "Bet365",
//!     TransactionKind::Deposit,
//!     dec!(100),
//! ))?;
//! let exchange = ledger.add_exchange("Smarkets", dec!(2))?;
//! let bookmaker = ledger.bookmakers()?.remove(0);
//!
//! let bet = ledger.place_bet(&BetDraft::new(
//!     bookmaker.id().clone(),
//!     exchange.id().clone(),
//!     "Arsenal v Spurs",
//!     BetKind::Qualifying,
//!     dec!(100),
//!     dec!(2.5),
//!     dec!(2.6),
//! ))?;
//! ledger.settle_bet(bet.id(), BetOutcome::BackWon)?;
//! assert_eq!(ledger.exchanges()?[0].exposure(), dec!(0));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
