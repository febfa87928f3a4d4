//! Ledger domain: records, formulas and balance propagation.
//!
//! Everything here is pure. Operations take records by reference and return
//! updated copies; persistence is handled by the outer layers.

pub mod bet;
pub mod calculator;
pub mod catalog;
pub mod error;
pub mod free_bet;
pub mod id;
pub mod money;
pub mod provider;
pub mod report;
pub mod seed;
pub mod settlement;
pub mod transaction;

pub use bet::{Bet, BetAmendment, BetDraft, BetFigures, BetKind, BetOutcome, BetStatus, Settlement};
pub use error::{DomainError, InvalidStateError, NotFoundError, ValidationError};
pub use free_bet::{FreeBet, FreeBetStatus};
pub use id::{BetId, BookmakerId, ExchangeId, FreeBetId, TransactionId};
pub use money::{Money, Odds, Rate};
pub use provider::{Account, BalancePolicy, Bookmaker, Exchange, Provider, ProviderKind};
pub use report::Aggregates;
pub use seed::{Seed, SeedProgress};
pub use settlement::{BetQuote, FundsWarning, Placement, Transition, Unfunded};
pub use transaction::{Transaction, TransactionDraft, TransactionKind, TransferDraft};
