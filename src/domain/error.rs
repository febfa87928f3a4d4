//! Domain errors for ledger operations.
//!
//! Errors fall into three families:
//!
//! - [`ValidationError`] - malformed input rejected before anything is computed
//! - [`NotFoundError`] - a referenced record does not exist
//! - [`InvalidStateError`] - the record exists but the operation is not allowed now
//!
//! # Examples
//!
//! ```
//! use betledger::domain::calculator::liability;
//! use betledger::domain::error::ValidationError;
//! use rust_decimal_macros::dec;
//!
//! let result = liability(dec!(10), dec!(1.0));
//! assert!(matches!(result, Err(ValidationError::InvalidOdds { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use super::bet::BetStatus;
use super::free_bet::FreeBetStatus;
use super::id::{BetId, BookmakerId, ExchangeId, FreeBetId};
use super::provider::ProviderKind;

/// Input that violates a calculator or record contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Stakes and amounts must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositiveAmount {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// Amounts that may be zero must still not be negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        field: &'static str,
        value: Decimal,
    },

    /// Decimal odds must exceed 1.
    #[error("{field} must be greater than 1, got {value}")]
    InvalidOdds {
        field: &'static str,
        value: Decimal,
    },

    /// Commission rate must lie in `[0, 1)`.
    #[error("commission rate must be in [0, 1), got {rate}")]
    CommissionOutOfRange { rate: Decimal },

    /// Commission percent stored on a provider must lie in `[0, 100)`.
    #[error("commission percent must be in [0, 100), got {percent}")]
    CommissionPercentOutOfRange { percent: Decimal },

    /// Lay odds at or below the commission rate make the lay stake undefined.
    #[error("lay odds {lay_odds} must exceed commission rate {rate}")]
    LayOddsBelowCommission { lay_odds: Decimal, rate: Decimal },

    /// A stake or odds product exceeds the representable range.
    #[error("{field} is too large to compute")]
    Overflow { field: &'static str },

    /// A required text field was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A free bet was attached to a qualifying bet.
    #[error("free bet {id} can only back a bet of type free")]
    FreeBetOnQualifyingBet { id: FreeBetId },

    /// A transfer must move money between two different accounts.
    #[error("cannot transfer from {name} to itself")]
    TransferToSelf { name: String },

    /// Outcome text did not name a settled result.
    #[error("unknown bet outcome '{value}'")]
    UnknownOutcome { value: String },
}

/// A referenced record is missing from the current snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("bookmaker {0} not found")]
    Bookmaker(BookmakerId),

    #[error("exchange {0} not found")]
    Exchange(ExchangeId),

    #[error("bet {0} not found")]
    Bet(BetId),

    #[error("free bet {0} not found")]
    FreeBet(FreeBetId),

    /// Lookup by display name, used when recording transactions.
    #[error("{kind} '{name}' not found")]
    Provider { kind: ProviderKind, name: String },
}

/// The operation conflicts with the record's current state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidStateError {
    /// Settlement is one-way; a second settle would double count.
    #[error("bet {id} is already settled as {status}")]
    AlreadySettled { id: BetId, status: BetStatus },

    /// Only settled bets can be unsettled.
    #[error("bet {id} is not settled")]
    NotSettled { id: BetId },

    /// Settled bets are frozen until explicitly unsettled.
    #[error("bet {id} is settled as {status}; unsettle it first")]
    SettledBetLocked { id: BetId, status: BetStatus },

    /// Settlement requires a won/lost result, never `unsettled`.
    #[error("cannot settle bet with status {status}")]
    NotAnOutcome { status: BetStatus },

    #[error("free bet {id} is {status}, expected pending")]
    FreeBetNotPending { id: FreeBetId, status: FreeBetStatus },

    #[error("free bet {id} belongs to a different bookmaker")]
    FreeBetBookmakerMismatch { id: FreeBetId },

    #[error("{kind} named '{name}' already exists")]
    DuplicateName { kind: ProviderKind, name: String },

    #[error("{kind} '{name}' is referenced by {bets} bet(s)")]
    ProviderInUse {
        kind: ProviderKind,
        name: String,
        bets: usize,
    },

    /// Raised only under the `reject` balance policy.
    #[error("{kind} '{name}' has {available} available, {required} required")]
    InsufficientFunds {
        kind: ProviderKind,
        name: String,
        required: Decimal,
        available: Decimal,
    },
}

/// Any domain rule violation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
}
