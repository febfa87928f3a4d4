//! Builders for domain records used across tests.
//!
//! Funded providers and ready-to-place drafts, so tests focus on the
//! balance assertions rather than construction boilerplate.

use rust_decimal::Decimal;

use crate::domain::bet::{BetDraft, BetKind};
use crate::domain::free_bet::FreeBet;
use crate::domain::money::{Money, Odds};
use crate::domain::provider::{Bookmaker, Exchange, Provider};

/// Event name used by [`draft`].
pub const EVENT: &str = "Arsenal v Spurs";

/// A bookmaker with no commission and `balance` deposited.
pub fn bookmaker_with(name: &str, balance: Money) -> Bookmaker {
    let mut bookmaker = Bookmaker::try_new(name, Decimal::ZERO).expect("valid bookmaker");
    if balance > Decimal::ZERO {
        bookmaker.account_mut().deposit(balance);
    }
    bookmaker
}

/// An exchange charging `commission` percent with `balance` deposited.
pub fn exchange_with(name: &str, balance: Money, commission: Decimal) -> Exchange {
    let mut exchange = Exchange::try_new(name, commission).expect("valid exchange");
    if balance > Decimal::ZERO {
        exchange.account_mut().deposit(balance);
    }
    exchange
}

/// A draft on [`EVENT`] between the two providers, lay stake computed.
pub fn draft(
    bookmaker: &Bookmaker,
    exchange: &Exchange,
    kind: BetKind,
    back_stake: Money,
    back_odds: Odds,
    lay_odds: Odds,
) -> BetDraft {
    BetDraft::new(
        bookmaker.id().clone(),
        exchange.id().clone(),
        EVENT,
        kind,
        back_stake,
        back_odds,
        lay_odds,
    )
}

/// A pending free bet at `bookmaker` with no expiry.
pub fn free_bet(bookmaker: &Bookmaker, value: Money) -> FreeBet {
    FreeBet::try_new(bookmaker.id().clone(), value, None, "").expect("valid free bet")
}
