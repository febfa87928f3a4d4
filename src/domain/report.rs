//! Aggregate figures derived from the current ledger state.
//!
//! Everything here is recomputed from the record collections on each read.

use rust_decimal::Decimal;
use serde::Serialize;

use super::bet::Bet;
use super::money::{round_money, Money};
use super::provider::{Bookmaker, Exchange, Provider};
use super::seed::{seed_progress, Seed, SeedProgress};

fn sum(values: impl Iterator<Item = Money>) -> Money {
    round_money(values.fold(Decimal::ZERO, |acc, v| acc + v))
}

/// Lifetime deposits across every provider.
#[must_use]
pub fn total_deposits(bookmakers: &[Bookmaker], exchanges: &[Exchange]) -> Money {
    sum(bookmakers
        .iter()
        .map(|b| b.account().total_deposits())
        .chain(exchanges.iter().map(|e| e.account().total_deposits())))
}

/// Tracked balances across every provider.
#[must_use]
pub fn total_balances(bookmakers: &[Bookmaker], exchanges: &[Exchange]) -> Money {
    sum(bookmakers
        .iter()
        .map(|b| b.account().current_balance())
        .chain(exchanges.iter().map(|e| e.account().current_balance())))
}

/// Liability reserved across every exchange.
#[must_use]
pub fn total_exposure(exchanges: &[Exchange]) -> Money {
    sum(exchanges.iter().map(Exchange::exposure))
}

/// Back stakes of unsettled bets that came out of a bookmaker balance.
///
/// Free-bet stakes are promotional credit and are not counted.
#[must_use]
pub fn open_stakes(bets: &[Bet]) -> Money {
    sum(bets
        .iter()
        .filter(|b| !b.is_settled() && b.kind().debits_stake())
        .map(|b| b.figures().back_stake))
}

/// All money sitting in accounts or tied up in open bets.
#[must_use]
pub fn current_float(bookmakers: &[Bookmaker], exchanges: &[Exchange], bets: &[Bet]) -> Money {
    round_money(
        total_balances(bookmakers, exchanges) + open_stakes(bets) + total_exposure(exchanges),
    )
}

/// Gross profit booked by settled bets.
#[must_use]
pub fn settled_profit(bets: &[Bet]) -> Money {
    sum(bets.iter().filter(|b| b.is_settled()).map(Bet::net_profit))
}

/// Commission booked by settled bets.
#[must_use]
pub fn total_commission(bets: &[Bet]) -> Money {
    sum(bets.iter().filter(|b| b.is_settled()).map(Bet::commission))
}

/// Rough amount already taken back out to the bank.
///
/// Withdrawals are not tracked per provider, so this is deposits minus
/// what is still held, never below zero.
#[must_use]
pub fn estimated_withdrawals(bookmakers: &[Bookmaker], exchanges: &[Exchange]) -> Money {
    let held = total_balances(bookmakers, exchanges) + total_exposure(exchanges);
    round_money((total_deposits(bookmakers, exchanges) - held).max(Decimal::ZERO))
}

/// Dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    pub total_deposits: Money,
    pub current_float: Money,
    pub settled_profit: Money,
    pub seed_progress: SeedProgress,
    pub total_exposure: Money,
    pub open_stakes: Money,
    pub total_commission: Money,
    pub profit_after_commission: Money,
    pub estimated_withdrawals: Money,
    pub unsettled_bets: usize,
}

impl Aggregates {
    #[must_use]
    pub fn compute(
        bookmakers: &[Bookmaker],
        exchanges: &[Exchange],
        bets: &[Bet],
        seed: &Seed,
    ) -> Self {
        let settled = settled_profit(bets);
        let commission = total_commission(bets);

        Self {
            total_deposits: total_deposits(bookmakers, exchanges),
            current_float: current_float(bookmakers, exchanges, bets),
            settled_profit: settled,
            seed_progress: seed_progress(seed, settled),
            total_exposure: total_exposure(exchanges),
            open_stakes: open_stakes(bets),
            total_commission: commission,
            profit_after_commission: round_money(settled - commission),
            estimated_withdrawals: estimated_withdrawals(bookmakers, exchanges),
            unsettled_bets: bets.iter().filter(|b| !b.is_settled()).count(),
        }
    }
}
