//! Monetary types and rounding rules.
//!
//! Every stored amount is a [`Decimal`] rounded to two places. Formulas
//! round their output through [`round_money`] so repeated operations never
//! accumulate drift.

use rust_decimal::{Decimal, RoundingStrategy};

/// An amount of money in the ledger currency.
pub type Money = Decimal;

/// Decimal odds (stake multiplier, always greater than 1 when valid).
pub type Odds = Decimal;

/// A fractional rate in `[0, 1)`, e.g. exchange commission.
pub type Rate = Decimal;

/// Decimal places kept for money.
pub const MONEY_DP: u32 = 2;

/// Decimal places kept for percentages.
pub const PERCENT_DP: u32 = 1;

/// Round an amount to whole pence, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Money {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to one decimal place.
#[must_use]
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a percent (`2.0` meaning 2%) into a fractional rate.
#[must_use]
pub fn percent_to_rate(percent: Decimal) -> Rate {
    percent / Decimal::ONE_HUNDRED
}
