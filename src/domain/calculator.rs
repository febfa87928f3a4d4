//! Stake, liability and profit formulas.
//!
//! All functions are pure and round their output to whole pence. Inputs
//! are validated up front; a formula never returns a negative stake or a
//! value derived from a division by zero. Products too large for a
//! `Decimal` are rejected as [`ValidationError::Overflow`].

use rust_decimal::Decimal;

use super::bet::{BetFigures, BetKind, BetOutcome};
use super::error::ValidationError;
use super::money::{round_money, Money, Odds, Rate};

fn ensure_positive(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount { field, value });
    }
    Ok(())
}

fn ensure_odds(field: &'static str, value: Odds) -> Result<(), ValidationError> {
    if value <= Decimal::ONE {
        return Err(ValidationError::InvalidOdds { field, value });
    }
    Ok(())
}

fn fits(field: &'static str, value: Option<Decimal>) -> Result<Decimal, ValidationError> {
    value.ok_or(ValidationError::Overflow { field })
}

fn ensure_rate(rate: Rate) -> Result<(), ValidationError> {
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(ValidationError::CommissionOutOfRange { rate });
    }
    Ok(())
}

/// Lay-side risk: what the layer pays if the backed selection wins.
///
/// `stake × (odds − 1)`.
pub fn liability(stake: Money, odds: Odds) -> Result<Money, ValidationError> {
    ensure_positive("stake", stake)?;
    ensure_odds("odds", odds)?;
    let risk = stake.checked_mul(odds - Decimal::ONE);
    Ok(round_money(fits("liability", risk)?))
}

/// Stake to lay so both outcomes of the pair return the same amount.
///
/// Commission is charged on lay winnings only, so it is taken off the lay
/// odds. A free bet with the stake kept by the bookmaker only needs its
/// winnings matched.
pub fn lay_stake(
    back_stake: Money,
    back_odds: Odds,
    lay_odds: Odds,
    kind: BetKind,
    commission_rate: Rate,
) -> Result<Money, ValidationError> {
    ensure_positive("back_stake", back_stake)?;
    ensure_odds("back_odds", back_odds)?;
    ensure_odds("lay_odds", lay_odds)?;
    ensure_rate(commission_rate)?;
    if lay_odds <= commission_rate {
        return Err(ValidationError::LayOddsBelowCommission {
            lay_odds,
            rate: commission_rate,
        });
    }

    let matched = if kind.returns_stake() {
        back_stake.checked_mul(back_odds)
    } else {
        back_stake.checked_mul(back_odds - Decimal::ONE)
    };
    let stake = fits("back_stake", matched)?.checked_div(lay_odds - commission_rate);

    Ok(round_money(fits("lay_stake", stake)?))
}

/// Winnings of the back bet, excluding any returned stake.
///
/// Figures built by [`figures`] keep `back_stake × back_odds` within range.
#[must_use]
pub fn back_winnings(figures: &BetFigures) -> Money {
    round_money(figures.back_stake * (figures.back_odds - Decimal::ONE))
}

/// Gross profit of a settled bet pair, before commission.
///
/// | kind | outcome | profit |
/// |---|---|---|
/// | qualifying | back won | winnings − liability |
/// | qualifying | lay won | lay stake − back stake |
/// | free | back won | winnings (+ stake if returned) − liability |
/// | free | lay won | lay stake |
#[must_use]
pub fn net_profit(kind: BetKind, figures: &BetFigures, outcome: BetOutcome) -> Money {
    match (kind, outcome) {
        (BetKind::Qualifying, BetOutcome::BackWon) => {
            round_money(back_winnings(figures) - figures.liability)
        }
        (BetKind::Qualifying, BetOutcome::LayWon) => {
            round_money(figures.lay_stake - figures.back_stake)
        }
        (BetKind::Free { stake_returned }, BetOutcome::BackWon) => {
            let returned = if stake_returned {
                figures.back_stake
            } else {
                Decimal::ZERO
            };
            round_money(back_winnings(figures) + returned - figures.liability)
        }
        (BetKind::Free { .. }, BetOutcome::LayWon) => round_money(figures.lay_stake),
    }
}

/// Validate odds and stakes, then fill in lay stake and liability.
///
/// A manual lay stake is kept as given; otherwise it is computed from the
/// exchange commission rate.
pub fn figures(
    kind: BetKind,
    back_stake: Money,
    back_odds: Odds,
    lay_odds: Odds,
    manual_lay_stake: Option<Money>,
    commission_rate: Rate,
) -> Result<BetFigures, ValidationError> {
    let lay_stake = match manual_lay_stake {
        Some(stake) => {
            ensure_positive("back_stake", back_stake)?;
            ensure_odds("back_odds", back_odds)?;
            ensure_odds("lay_odds", lay_odds)?;
            ensure_positive("lay_stake", stake)?;
            round_money(stake)
        }
        None => self::lay_stake(back_stake, back_odds, lay_odds, kind, commission_rate)?,
    };
    // Settlement credits are bounded by these two returns.
    fits("back_stake", back_stake.checked_mul(back_odds))?;
    fits("lay_stake", lay_stake.checked_mul(lay_odds))?;

    Ok(BetFigures {
        back_stake: round_money(back_stake),
        back_odds,
        lay_stake,
        lay_odds,
        liability: liability(lay_stake, lay_odds)?,
    })
}
