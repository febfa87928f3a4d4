//! Balance propagation for placing, settling and reversing bets.
//!
//! Every function takes the records it touches by reference and returns
//! updated copies, so a failure part-way through leaves the inputs intact.
//! Callers write the returned records back together.
//!
//! Exchange liability is reserved at placement: it moves out of the
//! exchange balance into `exposure`. Settlement releases the exposure and
//! either pays the liability away (back won) or returns it with the lay
//! winnings (lay won).

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use super::bet::{Bet, BetAmendment, BetDraft, BetFigures, BetKind, BetOutcome, Settlement};
use super::calculator::{self, back_winnings};
use super::error::{DomainError, InvalidStateError, NotFoundError, ValidationError};
use super::free_bet::FreeBet;
use super::money::{round_money, Money};
use super::provider::{BalancePolicy, Bookmaker, Exchange, Provider};

/// Debits that the tracked balances could not cover under [`BalancePolicy::Floor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unfunded {
    pub bookmaker: Money,
    pub exchange: Money,
}

impl Unfunded {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.bookmaker.is_zero() && self.exchange.is_zero()
    }
}

/// Records produced by placing a bet.
#[derive(Debug, Clone)]
pub struct Placement {
    pub bet: Bet,
    pub bookmaker: Bookmaker,
    pub exchange: Exchange,
    /// The consumed free bet, when the draft referenced one.
    pub free_bet: Option<FreeBet>,
    pub unfunded: Unfunded,
}

/// Records produced by settling or unsettling a bet.
#[derive(Debug, Clone)]
pub struct Transition {
    pub bet: Bet,
    pub bookmaker: Bookmaker,
    pub exchange: Exchange,
    pub unfunded: Unfunded,
}

/// Lay figures and projected profit of a draft, without touching balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetQuote {
    pub figures: BetFigures,
    pub back_won_profit: Money,
    pub lay_won_profit: Money,
    pub back_won_commission: Money,
    pub lay_won_commission: Money,
}

/// A balance that will not cover what a draft needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundsWarning {
    pub provider: String,
    pub required: Money,
    pub available: Money,
}

impl FundsWarning {
    #[must_use]
    pub fn shortfall(&self) -> Money {
        round_money(self.required - self.available)
    }
}

fn ensure_refs(
    bet_bookmaker: &super::id::BookmakerId,
    bet_exchange: &super::id::ExchangeId,
    bookmaker: &Bookmaker,
    exchange: &Exchange,
) -> Result<(), NotFoundError> {
    if bet_bookmaker != bookmaker.id() {
        return Err(NotFoundError::Bookmaker(bet_bookmaker.clone()));
    }
    if bet_exchange != exchange.id() {
        return Err(NotFoundError::Exchange(bet_exchange.clone()));
    }
    Ok(())
}

fn draft_figures(draft: &BetDraft, exchange: &Exchange) -> Result<BetFigures, ValidationError> {
    calculator::figures(
        draft.kind,
        draft.back_stake,
        draft.back_odds,
        draft.lay_odds,
        draft.lay_stake,
        exchange.commission_rate(),
    )
}

fn apply_placement(
    kind: BetKind,
    figures: &BetFigures,
    bookmaker: &mut Bookmaker,
    exchange: &mut Exchange,
    policy: BalancePolicy,
) -> Result<Unfunded, InvalidStateError> {
    let bookmaker_unfunded = if kind.debits_stake() {
        bookmaker.debit(figures.back_stake, policy)?
    } else {
        Decimal::ZERO
    };
    let exchange_unfunded = exchange.debit(figures.liability, policy)?;
    exchange.add_exposure(figures.liability);

    Ok(Unfunded {
        bookmaker: bookmaker_unfunded,
        exchange: exchange_unfunded,
    })
}

fn undo_placement(kind: BetKind, figures: &BetFigures, bookmaker: &mut Bookmaker, exchange: &mut Exchange) {
    if kind.debits_stake() {
        bookmaker.account_mut().refund(figures.back_stake);
    }
    exchange.release_exposure(figures.liability);
    exchange.account_mut().refund(figures.liability);
}

/// Compute lay stake, liability and projected profit for a draft.
pub fn quote(draft: &BetDraft, bookmaker: &Bookmaker, exchange: &Exchange) -> Result<BetQuote, ValidationError> {
    let figures = draft_figures(draft, exchange)?;
    let back = settlement_effects(draft.kind, &figures, BetOutcome::BackWon, bookmaker, exchange);
    let lay = settlement_effects(draft.kind, &figures, BetOutcome::LayWon, bookmaker, exchange);

    Ok(BetQuote {
        figures,
        back_won_profit: back.net_profit,
        lay_won_profit: lay.net_profit,
        back_won_commission: back.commission,
        lay_won_commission: lay.commission,
    })
}

/// Balances that would not cover the draft's stake or liability.
pub fn check_funds(
    draft: &BetDraft,
    bookmaker: &Bookmaker,
    exchange: &Exchange,
) -> Result<Vec<FundsWarning>, ValidationError> {
    let figures = draft_figures(draft, exchange)?;
    let mut warnings = Vec::new();

    if draft.kind.debits_stake() && figures.back_stake > bookmaker.current_balance() {
        warnings.push(FundsWarning {
            provider: bookmaker.name().to_string(),
            required: figures.back_stake,
            available: bookmaker.current_balance(),
        });
    }
    if figures.liability > exchange.current_balance() {
        warnings.push(FundsWarning {
            provider: exchange.name().to_string(),
            required: figures.liability,
            available: exchange.current_balance(),
        });
    }

    Ok(warnings)
}

/// Place a new bet pair.
///
/// Debits the back stake from the bookmaker (qualifying bets only), moves
/// the liability from the exchange balance into exposure and, for a draft
/// that names a free bet, marks that free bet used.
pub fn place_bet(
    draft: &BetDraft,
    bookmaker: &Bookmaker,
    exchange: &Exchange,
    free_bet: Option<&FreeBet>,
    policy: BalancePolicy,
) -> Result<Placement, DomainError> {
    ensure_refs(&draft.bookmaker_id, &draft.exchange_id, bookmaker, exchange)?;

    let event = draft.event.trim();
    if event.is_empty() {
        return Err(ValidationError::Empty { field: "event" }.into());
    }

    let free_bet = match (&draft.free_bet_id, free_bet) {
        (None, _) => None,
        (Some(id), _) if !draft.kind.is_free() => {
            return Err(ValidationError::FreeBetOnQualifyingBet { id: id.clone() }.into());
        }
        (Some(id), Some(fb)) if fb.id() == id => {
            if fb.bookmaker_id() != bookmaker.id() {
                return Err(InvalidStateError::FreeBetBookmakerMismatch { id: id.clone() }.into());
            }
            let mut used = fb.clone();
            used.mark_used(Utc::now())?;
            Some(used)
        }
        (Some(id), _) => return Err(NotFoundError::FreeBet(id.clone()).into()),
    };

    let figures = draft_figures(draft, exchange)?;

    let mut bookmaker = bookmaker.clone();
    let mut exchange = exchange.clone();
    let unfunded = apply_placement(draft.kind, &figures, &mut bookmaker, &mut exchange, policy)?;

    let bet = Bet::new(
        draft.bookmaker_id.clone(),
        draft.exchange_id.clone(),
        event.to_string(),
        draft.kind,
        figures,
        draft.free_bet_id.clone(),
    );

    Ok(Placement {
        bet,
        bookmaker,
        exchange,
        free_bet,
        unfunded,
    })
}

/// Money that settling `figures` with `outcome` moves, given current commissions.
#[must_use]
pub fn settlement_effects(
    kind: BetKind,
    figures: &BetFigures,
    outcome: BetOutcome,
    bookmaker: &Bookmaker,
    exchange: &Exchange,
) -> Settlement {
    let (bookmaker_credit, exchange_credit, commission) = match outcome {
        BetOutcome::BackWon => {
            let winnings = back_winnings(figures);
            let commission = round_money(winnings * bookmaker.commission_rate());
            let stake = if kind.returns_stake() {
                figures.back_stake
            } else {
                Decimal::ZERO
            };
            (round_money(winnings - commission + stake), Decimal::ZERO, commission)
        }
        BetOutcome::LayWon => {
            let commission = round_money(figures.lay_stake * exchange.commission_rate());
            let credit = round_money(figures.liability + figures.lay_stake - commission);
            (Decimal::ZERO, credit, commission)
        }
    };

    Settlement {
        outcome,
        net_profit: calculator::net_profit(kind, figures, outcome),
        commission,
        bookmaker_credit,
        exchange_credit,
        settled_at: Utc::now(),
    }
}

/// Settle an unsettled bet.
///
/// Settlement is one-way: a settled bet is rejected with
/// [`InvalidStateError::AlreadySettled`] and nothing is modified.
pub fn settle_bet(
    bet: &Bet,
    outcome: BetOutcome,
    bookmaker: &Bookmaker,
    exchange: &Exchange,
) -> Result<Transition, DomainError> {
    if bet.is_settled() {
        return Err(InvalidStateError::AlreadySettled {
            id: bet.id().clone(),
            status: bet.status(),
        }
        .into());
    }
    ensure_refs(bet.bookmaker_id(), bet.exchange_id(), bookmaker, exchange)?;

    let settlement = settlement_effects(bet.kind(), bet.figures(), outcome, bookmaker, exchange);

    let mut bookmaker = bookmaker.clone();
    let mut exchange = exchange.clone();
    bookmaker.account_mut().credit(settlement.bookmaker_credit);
    exchange.release_exposure(bet.figures().liability);
    exchange.account_mut().credit(settlement.exchange_credit);

    let mut bet = bet.clone();
    bet.mark_settled(settlement);

    Ok(Transition {
        bet,
        bookmaker,
        exchange,
        unfunded: Unfunded::default(),
    })
}

/// Reverse a settlement using the credits stored on the bet.
pub fn unsettle_bet(
    bet: &Bet,
    bookmaker: &Bookmaker,
    exchange: &Exchange,
    policy: BalancePolicy,
) -> Result<Transition, DomainError> {
    ensure_refs(bet.bookmaker_id(), bet.exchange_id(), bookmaker, exchange)?;

    let mut bet = bet.clone();
    let Some(settlement) = bet.clear_settlement() else {
        return Err(InvalidStateError::NotSettled {
            id: bet.id().clone(),
        }
        .into());
    };

    let mut bookmaker = bookmaker.clone();
    let mut exchange = exchange.clone();
    let unfunded = Unfunded {
        bookmaker: bookmaker.debit(settlement.bookmaker_credit, policy)?,
        exchange: exchange.debit(settlement.exchange_credit, policy)?,
    };
    exchange.add_exposure(bet.figures().liability);

    Ok(Transition {
        bet,
        bookmaker,
        exchange,
        unfunded,
    })
}

/// Reverse the placement of an unsettled bet, as when deleting it.
pub fn cancel_bet(bet: &Bet, bookmaker: &Bookmaker, exchange: &Exchange) -> Result<(Bookmaker, Exchange), DomainError> {
    if bet.is_settled() {
        return Err(InvalidStateError::SettledBetLocked {
            id: bet.id().clone(),
            status: bet.status(),
        }
        .into());
    }
    ensure_refs(bet.bookmaker_id(), bet.exchange_id(), bookmaker, exchange)?;

    let mut bookmaker = bookmaker.clone();
    let mut exchange = exchange.clone();
    undo_placement(bet.kind(), bet.figures(), &mut bookmaker, &mut exchange);
    Ok((bookmaker, exchange))
}

/// Change the figures of an unsettled bet, re-applying its balance effects.
pub fn amend_bet(
    bet: &Bet,
    amendment: &BetAmendment,
    bookmaker: &Bookmaker,
    exchange: &Exchange,
    policy: BalancePolicy,
) -> Result<Transition, DomainError> {
    let (mut bookmaker, mut exchange) = cancel_bet(bet, bookmaker, exchange)?;

    let current = bet.figures();
    let event = amendment
        .event
        .as_deref()
        .unwrap_or(bet.event())
        .trim()
        .to_string();
    if event.is_empty() {
        return Err(ValidationError::Empty { field: "event" }.into());
    }

    let back_stake = amendment.back_stake.unwrap_or(current.back_stake);
    let back_odds = amendment.back_odds.unwrap_or(current.back_odds);
    let lay_odds = amendment.lay_odds.unwrap_or(current.lay_odds);
    let figures = calculator::figures(
        bet.kind(),
        back_stake,
        back_odds,
        lay_odds,
        amendment.lay_stake,
        exchange.commission_rate(),
    )?;

    let unfunded = apply_placement(bet.kind(), &figures, &mut bookmaker, &mut exchange, policy)?;

    let mut bet = bet.clone();
    bet.amend(event, figures);

    Ok(Transition {
        bet,
        bookmaker,
        exchange,
        unfunded,
    })
}
