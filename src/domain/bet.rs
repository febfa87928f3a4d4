//! Bet pairs: a back bet at a bookmaker matched by a lay bet at an exchange.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{DomainError, InvalidStateError, ValidationError};
use super::id::{BetId, BookmakerId, ExchangeId, FreeBetId};
use super::money::{Money, Odds};

/// Whether the back stake is the user's money or promotional credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    /// Real-money bet placed to unlock a promotion.
    Qualifying,
    /// Back stake paid with a free bet.
    Free {
        /// Whether the bookmaker returns the free stake with the winnings.
        #[serde(rename = "stakeReturned", default)]
        stake_returned: bool,
    },
}

impl BetKind {
    /// Free bet whose stake is kept by the bookmaker (the common case).
    pub const FREE_SNR: Self = Self::Free {
        stake_returned: false,
    };

    #[must_use]
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free { .. })
    }

    /// Whether placing the bet takes the back stake out of the bookmaker balance.
    #[must_use]
    pub const fn debits_stake(self) -> bool {
        matches!(self, Self::Qualifying)
    }

    /// Whether a winning back bet pays the stake back alongside the winnings.
    #[must_use]
    pub const fn returns_stake(self) -> bool {
        match self {
            Self::Qualifying => true,
            Self::Free { stake_returned } => stake_returned,
        }
    }
}

/// Lifecycle state of a bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    Unsettled,
    BackWon,
    LayWon,
}

impl BetStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsettled => "unsettled",
            Self::BackWon => "back_won",
            Self::LayWon => "lay_won",
        }
    }

    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Unsettled)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a bet pair won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetOutcome {
    /// The backed selection won at the bookmaker.
    BackWon,
    /// The selection lost, so the exchange lay won.
    LayWon,
}

impl From<BetOutcome> for BetStatus {
    fn from(outcome: BetOutcome) -> Self {
        match outcome {
            BetOutcome::BackWon => Self::BackWon,
            BetOutcome::LayWon => Self::LayWon,
        }
    }
}

impl TryFrom<BetStatus> for BetOutcome {
    type Error = InvalidStateError;

    fn try_from(status: BetStatus) -> Result<Self, Self::Error> {
        match status {
            BetStatus::BackWon => Ok(Self::BackWon),
            BetStatus::LayWon => Ok(Self::LayWon),
            BetStatus::Unsettled => Err(InvalidStateError::NotAnOutcome { status }),
        }
    }
}

impl FromStr for BetOutcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "back_won" => Ok(Self::BackWon),
            "lay_won" => Ok(Self::LayWon),
            "unsettled" => Err(InvalidStateError::NotAnOutcome {
                status: BetStatus::Unsettled,
            }
            .into()),
            other => Err(ValidationError::UnknownOutcome {
                value: other.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for BetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(BetStatus::from(*self).as_str())
    }
}

/// Stakes, odds and liability of a bet pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetFigures {
    pub back_stake: Money,
    pub back_odds: Odds,
    pub lay_stake: Money,
    pub lay_odds: Odds,
    pub liability: Money,
}

/// Money moved when a bet was settled, kept so the settlement can be reversed exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub outcome: BetOutcome,
    pub net_profit: Money,
    pub commission: Money,
    pub bookmaker_credit: Money,
    pub exchange_credit: Money,
    pub settled_at: DateTime<Utc>,
}

/// A recorded bet pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    id: BetId,
    bookmaker_id: BookmakerId,
    exchange_id: ExchangeId,
    event: String,
    #[serde(rename = "type")]
    kind: BetKind,
    #[serde(flatten)]
    figures: BetFigures,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    free_bet_id: Option<FreeBetId>,
    status: BetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settlement: Option<Settlement>,
    created_at: DateTime<Utc>,
}

impl Bet {
    /// Create an unsettled bet. Figures must already be validated.
    #[must_use]
    pub(crate) fn new(
        bookmaker_id: BookmakerId,
        exchange_id: ExchangeId,
        event: String,
        kind: BetKind,
        figures: BetFigures,
        free_bet_id: Option<FreeBetId>,
    ) -> Self {
        Self {
            id: BetId::new(),
            bookmaker_id,
            exchange_id,
            event,
            kind,
            figures,
            free_bet_id,
            status: BetStatus::Unsettled,
            settlement: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &BetId {
        &self.id
    }

    #[must_use]
    pub fn bookmaker_id(&self) -> &BookmakerId {
        &self.bookmaker_id
    }

    #[must_use]
    pub fn exchange_id(&self) -> &ExchangeId {
        &self.exchange_id
    }

    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    #[must_use]
    pub fn kind(&self) -> BetKind {
        self.kind
    }

    #[must_use]
    pub fn figures(&self) -> &BetFigures {
        &self.figures
    }

    #[must_use]
    pub fn free_bet_id(&self) -> Option<&FreeBetId> {
        self.free_bet_id.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> BetStatus {
        self.status
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }

    #[must_use]
    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    /// Profit booked at settlement; zero while unsettled.
    #[must_use]
    pub fn net_profit(&self) -> Money {
        self.settlement
            .as_ref()
            .map_or(Decimal::ZERO, |s| s.net_profit)
    }

    /// Commission booked at settlement; zero while unsettled.
    #[must_use]
    pub fn commission(&self) -> Money {
        self.settlement
            .as_ref()
            .map_or(Decimal::ZERO, |s| s.commission)
    }

    #[must_use]
    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settlement.as_ref().map(|s| s.settled_at)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn mark_settled(&mut self, settlement: Settlement) {
        self.status = settlement.outcome.into();
        self.settlement = Some(settlement);
    }

    pub(crate) fn clear_settlement(&mut self) -> Option<Settlement> {
        self.status = BetStatus::Unsettled;
        self.settlement.take()
    }

    pub(crate) fn amend(&mut self, event: String, figures: BetFigures) {
        self.event = event;
        self.figures = figures;
    }
}

/// A proposed bet, as collected from the user before placement.
#[derive(Debug, Clone, PartialEq)]
pub struct BetDraft {
    pub bookmaker_id: BookmakerId,
    pub exchange_id: ExchangeId,
    pub event: String,
    pub kind: BetKind,
    pub back_stake: Money,
    pub back_odds: Odds,
    pub lay_odds: Odds,
    /// Manually chosen lay stake; computed from the exchange commission when absent.
    pub lay_stake: Option<Money>,
    /// Free bet consumed by this bet (only for [`BetKind::Free`]).
    pub free_bet_id: Option<FreeBetId>,
}

impl BetDraft {
    /// Draft with a computed lay stake and no linked free bet.
    #[must_use]
    pub fn new(
        bookmaker_id: BookmakerId,
        exchange_id: ExchangeId,
        event: impl Into<String>,
        kind: BetKind,
        back_stake: Money,
        back_odds: Odds,
        lay_odds: Odds,
    ) -> Self {
        Self {
            bookmaker_id,
            exchange_id,
            event: event.into(),
            kind,
            back_stake,
            back_odds,
            lay_odds,
            lay_stake: None,
            free_bet_id: None,
        }
    }

    /// Use a manually chosen lay stake.
    #[must_use]
    pub fn with_lay_stake(mut self, lay_stake: Money) -> Self {
        self.lay_stake = Some(lay_stake);
        self
    }

    /// Consume a tracked free bet.
    #[must_use]
    pub fn with_free_bet(mut self, free_bet_id: FreeBetId) -> Self {
        self.free_bet_id = Some(free_bet_id);
        self
    }
}

/// Changes to an unsettled bet. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BetAmendment {
    pub event: Option<String>,
    pub back_stake: Option<Money>,
    pub back_odds: Option<Odds>,
    pub lay_odds: Option<Odds>,
    /// Manual lay stake; when absent the lay stake is recomputed.
    pub lay_stake: Option<Money>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn qualifying_kind_debits_and_returns_stake() {
        assert!(BetKind::Qualifying.debits_stake());
        assert!(BetKind::Qualifying.returns_stake());
        assert!(!BetKind::Qualifying.is_free());
    }

    #[test]
    fn free_kind_never_debits_stake() {
        assert!(!BetKind::FREE_SNR.debits_stake());
        assert!(!BetKind::FREE_SNR.returns_stake());
        assert!(BetKind::Free {
            stake_returned: true
        }
        .returns_stake());
    }

    #[test]
    fn outcome_parses_settled_statuses_only() {
        assert_eq!("back_won".parse::<BetOutcome>().unwrap(), BetOutcome::BackWon);
        assert_eq!("lay_won".parse::<BetOutcome>().unwrap(), BetOutcome::LayWon);
        assert!(matches!(
            "unsettled".parse::<BetOutcome>(),
            Err(DomainError::InvalidState(InvalidStateError::NotAnOutcome { .. }))
        ));
        assert!(matches!(
            "void".parse::<BetOutcome>(),
            Err(DomainError::Validation(ValidationError::UnknownOutcome { .. }))
        ));
    }

    #[test]
    fn outcome_from_unsettled_status_is_rejected() {
        assert!(BetOutcome::try_from(BetStatus::Unsettled).is_err());
        assert_eq!(
            BetOutcome::try_from(BetStatus::LayWon).unwrap(),
            BetOutcome::LayWon
        );
    }

    #[test]
    fn kind_serializes_with_type_tag() {
        let qualifying = serde_json::to_value(BetKind::Qualifying).unwrap();
        assert_eq!(qualifying, serde_json::json!("qualifying"));

        let free = serde_json::to_value(BetKind::FREE_SNR).unwrap();
        assert_eq!(free, serde_json::json!({ "free": { "stakeReturned": false } }));
    }

    #[test]
    fn unsettled_bet_reports_zero_profit() {
        let bet = Bet::new(
            BookmakerId::from("bm"),
            ExchangeId::from("ex"),
            "Arsenal v Spurs".into(),
            BetKind::Qualifying,
            BetFigures {
                back_stake: dec!(10),
                back_odds: dec!(2),
                lay_stake: dec!(10),
                lay_odds: dec!(2),
                liability: dec!(10),
            },
            None,
        );

        assert_eq!(bet.status(), BetStatus::Unsettled);
        assert_eq!(bet.net_profit(), dec!(0));
        assert!(bet.settled_at().is_none());
    }
}
