//! Seed capital and its repayment progress.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::money::{round_money, round_percent, Money};

/// The user's original capital.
///
/// `repaid_so_far` is derived from settled profit and refreshed whenever
/// settlements change; it is never accumulated independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    initial_seed: Money,
    #[serde(default)]
    repaid_so_far: Money,
}

impl Seed {
    pub fn try_new(initial_seed: Money) -> Result<Self, ValidationError> {
        if initial_seed < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount {
                field: "initial_seed",
                value: initial_seed,
            });
        }
        Ok(Self {
            initial_seed: round_money(initial_seed),
            repaid_so_far: Decimal::ZERO,
        })
    }

    #[must_use]
    pub fn initial_seed(&self) -> Money {
        self.initial_seed
    }

    #[must_use]
    pub fn repaid_so_far(&self) -> Money {
        self.repaid_so_far
    }

    /// Copy of this seed with `repaid_so_far` recomputed from settled profit.
    #[must_use]
    pub fn with_settled_profit(&self, settled_profit: Money) -> Self {
        Self {
            initial_seed: self.initial_seed,
            repaid_so_far: seed_progress(self, settled_profit).repaid,
        }
    }
}

/// How much of the seed has been recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProgress {
    pub repaid: Money,
    pub remaining: Money,
    /// Percent recovered, one decimal place, within `[0, 100]`.
    pub percentage: Decimal,
}

/// Seed recovery for a given cumulative settled profit.
///
/// Losses never count as negative repayment and profit beyond the seed is
/// not counted twice.
#[must_use]
pub fn seed_progress(seed: &Seed, settled_profit: Money) -> SeedProgress {
    let initial = seed.initial_seed;
    let repaid = round_money(settled_profit.min(initial).max(Decimal::ZERO));
    let remaining = round_money((initial - repaid).max(Decimal::ZERO));
    let percentage = if initial > Decimal::ZERO {
        round_percent((repaid / initial * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED))
    } else {
        Decimal::ZERO
    };

    SeedProgress {
        repaid,
        remaining,
        percentage,
    }
}
