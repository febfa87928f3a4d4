//! Bookmaker and exchange accounts.
//!
//! Both provider kinds share an [`Account`] (deposits, balance and the
//! shortfall left behind by floored debits). Exchanges additionally track
//! `exposure`: the liability reserved for their unsettled lay bets.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{InvalidStateError, ValidationError};
use super::id::{BookmakerId, ExchangeId};
use super::money::{percent_to_rate, round_money, Money, Rate};

/// Which side of a bet pair a provider sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Bookmaker,
    Exchange,
}

impl ProviderKind {
    /// Stable lowercase name used in logs and records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bookmaker => "bookmaker",
            Self::Exchange => "exchange",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a debit larger than the tracked balance is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalancePolicy {
    /// Clamp the balance at zero and record the unfunded remainder as shortfall.
    #[default]
    Floor,
    /// Refuse the debit with [`InvalidStateError::InsufficientFunds`].
    Reject,
}

/// Money held with one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    total_deposits: Money,
    current_balance: Money,
    #[serde(default)]
    shortfall: Money,
}

impl Account {
    /// Lifetime deposits into this account.
    #[must_use]
    pub fn total_deposits(&self) -> Money {
        self.total_deposits
    }

    /// Tracked balance, never negative.
    #[must_use]
    pub fn current_balance(&self) -> Money {
        self.current_balance
    }

    /// Debits that could not be covered by the tracked balance.
    #[must_use]
    pub fn shortfall(&self) -> Money {
        self.shortfall
    }

    /// Record a deposit: raises both deposits and balance.
    pub fn deposit(&mut self, amount: Money) {
        self.total_deposits = round_money(self.total_deposits + amount);
        self.current_balance = round_money(self.current_balance + amount);
    }

    /// Raise the balance without counting it as a deposit.
    pub fn credit(&mut self, amount: Money) {
        self.current_balance = round_money(self.current_balance + amount);
    }

    /// Give back a debit that is being reversed.
    ///
    /// The part that was never funded is taken off the shortfall first and
    /// only the rest returns to the balance.
    pub fn refund(&mut self, amount: Money) {
        let unfunded = self.shortfall.min(amount).max(Decimal::ZERO);
        self.shortfall = round_money(self.shortfall - unfunded);
        self.current_balance = round_money(self.current_balance + amount - unfunded);
    }

    /// Overwrite the balance with an observed value, clearing any shortfall.
    pub fn reconcile(&mut self, balance: Money) {
        self.current_balance = round_money(balance);
        self.shortfall = Decimal::ZERO;
    }

    /// Lower the balance by `amount`.
    ///
    /// Returns the unfunded part of the debit (zero when the balance covered
    /// it). Under [`BalancePolicy::Reject`] an uncovered debit returns the
    /// available balance as the error and leaves the account untouched.
    pub fn debit(&mut self, amount: Money, policy: BalancePolicy) -> Result<Money, Money> {
        if amount <= self.current_balance {
            self.current_balance = round_money(self.current_balance - amount);
            return Ok(Decimal::ZERO);
        }

        match policy {
            BalancePolicy::Reject => Err(self.current_balance),
            BalancePolicy::Floor => {
                let unfunded = round_money(amount - self.current_balance);
                self.current_balance = Decimal::ZERO;
                self.shortfall = round_money(self.shortfall + unfunded);
                Ok(unfunded)
            }
        }
    }
}

/// Shared behaviour of bookmakers and exchanges.
pub trait Provider {
    /// The provider's side.
    const KIND: ProviderKind;

    fn name(&self) -> &str;

    /// Commission charged on winnings, as a percent.
    fn commission(&self) -> Decimal;

    fn account(&self) -> &Account;

    fn account_mut(&mut self) -> &mut Account;

    /// Commission as a fraction for the calculator.
    fn commission_rate(&self) -> Rate {
        percent_to_rate(self.commission())
    }

    /// Debit the account, turning a rejected debit into a domain error.
    fn debit(&mut self, amount: Money, policy: BalancePolicy) -> Result<Money, InvalidStateError> {
        let name = self.name().to_string();
        self.account_mut()
            .debit(amount, policy)
            .map_err(|available| InvalidStateError::InsufficientFunds {
                kind: Self::KIND,
                name,
                required: amount,
                available,
            })
    }
}

/// Normalise a display name for uniqueness comparisons.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "name" });
    }
    Ok(trimmed.to_string())
}

fn validate_commission(percent: Decimal) -> Result<Decimal, ValidationError> {
    if percent < Decimal::ZERO || percent >= Decimal::ONE_HUNDRED {
        return Err(ValidationError::CommissionPercentOutOfRange { percent });
    }
    Ok(percent)
}

/// A betting-site account where back bets are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmaker {
    id: BookmakerId,
    name: String,
    #[serde(flatten)]
    account: Account,
    commission: Decimal,
    created_at: DateTime<Utc>,
}

impl Bookmaker {
    /// Create an empty bookmaker account.
    pub fn try_new(name: &str, commission: Decimal) -> Result<Self, ValidationError> {
        Ok(Self {
            id: BookmakerId::new(),
            name: validate_name(name)?,
            account: Account::default(),
            commission: validate_commission(commission)?,
            created_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &BookmakerId {
        &self.id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn current_balance(&self) -> Money {
        self.account.current_balance()
    }

    #[must_use]
    pub fn total_deposits(&self) -> Money {
        self.account.total_deposits()
    }
}

impl Provider for Bookmaker {
    const KIND: ProviderKind = ProviderKind::Bookmaker;

    fn name(&self) -> &str {
        &self.name
    }

    fn commission(&self) -> Decimal {
        self.commission
    }

    fn account(&self) -> &Account {
        &self.account
    }

    fn account_mut(&mut self) -> &mut Account {
        &mut self.account
    }
}

/// A betting-exchange account where lay bets are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    id: ExchangeId,
    name: String,
    #[serde(flatten)]
    account: Account,
    exposure: Money,
    commission: Decimal,
    created_at: DateTime<Utc>,
}

impl Exchange {
    /// Create an empty exchange account.
    pub fn try_new(name: &str, commission: Decimal) -> Result<Self, ValidationError> {
        Ok(Self {
            id: ExchangeId::new(),
            name: validate_name(name)?,
            account: Account::default(),
            exposure: Decimal::ZERO,
            commission: validate_commission(commission)?,
            created_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &ExchangeId {
        &self.id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn current_balance(&self) -> Money {
        self.account.current_balance()
    }

    #[must_use]
    pub fn total_deposits(&self) -> Money {
        self.account.total_deposits()
    }

    /// Liability reserved for unsettled lay bets.
    #[must_use]
    pub fn exposure(&self) -> Money {
        self.exposure
    }

    /// Reserve liability for a newly placed lay bet.
    pub fn add_exposure(&mut self, liability: Money) {
        self.exposure = round_money(self.exposure + liability);
    }

    /// Release liability when a lay bet settles, floored at zero.
    pub fn release_exposure(&mut self, liability: Money) {
        self.exposure = round_money(self.exposure - liability).max(Decimal::ZERO);
    }
}

impl Provider for Exchange {
    const KIND: ProviderKind = ProviderKind::Exchange;

    fn name(&self) -> &str {
        &self.name
    }

    fn commission(&self) -> Decimal {
        self.commission
    }

    fn account(&self) -> &Account {
        &self.account
    }

    fn account_mut(&mut self) -> &mut Account {
        &mut self.account
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn refund_settles_shortfall_before_balance() {
        let mut account = Account::default();
        account.deposit(dec!(30));
        assert_eq!(account.debit(dec!(50), BalancePolicy::Floor), Ok(dec!(20)));

        account.refund(dec!(50));
        assert_eq!(account.current_balance(), dec!(30));
        assert_eq!(account.shortfall(), dec!(0));

        account.refund(dec!(5));
        assert_eq!(account.current_balance(), dec!(35));
    }

    #[test]
    fn try_new_trims_and_rejects_empty_names() {
        let bookmaker = Bookmaker::try_new("  Bet365 ", dec!(0)).unwrap();
        assert_eq!(bookmaker.name(), "Bet365");

        let err = Exchange::try_new("   ", dec!(2)).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "name" });
    }

    #[test]
    fn try_new_rejects_commission_outside_percent_range() {
        assert!(matches!(
            Exchange::try_new("Smarkets", dec!(100)),
            Err(ValidationError::CommissionPercentOutOfRange { .. })
        ));
        assert!(matches!(
            Bookmaker::try_new("Coral", dec!(-1)),
            Err(ValidationError::CommissionPercentOutOfRange { .. })
        ));
    }

    #[test]
    fn commission_rate_is_fraction_of_percent() {
        let exchange = Exchange::try_new("Smarkets", dec!(2.0)).unwrap();
        assert_eq!(exchange.commission_rate(), dec!(0.02));
    }

    #[test]
    fn deposit_raises_deposits_and_balance() {
        let mut account = Account::default();
        account.deposit(dec!(100));
        account.deposit(dec!(25.50));

        assert_eq!(account.total_deposits(), dec!(125.50));
        assert_eq!(account.current_balance(), dec!(125.50));
    }

    #[test]
    fn covered_debit_has_no_shortfall() {
        let mut account = Account::default();
        account.deposit(dec!(50));

        assert_eq!(account.debit(dec!(20), BalancePolicy::Floor), Ok(dec!(0)));
        assert_eq!(account.current_balance(), dec!(30));
        assert_eq!(account.shortfall(), dec!(0));
    }

    #[test]
    fn floor_policy_clamps_and_records_shortfall() {
        let mut account = Account::default();
        account.deposit(dec!(30));

        assert_eq!(account.debit(dec!(45), BalancePolicy::Floor), Ok(dec!(15)));
        assert_eq!(account.current_balance(), dec!(0));
        assert_eq!(account.shortfall(), dec!(15));
    }

    #[test]
    fn reject_policy_leaves_account_untouched() {
        let mut account = Account::default();
        account.deposit(dec!(30));

        assert_eq!(account.debit(dec!(45), BalancePolicy::Reject), Err(dec!(30)));
        assert_eq!(account.current_balance(), dec!(30));
    }

    #[test]
    fn provider_debit_reports_insufficient_funds() {
        let mut bookmaker = Bookmaker::try_new("Coral", dec!(0)).unwrap();
        bookmaker.account_mut().deposit(dec!(10));

        let err = bookmaker.debit(dec!(20), BalancePolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            InvalidStateError::InsufficientFunds {
                kind: ProviderKind::Bookmaker,
                name: "Coral".into(),
                required: dec!(20),
                available: dec!(10),
            }
        );
    }

    #[test]
    fn reconcile_overwrites_balance_and_clears_shortfall() {
        let mut account = Account::default();
        account.debit(dec!(5), BalancePolicy::Floor).unwrap();
        account.reconcile(dec!(42.1));

        assert_eq!(account.current_balance(), dec!(42.10));
        assert_eq!(account.shortfall(), dec!(0));
    }

    #[test]
    fn release_exposure_never_goes_negative() {
        let mut exchange = Exchange::try_new("Betdaq", dec!(5)).unwrap();
        exchange.add_exposure(dec!(10));
        exchange.release_exposure(dec!(12.5));
        assert_eq!(exchange.exposure(), dec!(0));
    }

    #[test]
    fn name_key_ignores_case_and_padding() {
        assert_eq!(name_key(" Sky Bet "), name_key("sky bet"));
    }

    #[test]
    fn exchange_serializes_flat_camel_case_record() {
        let exchange = Exchange::try_new("Matchbook", dec!(1)).unwrap();
        let value = serde_json::to_value(&exchange).unwrap();

        assert!(value.get("currentBalance").is_some());
        assert!(value.get("totalDeposits").is_some());
        assert!(value.get("exposure").is_some());
        assert!(value.get("account").is_none());
    }
}
