//! Cash movements into, out of and between provider accounts.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::id::TransactionId;
use super::money::{round_money, Money};
use super::provider::{name_key, Account, BalancePolicy, ProviderKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money paid in from the bank: raises deposits and balance.
    Deposit,
    /// Money paid out to the bank: lowers the balance.
    Withdrawal,
    /// Money moved out to another provider: lowers the balance.
    Transfer,
    /// Money received from another provider: raises the balance.
    TransferIn,
    /// Absolute overwrite of the balance after checking the provider's site.
    BalanceUpdate,
}

impl TransactionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
            Self::TransferIn => "transfer_in",
            Self::BalanceUpdate => "balance_update",
        }
    }

    /// Apply this movement to an account.
    ///
    /// Returns the unfunded part of an outgoing movement, like
    /// [`Account::debit`].
    pub fn apply(
        self,
        account: &mut Account,
        amount: Money,
        policy: BalancePolicy,
    ) -> Result<Money, Money> {
        match self {
            Self::Deposit => {
                account.deposit(amount);
                Ok(Decimal::ZERO)
            }
            Self::TransferIn => {
                account.credit(amount);
                Ok(Decimal::ZERO)
            }
            Self::Withdrawal | Self::Transfer => account.debit(amount, policy),
            Self::BalanceUpdate => {
                account.reconcile(amount);
                Ok(Decimal::ZERO)
            }
        }
    }

    fn validate_amount(self, amount: Money) -> Result<(), ValidationError> {
        match self {
            Self::BalanceUpdate if amount < Decimal::ZERO => Err(ValidationError::NegativeAmount {
                field: "amount",
                value: amount,
            }),
            Self::BalanceUpdate => Ok(()),
            _ if amount <= Decimal::ZERO => Err(ValidationError::NonPositiveAmount {
                field: "amount",
                value: amount,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cash movement to record, as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub provider_name: String,
    pub provider_kind: ProviderKind,
    pub kind: TransactionKind,
    pub amount: Money,
    /// Defaults to now.
    pub date: Option<DateTime<Utc>>,
    pub notes: String,
}

impl TransactionDraft {
    #[must_use]
    pub fn new(
        provider_kind: ProviderKind,
        provider_name: impl Into<String>,
        kind: TransactionKind,
        amount: Money,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            provider_kind,
            kind,
            amount,
            date: None,
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Money moved from one provider account to another.
///
/// Recorded as a [`TransactionKind::Transfer`] on the source and a
/// [`TransactionKind::TransferIn`] on the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    pub from_kind: ProviderKind,
    pub from_name: String,
    pub to_kind: ProviderKind,
    pub to_name: String,
    pub amount: Money,
    pub notes: String,
}

impl TransferDraft {
    #[must_use]
    pub fn new(
        from: (ProviderKind, &str),
        to: (ProviderKind, &str),
        amount: Money,
    ) -> Self {
        Self {
            from_kind: from.0,
            from_name: from.1.to_string(),
            to_kind: to.0,
            to_name: to.1.to_string(),
            amount,
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// The outgoing and incoming legs, sharing date and notes.
    pub fn legs(&self) -> Result<(TransactionDraft, TransactionDraft), ValidationError> {
        if self.from_kind == self.to_kind && name_key(&self.from_name) == name_key(&self.to_name) {
            return Err(ValidationError::TransferToSelf {
                name: self.from_name.trim().to_string(),
            });
        }
        let date = Utc::now();
        let out = TransactionDraft::new(self.from_kind, &*self.from_name, TransactionKind::Transfer, self.amount)
            .with_date(date)
            .with_notes(self.notes.clone());
        let incoming =
            TransactionDraft::new(self.to_kind, &*self.to_name, TransactionKind::TransferIn, self.amount)
                .with_date(date)
                .with_notes(self.notes.clone());
        Ok((out, incoming))
    }
}

/// An audit-trail entry for a cash movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionId,
    provider_name: String,
    #[serde(rename = "providerType")]
    provider_kind: ProviderKind,
    #[serde(rename = "transactionType")]
    kind: TransactionKind,
    amount: Money,
    date: DateTime<Utc>,
    #[serde(default)]
    notes: String,
}

impl Transaction {
    /// Validate a draft into a record. The provider name is stored as resolved.
    pub fn try_from_draft(
        draft: TransactionDraft,
        provider_name: &str,
    ) -> Result<Self, ValidationError> {
        draft.kind.validate_amount(draft.amount)?;
        Ok(Self {
            id: TransactionId::new(),
            provider_name: provider_name.to_string(),
            provider_kind: draft.provider_kind,
            kind: draft.kind,
            amount: round_money(draft.amount),
            date: draft.date.unwrap_or_else(Utc::now),
            notes: draft.notes,
        })
    }

    #[must_use]
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    #[must_use]
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider_kind
    }

    #[must_use]
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    #[must_use]
    pub fn amount(&self) -> Money {
        self.amount
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account_with(balance: Money) -> Account {
        let mut account = Account::default();
        account.deposit(balance);
        account
    }

    #[test]
    fn deposit_raises_deposits_and_balance() {
        let mut account = Account::default();
        TransactionKind::Deposit
            .apply(&mut account, dec!(100), BalancePolicy::Floor)
            .unwrap();

        assert_eq!(account.total_deposits(), dec!(100));
        assert_eq!(account.current_balance(), dec!(100));
    }

    #[test]
    fn withdrawal_and_transfer_lower_balance_only() {
        for kind in [TransactionKind::Withdrawal, TransactionKind::Transfer] {
            let mut account = account_with(dec!(100));
            kind.apply(&mut account, dec!(40), BalancePolicy::Floor).unwrap();

            assert_eq!(account.total_deposits(), dec!(100));
            assert_eq!(account.current_balance(), dec!(60));
        }
    }

    #[test]
    fn transfer_in_raises_balance_only() {
        let mut account = account_with(dec!(10));
        TransactionKind::TransferIn
            .apply(&mut account, dec!(5), BalancePolicy::Floor)
            .unwrap();

        assert_eq!(account.total_deposits(), dec!(10));
        assert_eq!(account.current_balance(), dec!(15));
    }

    #[test]
    fn balance_update_overwrites() {
        let mut account = account_with(dec!(80));
        TransactionKind::BalanceUpdate
            .apply(&mut account, dec!(72.5), BalancePolicy::Floor)
            .unwrap();

        assert_eq!(account.total_deposits(), dec!(80));
        assert_eq!(account.current_balance(), dec!(72.50));
    }

    #[test]
    fn draft_validation_rejects_bad_amounts() {
        let draft = TransactionDraft::new(
            ProviderKind::Bookmaker,
            "Coral",
            TransactionKind::Deposit,
            dec!(0),
        );
        assert!(Transaction::try_from_draft(draft, "Coral").is_err());

        let zero_update = TransactionDraft::new(
            ProviderKind::Exchange,
            "Smarkets",
            TransactionKind::BalanceUpdate,
            dec!(0),
        );
        assert!(Transaction::try_from_draft(zero_update, "Smarkets").is_ok());
    }

    #[test]
    fn transfer_legs_share_date_and_notes() {
        let transfer = TransferDraft::new(
            (ProviderKind::Exchange, "Smarkets"),
            (ProviderKind::Bookmaker, "Coral"),
            dec!(30),
        )
        .with_notes("rebalance");
        let (out, incoming) = transfer.legs().unwrap();

        assert_eq!(out.kind, TransactionKind::Transfer);
        assert_eq!(incoming.kind, TransactionKind::TransferIn);
        assert_eq!(out.date, incoming.date);
        assert_eq!(incoming.notes, "rebalance");
    }

    #[test]
    fn transfer_to_same_account_is_rejected() {
        let transfer = TransferDraft::new(
            (ProviderKind::Bookmaker, "Coral"),
            (ProviderKind::Bookmaker, " coral"),
            dec!(5),
        );
        assert!(matches!(
            transfer.legs(),
            Err(ValidationError::TransferToSelf { .. })
        ));
    }

    #[test]
    fn record_serializes_with_provider_and_transaction_type() {
        let draft = TransactionDraft::new(
            ProviderKind::Exchange,
            "Smarkets",
            TransactionKind::TransferIn,
            dec!(12),
        );
        let tx = Transaction::try_from_draft(draft, "Smarkets").unwrap();
        let value = serde_json::to_value(&tx).unwrap();

        assert_eq!(value["providerType"], "exchange");
        assert_eq!(value["transactionType"], "transfer_in");
    }
}
