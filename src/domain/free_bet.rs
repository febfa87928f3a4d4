//! Promotional free bets.
//!
//! Free bets carry no balance effect of their own; they are status records
//! that are consumed when a bet of type free is placed against them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{InvalidStateError, ValidationError};
use super::id::{BookmakerId, FreeBetId};
use super::money::{round_money, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreeBetStatus {
    Pending,
    Used,
    Expired,
}

impl fmt::Display for FreeBetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Used => "used",
            Self::Expired => "expired",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBet {
    id: FreeBetId,
    bookmaker_id: BookmakerId,
    value: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    notes: String,
    status: FreeBetStatus,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    used_at: Option<DateTime<Utc>>,
}

impl FreeBet {
    /// Create a pending free bet worth `value`.
    pub fn try_new(
        bookmaker_id: BookmakerId,
        value: Money,
        expiry_date: Option<DateTime<Utc>>,
        notes: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if value <= Money::ZERO {
            return Err(ValidationError::NonPositiveAmount {
                field: "value",
                value,
            });
        }
        Ok(Self {
            id: FreeBetId::new(),
            bookmaker_id,
            value: round_money(value),
            expiry_date,
            notes: notes.into(),
            status: FreeBetStatus::Pending,
            created_at: Utc::now(),
            used_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> &FreeBetId {
        &self.id
    }

    #[must_use]
    pub fn bookmaker_id(&self) -> &BookmakerId {
        &self.bookmaker_id
    }

    #[must_use]
    pub fn value(&self) -> Money {
        self.value
    }

    #[must_use]
    pub fn expiry_date(&self) -> Option<DateTime<Utc>> {
        self.expiry_date
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub fn status(&self) -> FreeBetStatus {
        self.status
    }

    #[must_use]
    pub fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    /// Pending and past its expiry date at `now`.
    #[must_use]
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.status == FreeBetStatus::Pending && self.expiry_date.is_some_and(|expiry| expiry < now)
    }

    /// Consume the free bet.
    pub fn mark_used(&mut self, at: DateTime<Utc>) -> Result<(), InvalidStateError> {
        self.ensure_pending()?;
        self.status = FreeBetStatus::Used;
        self.used_at = Some(at);
        Ok(())
    }

    /// Mark a lapsed free bet as expired.
    pub fn mark_expired(&mut self) -> Result<(), InvalidStateError> {
        self.ensure_pending()?;
        self.status = FreeBetStatus::Expired;
        Ok(())
    }

    /// Return a consumed free bet to pending, e.g. when its bet is deleted.
    pub(crate) fn restore(&mut self) {
        self.status = FreeBetStatus::Pending;
        self.used_at = None;
    }

    fn ensure_pending(&self) -> Result<(), InvalidStateError> {
        if self.status != FreeBetStatus::Pending {
            return Err(InvalidStateError::FreeBetNotPending {
                id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }
}
