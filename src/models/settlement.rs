//! Settlement model
//!
//! A settlement is a recorded payment from one user to another. Settlements
//! are history: they are appended once and never edited or removed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::{GroupId, SettlementId, UserId};
use super::money::Money;

/// A payment that reduces what `from_user_id` owes `to_user_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount: Money,
    pub currency: Currency,
    pub date: NaiveDate,

    /// Group whose settle-up screen recorded this payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Settlement {
    /// Create a new settlement
    pub fn new(
        from_user_id: UserId,
        to_user_id: UserId,
        amount: Money,
        currency: Currency,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: SettlementId::new(),
            from_user_id,
            to_user_id,
            amount,
            currency,
            date,
            group_id: None,
            note: None,
            created_at: Utc::now(),
        }
    }

    /// Attribute the settlement to a group (builder style)
    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Attach a note (builder style)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check whether a user paid or received this settlement
    pub fn involves(&self, user: UserId) -> bool {
        self.from_user_id == user || self.to_user_id == user
    }

    /// Validate the settlement
    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_positive() {
            return Err(format!(
                "Settlement amount must be greater than zero (got {})",
                self.amount
            ));
        }
        if self.amount.exceeds_limit() {
            return Err(format!(
                "Settlement amount {} exceeds the maximum of {}",
                self.amount,
                Money::MAX
            ));
        }
        if self.from_user_id == self.to_user_id {
            return Err("A user cannot settle with themselves".into());
        }
        Ok(())
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {}",
            self.date.format("%Y-%m-%d"),
            self.from_user_id,
            self.to_user_id,
            self.amount.format_in(self.currency)
        )
    }
}
