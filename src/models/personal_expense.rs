//! Personal (single-owner) income and expense records
//!
//! A personal record may carry a locked exchange rate captured when it was
//! created. Once set the rate is never replaced, so historical totals do not
//! drift when live rates move.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ExpenseCategory;
use super::currency::Currency;
use super::ids::{PersonalExpenseId, UserId};
use super::money::Money;

/// Direction of a personal record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    #[default]
    Expense,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

/// The two currency contexts a user switches between
///
/// Students living abroad record some spending in their home currency and
/// some in the currency of the country they live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyContext {
    pub home: Currency,
    pub local: Currency,
}

impl CurrencyContext {
    pub fn new(home: Currency, local: Currency) -> Self {
        Self { home, local }
    }

    /// Pick the currency for a record
    pub fn currency_for(&self, is_home_country: bool) -> Currency {
        if is_home_country {
            self.home
        } else {
            self.local
        }
    }
}

/// A personal income or expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalExpense {
    pub id: PersonalExpenseId,

    /// Owner of the record
    pub user_id: UserId,

    #[serde(default)]
    pub description: String,

    /// Amount (always positive; direction comes from `kind`)
    pub amount: Money,

    pub currency: Currency,

    #[serde(default)]
    pub category: ExpenseCategory,

    #[serde(rename = "type", default)]
    pub kind: EntryKind,

    /// Whether the record was made in the home-country currency context
    #[serde(default)]
    pub is_home_country: bool,

    /// Units of `currency` per 1 USD, frozen at creation time
    #[serde(default)]
    locked_exchange_rate: Option<Decimal>,

    pub date: NaiveDate,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl PersonalExpense {
    /// Create a new record, resolving its currency from the context
    pub fn new(
        user_id: UserId,
        amount: Money,
        kind: EntryKind,
        context: CurrencyContext,
        is_home_country: bool,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PersonalExpenseId::new(),
            user_id,
            description: String::new(),
            amount,
            currency: context.currency_for(is_home_country),
            category: ExpenseCategory::default(),
            kind,
            is_home_country,
            locked_exchange_rate: None,
            date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description (builder style)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category (builder style)
    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    /// The locked rate, if one has been captured
    pub fn locked_exchange_rate(&self) -> Option<Decimal> {
        self.locked_exchange_rate
    }

    /// Capture the exchange rate for this record
    ///
    /// Returns `false` and leaves the record untouched if a rate is already
    /// locked or the rate is not positive.
    pub fn lock_exchange_rate(&mut self, rate: Decimal) -> bool {
        if self.locked_exchange_rate.is_some() || rate <= Decimal::ZERO {
            return false;
        }
        self.locked_exchange_rate = Some(rate);
        self.updated_at = Utc::now();
        true
    }

    /// Check if this is a spending record
    pub fn is_expense(&self) -> bool {
        self.kind == EntryKind::Expense
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_positive() {
            return Err(format!(
                "Amount must be greater than zero (got {})",
                self.amount
            ));
        }
        if self.amount.exceeds_limit() {
            return Err(format!(
                "Amount {} exceeds the maximum of {}",
                self.amount,
                Money::MAX
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CurrencyContext {
        CurrencyContext::new(Currency::Inr, Currency::Usd)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
    }

    #[test]
    fn test_currency_from_context() {
        let user = UserId::new();
        let home = PersonalExpense::new(user, Money::from_major(500), EntryKind::Expense, context(), true, date());
        let abroad = PersonalExpense::new(user, Money::from_major(5), EntryKind::Expense, context(), false, date());

        assert_eq!(home.currency, Currency::Inr);
        assert_eq!(abroad.currency, Currency::Usd);
    }

    #[test]
    fn test_locked_rate_is_never_overwritten() {
        let mut record = PersonalExpense::new(
            UserId::new(),
            Money::from_major(750),
            EntryKind::Expense,
            context(),
            true,
            date(),
        );

        assert!(record.lock_exchange_rate(Decimal::from(75)));
        assert!(!record.lock_exchange_rate(Decimal::from(83)));
        assert_eq!(record.locked_exchange_rate(), Some(Decimal::from(75)));
    }

    #[test]
    fn test_lock_rejects_non_positive_rate() {
        let mut record = PersonalExpense::new(
            UserId::new(),
            Money::from_major(1),
            EntryKind::Income,
            context(),
            false,
            date(),
        );
        assert!(!record.lock_exchange_rate(Decimal::ZERO));
        assert!(record.locked_exchange_rate().is_none());
    }

    #[test]
    fn test_validation_bounds_amount() {
        let record = |amount| {
            PersonalExpense::new(UserId::new(), amount, EntryKind::Expense, context(), true, date())
        };
        assert!(record(Money::from_major(500)).validate().is_ok());
        assert!(record(Money::zero()).validate().is_err());
        assert!(record(Money::new(Decimal::MAX)).validate().is_err());
    }

    #[test]
    fn test_serialization_uses_type_key() {
        let record = PersonalExpense::new(
            UserId::new(),
            Money::from_major(20),
            EntryKind::Income,
            context(),
            false,
            date(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "income");

        let back: PersonalExpense = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
