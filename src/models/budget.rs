//! Budget model
//!
//! A budget caps personal spending in one category over a period. `spent` is
//! derived from personal expenses and is only ever written by the budget
//! aggregator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ExpenseCategory;
use super::currency::Currency;
use super::ids::{BudgetId, UserId};
use super::money::Money;
use super::period::BudgetPeriod;

/// Default fraction of the limit at which a budget starts warning
pub fn default_alert_threshold() -> Decimal {
    Decimal::new(8, 1)
}

/// A spending budget for one category and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    /// Owner of the budget
    pub user_id: UserId,

    pub category: ExpenseCategory,

    /// Spending cap for the period
    pub limit: Money,

    /// Derived total of matching personal expenses
    #[serde(default)]
    pub spent: Money,

    /// Currency of `limit` and `spent`
    pub currency: Currency,

    pub period: BudgetPeriod,

    /// Fraction of `limit` (0..=1) at which the budget reports `NearLimit`
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: Decimal,

    pub updated_at: DateTime<Utc>,
}

/// How a budget is tracking against its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    OnTrack,
    NearLimit,
    OverBudget,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTrack => write!(f, "on track"),
            Self::NearLimit => write!(f, "near limit"),
            Self::OverBudget => write!(f, "over budget"),
        }
    }
}

impl Budget {
    /// Create a new budget with nothing spent
    pub fn new(
        user_id: UserId,
        category: ExpenseCategory,
        limit: Money,
        currency: Currency,
        period: BudgetPeriod,
    ) -> Self {
        Self {
            id: BudgetId::new(),
            user_id,
            category,
            limit,
            spent: Money::zero(),
            currency,
            period,
            alert_threshold: default_alert_threshold(),
            updated_at: Utc::now(),
        }
    }

    /// Set the alert threshold (builder style)
    pub fn with_alert_threshold(mut self, threshold: Decimal) -> Self {
        self.alert_threshold = threshold;
        self
    }

    /// Amount left before the limit is reached (negative when over)
    pub fn remaining(&self) -> Money {
        self.limit - self.spent
    }

    /// Spent as a fraction of the limit
    pub fn utilization(&self) -> Decimal {
        self.spent
            .amount()
            .checked_div(self.limit.amount())
            .unwrap_or(Decimal::ZERO)
    }

    /// Current status against the limit and alert threshold
    pub fn status(&self) -> BudgetStatus {
        if self.spent > self.limit {
            BudgetStatus::OverBudget
        } else if self.utilization() >= self.alert_threshold {
            BudgetStatus::NearLimit
        } else {
            BudgetStatus::OnTrack
        }
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), String> {
        if !self.limit.is_positive() {
            return Err(format!("Budget limit must be greater than zero (got {})", self.limit));
        }
        if self.limit.exceeds_limit() {
            return Err(format!(
                "Budget limit {} exceeds the maximum of {}",
                self.limit,
                Money::MAX
            ));
        }
        if self.alert_threshold <= Decimal::ZERO || self.alert_threshold > Decimal::ONE {
            return Err(format!(
                "Alert threshold must be between 0 and 1 (got {})",
                self.alert_threshold
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} of {}",
            self.period,
            self.category,
            self.spent.format_in(self.currency),
            self.limit.format_in(self.currency)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(limit: i64, spent: i64) -> Budget {
        let mut budget = Budget::new(
            UserId::new(),
            ExpenseCategory::Food,
            Money::from_major(limit),
            Currency::Usd,
            BudgetPeriod::monthly(2025, 1),
        );
        budget.spent = Money::from_major(spent);
        budget
    }

    #[test]
    fn test_status() {
        assert_eq!(budget(100, 50).status(), BudgetStatus::OnTrack);
        assert_eq!(budget(100, 80).status(), BudgetStatus::NearLimit);
        assert_eq!(budget(100, 100).status(), BudgetStatus::NearLimit);
        assert_eq!(budget(100, 120).status(), BudgetStatus::OverBudget);
    }

    #[test]
    fn test_remaining() {
        assert_eq!(budget(100, 30).remaining(), Money::from_major(70));
        assert_eq!(budget(100, 130).remaining(), Money::from_major(-30));
    }

    #[test]
    fn test_validation() {
        assert!(budget(100, 0).validate().is_ok());
        assert!(budget(0, 0).validate().is_err());
        assert!(budget(2_000_000_000_000, 0).validate().is_err());
        assert!(budget(100, 0)
            .with_alert_threshold(Decimal::new(15, 1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(budget(200, 45).to_string(), "2025-01 food: $45.00 of $200.00");
    }
}
