//! Budget aggregation
//!
//! `Budget.spent` is always derived: [`recompute_spent`] sums the matching
//! personal expenses and the service stores the result.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::currency::CurrencyConverter;
use crate::error::{SplitError, SplitResult};
use crate::models::{
    Budget, BudgetPeriod, Currency, ExpenseCategory, Money, PersonalExpense, UserId,
};
use crate::storage::LedgerRepository;

/// Sum the budget's category spending between two dates (inclusive)
///
/// Only `expense` records of the budget owner count. Each record is converted
/// with its locked rate when it has one.
pub fn recompute_spent(
    budget: &Budget,
    personal_expenses: &[PersonalExpense],
    period_start: NaiveDate,
    period_end: NaiveDate,
    converter: &CurrencyConverter,
) -> Budget {
    let spent: Money = personal_expenses
        .iter()
        .filter(|r| r.user_id == budget.user_id)
        .filter(|r| r.is_expense() && r.category == budget.category)
        .filter(|r| r.date >= period_start && r.date <= period_end)
        .map(|r| converter.convert_record(r, budget.currency))
        .sum();

    let mut updated = budget.clone();
    updated.spent = spent;
    updated.updated_at = Utc::now();
    updated
}

/// Input for setting a budget
#[derive(Debug, Clone)]
pub struct SetBudgetInput {
    pub user_id: UserId,
    pub category: ExpenseCategory,
    pub limit: Money,
    pub currency: Currency,
    pub period: BudgetPeriod,
    pub alert_threshold: Option<Decimal>,
}

/// Service for budget management
pub struct BudgetService<'a> {
    ledger: &'a LedgerRepository,
    converter: &'a CurrencyConverter,
}

impl<'a> BudgetService<'a> {
    pub fn new(ledger: &'a LedgerRepository, converter: &'a CurrencyConverter) -> Self {
        Self { ledger, converter }
    }

    /// Create or replace the budget for a category and period
    pub fn set(&self, input: SetBudgetInput) -> SplitResult<Budget> {
        let mut budget = match self
            .ledger
            .budgets
            .find(input.user_id, input.category, &input.period)?
        {
            Some(mut existing) => {
                existing.limit = input.limit;
                existing.currency = input.currency;
                existing
            }
            None => Budget::new(
                input.user_id,
                input.category,
                input.limit,
                input.currency,
                input.period,
            ),
        };
        if let Some(threshold) = input.alert_threshold {
            budget.alert_threshold = threshold;
        }
        budget.validate().map_err(SplitError::Validation)?;

        let budget = self.refresh(&budget)?;
        self.ledger.budgets.upsert(budget.clone())?;
        Ok(budget)
    }

    /// A user's budgets with freshly recomputed spending
    pub fn list(&self, user: UserId) -> SplitResult<Vec<Budget>> {
        self.ledger
            .budgets
            .get_by_user(user)?
            .iter()
            .map(|b| self.refresh(b))
            .collect()
    }

    /// Recompute and store every budget of a user in a period
    pub fn recompute(&self, user: UserId, period: &BudgetPeriod) -> SplitResult<Vec<Budget>> {
        let mut updated = Vec::new();
        for budget in self.ledger.budgets.get_by_user(user)? {
            if &budget.period != period {
                continue;
            }
            let budget = self.refresh(&budget)?;
            self.ledger.budgets.upsert(budget.clone())?;
            updated.push(budget);
        }
        debug!(user = %user, period = %period, count = updated.len(), "budgets recomputed");
        Ok(updated)
    }

    fn refresh(&self, budget: &Budget) -> SplitResult<Budget> {
        let records = self.ledger.personal_expenses.get_by_user(budget.user_id)?;
        Ok(recompute_spent(
            budget,
            &records,
            budget.period.start_date(),
            budget.period.end_date(),
            self.converter,
        ))
    }
}
