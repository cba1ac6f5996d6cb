//! Personal income and expense service
//!
//! Each record locks its exchange rate when it is created, so later rate
//! changes never re-price it.

use chrono::NaiveDate;
use tracing::info;

use super::identifier_matches;
use crate::currency::CurrencyConverter;
use crate::error::{SplitError, SplitResult};
use crate::models::{
    CurrencyContext, EntryKind, ExpenseCategory, Money, PersonalExpense, PersonalExpenseId,
    UserId,
};
use crate::storage::LedgerRepository;

/// Input for creating a personal record
#[derive(Debug, Clone)]
pub struct CreatePersonalInput {
    pub user_id: UserId,
    pub description: String,
    pub amount: Money,
    pub kind: EntryKind,
    pub category: ExpenseCategory,
    pub is_home_country: bool,
    pub date: NaiveDate,
}

/// Service for a user's own records
pub struct PersonalExpenseService<'a> {
    ledger: &'a LedgerRepository,
    converter: &'a CurrencyConverter,
    context: CurrencyContext,
}

impl<'a> PersonalExpenseService<'a> {
    pub fn new(
        ledger: &'a LedgerRepository,
        converter: &'a CurrencyConverter,
        context: CurrencyContext,
    ) -> Self {
        Self {
            ledger,
            converter,
            context,
        }
    }

    /// Add a record with its exchange rate locked at today's value
    pub fn add(&self, input: CreatePersonalInput) -> SplitResult<PersonalExpense> {
        let mut record = PersonalExpense::new(
            input.user_id,
            input.amount,
            input.kind,
            self.context,
            input.is_home_country,
            input.date,
        )
        .with_description(input.description.trim())
        .with_category(input.category);

        record.validate().map_err(SplitError::Validation)?;

        let rate = self.converter.effective_rate(&record);
        record.lock_exchange_rate(rate);

        self.ledger.personal_expenses.upsert(record.clone())?;
        info!(record = %record.id, currency = %record.currency, rate = %rate, "personal record added");
        Ok(record)
    }

    /// Remove a record
    pub fn delete(&self, id: PersonalExpenseId) -> SplitResult<PersonalExpense> {
        let record = self
            .ledger
            .personal_expenses
            .get(id)?
            .ok_or_else(|| SplitError::personal_expense_not_found(id.to_string()))?;

        self.ledger.personal_expenses.delete(id)?;
        Ok(record)
    }

    /// Find a record by full id or id prefix
    pub fn find(&self, identifier: &str) -> SplitResult<Option<PersonalExpense>> {
        if let Ok(id) = identifier.parse::<PersonalExpenseId>() {
            return self.ledger.personal_expenses.get(id);
        }
        Ok(self
            .ledger
            .personal_expenses
            .find_all(|e| identifier_matches(e.id.as_uuid(), "pex-", identifier))?
            .into_iter()
            .next())
    }

    /// A user's records, oldest first, optionally within a date range
    pub fn list(
        &self,
        user: UserId,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> SplitResult<Vec<PersonalExpense>> {
        let mut records = self.ledger.personal_expenses.get_by_user(user)?;
        if let Some((start, end)) = range {
            records.retain(|r| r.date >= start && r.date <= end);
        }
        Ok(records)
    }
}
