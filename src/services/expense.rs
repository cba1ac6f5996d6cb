//! Expense ledger service
//!
//! Validates and applies mutations of shared expenses. Every check happens
//! before the collection is touched, so a rejected mutation leaves the
//! ledger exactly as it was.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::identifier_matches;
use crate::error::{SplitError, SplitResult};
use crate::models::{
    Currency, Expense, ExpenseCategory, ExpenseId, GroupId, Money, Settlement, UserId,
};
use crate::storage::LedgerRepository;

/// Service for shared expense management
pub struct ExpenseService<'a> {
    ledger: &'a LedgerRepository,
}

/// Options for filtering expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Only expenses of this group
    pub group_id: Option<GroupId>,
    /// Only expenses this user paid for or shares
    pub user_id: Option<UserId>,
    pub category: Option<ExpenseCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Include drafts (excluded by default)
    pub include_drafts: bool,
    /// Keep only the most recent N expenses
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_drafts(mut self) -> Self {
        self.include_drafts = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for creating a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub description: String,
    pub amount: Money,
    pub currency: Currency,
    pub paid_by: UserId,
    pub split_between: Vec<UserId>,
    pub group_id: Option<GroupId>,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub is_draft: bool,
}

/// Changes to an existing expense; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub currency: Option<Currency>,
    pub paid_by: Option<UserId>,
    pub split_between: Option<Vec<UserId>>,
    pub category: Option<ExpenseCategory>,
    pub date: Option<NaiveDate>,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(ledger: &'a LedgerRepository) -> Self {
        Self { ledger }
    }

    /// Add an expense to the ledger
    pub fn add(&self, input: CreateExpenseInput) -> SplitResult<Expense> {
        let mut expense = Expense::new(
            input.amount,
            input.currency,
            input.paid_by,
            input.split_between,
            input.date,
        )
        .with_description(input.description.trim())
        .with_category(input.category);
        expense.group_id = input.group_id;
        expense.is_draft = input.is_draft;

        self.check(&expense)?;
        self.ledger.expenses.upsert(expense.clone())?;

        info!(expense = %expense.id, amount = %expense.amount, currency = %expense.currency, draft = expense.is_draft, "expense added");
        Ok(expense)
    }

    /// Apply changes to an expense
    ///
    /// Fails with `SplitError::Locked` once the expense has been settled
    /// against.
    pub fn update(&self, id: ExpenseId, input: UpdateExpenseInput) -> SplitResult<Expense> {
        let current = self.require(id)?;
        self.ensure_unlocked(&current)?;

        let mut expense = current;
        if let Some(description) = input.description {
            expense.description = description.trim().to_string();
        }
        if let Some(amount) = input.amount {
            expense.amount = amount;
        }
        if let Some(currency) = input.currency {
            expense.currency = currency;
        }
        if let Some(paid_by) = input.paid_by {
            expense.paid_by = paid_by;
        }
        if let Some(split) = input.split_between {
            expense.split_between = split.into_iter().collect();
        }
        if let Some(category) = input.category {
            expense.category = category;
        }
        if let Some(date) = input.date {
            expense.date = date;
        }
        expense.touch();

        self.check(&expense)?;
        self.ledger.expenses.upsert(expense.clone())?;

        info!(expense = %expense.id, "expense updated");
        Ok(expense)
    }

    /// Remove an expense from the ledger
    pub fn delete(&self, id: ExpenseId) -> SplitResult<Expense> {
        let expense = self.require(id)?;
        self.ensure_unlocked(&expense)?;

        self.ledger.expenses.delete(id)?;
        info!(expense = %expense.id, "expense deleted");
        Ok(expense)
    }

    /// Turn a draft into a live expense
    pub fn publish(&self, id: ExpenseId) -> SplitResult<Expense> {
        let mut expense = self.require(id)?;
        if !expense.is_draft {
            return Err(SplitError::Validation(format!(
                "Expense {} is not a draft",
                expense.id
            )));
        }

        expense.is_draft = false;
        expense.touch();
        self.ledger.expenses.upsert(expense.clone())?;
        Ok(expense)
    }

    pub fn get(&self, id: ExpenseId) -> SplitResult<Option<Expense>> {
        self.ledger.expenses.get(id)
    }

    /// Find an expense by full id or id prefix
    pub fn find(&self, identifier: &str) -> SplitResult<Option<Expense>> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return self.ledger.expenses.get(id);
        }
        Ok(self
            .ledger
            .expenses
            .find_all(|e| identifier_matches(e.id.as_uuid(), "exp-", identifier))?
            .into_iter()
            .next())
    }

    /// List expenses, oldest first
    pub fn list(&self, filter: ExpenseFilter) -> SplitResult<Vec<Expense>> {
        let mut expenses = match (filter.group_id, filter.user_id) {
            (Some(group_id), _) => self.ledger.expenses.get_by_group(group_id)?,
            (None, Some(user)) => self.ledger.expenses.get_involving(user)?,
            (None, None) => self.ledger.expenses.get_all()?,
        };

        if let Some(user) = filter.user_id {
            expenses.retain(|e| e.involves(user));
        }
        if let Some(category) = filter.category {
            expenses.retain(|e| e.category == category);
        }
        if let Some(start) = filter.start_date {
            expenses.retain(|e| e.date >= start);
        }
        if let Some(end) = filter.end_date {
            expenses.retain(|e| e.date <= end);
        }
        if !filter.include_drafts {
            expenses.retain(|e| !e.is_draft);
        }
        if let Some(limit) = filter.limit {
            let skip = expenses.len().saturating_sub(limit);
            expenses.drain(..skip);
        }

        Ok(expenses)
    }

    /// Whether a settlement has been recorded against this expense
    ///
    /// That is the case for a non-draft expense when its payer and one of
    /// its splitters settled with each other after it was created.
    pub fn is_locked(&self, expense: &Expense) -> SplitResult<bool> {
        if expense.is_draft {
            return Ok(false);
        }
        let settlements = self.ledger.settlements.involving(expense.paid_by)?;
        Ok(settlements
            .iter()
            .any(|s| settles_against(s, expense)))
    }

    fn ensure_unlocked(&self, expense: &Expense) -> SplitResult<()> {
        if self.is_locked(expense)? {
            return Err(SplitError::Locked(format!(
                "{} has been settled against and can no longer change",
                expense.id
            )));
        }
        Ok(())
    }

    fn require(&self, id: ExpenseId) -> SplitResult<Expense> {
        self.ledger
            .expenses
            .get(id)?
            .ok_or_else(|| SplitError::expense_not_found(id.to_string()))
    }

    /// Validate an expense against the model rules and the directory
    fn check(&self, expense: &Expense) -> SplitResult<()> {
        expense
            .validate()
            .map_err(|e| SplitError::Validation(e.to_string()))?;

        // An empty directory means users are not being tracked
        if self.ledger.users.count()? > 0 {
            for user in expense.participants() {
                if !self.ledger.users.exists(user)? {
                    return Err(SplitError::user_not_found(user.to_string()));
                }
            }
        }

        if let Some(group_id) = expense.group_id {
            let group = self
                .ledger
                .groups
                .get(group_id)?
                .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))?;

            let outsiders: BTreeSet<UserId> = expense
                .participants()
                .into_iter()
                .filter(|u| !group.contains(*u))
                .collect();
            if !outsiders.is_empty() {
                return Err(SplitError::Validation(format!(
                    "{} participant(s) are not members of group '{}'",
                    outsiders.len(),
                    group.name
                )));
            }
        }

        debug!(expense = %expense.id, "expense passed validation");
        Ok(())
    }
}

fn settles_against(settlement: &Settlement, expense: &Expense) -> bool {
    if settlement.created_at <= expense.created_at {
        return false;
    }
    let counterparty = if settlement.from_user_id == expense.paid_by {
        settlement.to_user_id
    } else if settlement.to_user_id == expense.paid_by {
        settlement.from_user_id
    } else {
        return false;
    };
    counterparty != expense.paid_by && expense.split_between.contains(&counterparty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Group;
    use chrono::{Duration, Utc};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn input(paid_by: UserId, split: Vec<UserId>, amount: i64) -> CreateExpenseInput {
        CreateExpenseInput {
            description: "Dinner".into(),
            amount: Money::from_major(amount),
            currency: Currency::Usd,
            paid_by,
            split_between: split,
            group_id: None,
            category: ExpenseCategory::Food,
            date: date(1),
            is_draft: false,
        }
    }

    #[test]
    fn test_add_expense() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let (a, b) = (UserId::new(), UserId::new());

        let expense = service.add(input(a, vec![a, b], 30)).unwrap();
        assert_eq!(service.get(expense.id).unwrap(), Some(expense));
    }

    #[test]
    fn test_rejects_empty_split() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);

        let err = service.add(input(UserId::new(), vec![], 30)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ledger.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let a = UserId::new();

        assert!(service.add(input(a, vec![a], 0)).unwrap_err().is_validation());
        assert!(service.add(input(a, vec![a], -5)).unwrap_err().is_validation());
    }

    #[test]
    fn test_rejects_amount_beyond_limit() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let (a, b) = (UserId::new(), UserId::new());

        let mut huge = input(a, vec![a, b], 0);
        huge.amount = Money::parse("79228162514264337593543950335").unwrap();
        assert!(service.add(huge).unwrap_err().is_validation());
        assert_eq!(ledger.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_rejects_unknown_user_when_directory_is_used() {
        let ledger = LedgerRepository::in_memory();
        let known = crate::models::User::new("Alice");
        ledger.users.upsert(known.clone()).unwrap();
        let service = ExpenseService::new(&ledger);

        let err = service
            .add(input(known.id, vec![known.id, UserId::new()], 20))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_group_membership_is_enforced() {
        let ledger = LedgerRepository::in_memory();
        let (a, b, outsider) = (UserId::new(), UserId::new(), UserId::new());
        let group = Group::new("Flat", [a, b]);
        ledger.groups.upsert(group.clone()).unwrap();
        let service = ExpenseService::new(&ledger);

        let mut inside = input(a, vec![a, b], 40);
        inside.group_id = Some(group.id);
        assert!(service.add(inside).is_ok());

        let mut outside = input(a, vec![a, outsider], 40);
        outside.group_id = Some(group.id);
        assert!(service.add(outside).unwrap_err().is_validation());
    }

    #[test]
    fn test_update_and_delete() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let (a, b) = (UserId::new(), UserId::new());
        let expense = service.add(input(a, vec![a, b], 30)).unwrap();

        let updated = service
            .update(
                expense.id,
                UpdateExpenseInput {
                    amount: Some(Money::from_major(45)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, Money::from_major(45));
        assert_eq!(updated.split_between, expense.split_between);

        service.delete(expense.id).unwrap();
        assert!(service.get(expense.id).unwrap().is_none());
        assert!(service.delete(expense.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_invalid_update_leaves_expense_untouched() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let a = UserId::new();
        let expense = service.add(input(a, vec![a], 30)).unwrap();

        let result = service.update(
            expense.id,
            UpdateExpenseInput {
                split_between: Some(vec![]),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(service.get(expense.id).unwrap(), Some(expense));
    }

    #[test]
    fn test_settled_expense_is_locked() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let (a, b) = (UserId::new(), UserId::new());
        let expense = service.add(input(a, vec![a, b], 30)).unwrap();

        let mut payment = Settlement::new(b, a, Money::from_major(15), Currency::Usd, date(2));
        payment.created_at = expense.created_at + Duration::seconds(1);
        ledger.settlements.append(&payment).unwrap();

        assert!(service.is_locked(&expense).unwrap());
        assert!(matches!(
            service.delete(expense.id),
            Err(SplitError::Locked(_))
        ));
        assert!(matches!(
            service.update(expense.id, UpdateExpenseInput::default()),
            Err(SplitError::Locked(_))
        ));
    }

    #[test]
    fn test_earlier_settlement_does_not_lock() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let (a, b) = (UserId::new(), UserId::new());

        let mut earlier = Settlement::new(b, a, Money::from_major(5), Currency::Usd, date(1));
        earlier.created_at = Utc::now() - Duration::days(1);
        ledger.settlements.append(&earlier).unwrap();

        let expense = service.add(input(a, vec![a, b], 30)).unwrap();
        assert!(!service.is_locked(&expense).unwrap());
    }

    #[test]
    fn test_drafts_are_hidden_until_published() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let a = UserId::new();
        let mut draft = input(a, vec![a], 12);
        draft.is_draft = true;
        let draft = service.add(draft).unwrap();

        assert!(service.list(ExpenseFilter::new()).unwrap().is_empty());
        assert_eq!(service.list(ExpenseFilter::new().with_drafts()).unwrap().len(), 1);

        service.publish(draft.id).unwrap();
        assert_eq!(service.list(ExpenseFilter::new()).unwrap().len(), 1);
        assert!(service.publish(draft.id).unwrap_err().is_validation());
    }

    #[test]
    fn test_find_by_short_id() {
        let ledger = LedgerRepository::in_memory();
        let service = ExpenseService::new(&ledger);
        let a = UserId::new();
        let expense = service.add(input(a, vec![a], 12)).unwrap();

        let found = service.find(&expense.id.to_string()).unwrap();
        assert_eq!(found.map(|e| e.id), Some(expense.id));
    }
}
