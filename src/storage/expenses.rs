//! Expense and personal expense collections
//!
//! Persisted to `expenses.json` and `personal_expenses.json`.

use chrono::{DateTime, NaiveDate, Utc};

use super::repository::{Record, Repository};
use crate::error::SplitError;
use crate::models::{Expense, ExpenseId, GroupId, PersonalExpense, PersonalExpenseId, UserId};

pub type ExpenseRepository = Repository<Expense>;
pub type PersonalExpenseRepository = Repository<PersonalExpense>;

impl Record for Expense {
    type Id = ExpenseId;
    type SortKey = (NaiveDate, DateTime<Utc>);
    const KEY: &'static str = "expenses.json";
    const COLLECTION: &'static str = "expenses";

    fn id(&self) -> ExpenseId {
        self.id
    }

    fn sort_key(&self) -> Self::SortKey {
        (self.date, self.created_at)
    }
}

impl Record for PersonalExpense {
    type Id = PersonalExpenseId;
    type SortKey = (NaiveDate, DateTime<Utc>);
    const KEY: &'static str = "personal_expenses.json";
    const COLLECTION: &'static str = "personal_expenses";

    fn id(&self) -> PersonalExpenseId {
        self.id
    }

    fn sort_key(&self) -> Self::SortKey {
        (self.date, self.created_at)
    }
}

impl Repository<Expense> {
    /// Expenses recorded in a group
    pub fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Expense>, SplitError> {
        self.find_all(|e| e.group_id == Some(group_id))
    }

    /// Expenses a user paid for or shares
    pub fn get_involving(&self, user: UserId) -> Result<Vec<Expense>, SplitError> {
        self.find_all(|e| e.involves(user))
    }
}

impl Repository<PersonalExpense> {
    /// Records owned by a user
    pub fn get_by_user(&self, user: UserId) -> Result<Vec<PersonalExpense>, SplitError> {
        self.find_all(|e| e.user_id == user)
    }
}
