//! Budget collection, persisted to `budgets.json`

use chrono::NaiveDate;

use super::repository::{Record, Repository};
use crate::error::SplitError;
use crate::models::{Budget, BudgetId, BudgetPeriod, ExpenseCategory, UserId};

pub type BudgetRepository = Repository<Budget>;

impl Record for Budget {
    type Id = BudgetId;
    type SortKey = (NaiveDate, &'static str);
    const KEY: &'static str = "budgets.json";
    const COLLECTION: &'static str = "budgets";

    fn id(&self) -> BudgetId {
        self.id
    }

    fn sort_key(&self) -> Self::SortKey {
        (self.period.start_date(), self.category.name())
    }
}

impl Repository<Budget> {
    /// The budget a user set for a category and period
    pub fn find(
        &self,
        user: UserId,
        category: ExpenseCategory,
        period: &BudgetPeriod,
    ) -> Result<Option<Budget>, SplitError> {
        Ok(self
            .find_all(|b| b.user_id == user && b.category == category && &b.period == period)?
            .into_iter()
            .next())
    }

    /// Budgets of a user
    pub fn get_by_user(&self, user: UserId) -> Result<Vec<Budget>, SplitError> {
        self.find_all(|b| b.user_id == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Money};
    use crate::storage::store::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_find_by_category_and_period() {
        let repo = BudgetRepository::new(Arc::new(MemoryStore::new()));
        let user = UserId::new();
        let january = BudgetPeriod::monthly(2025, 1);
        let food = Budget::new(
            user,
            ExpenseCategory::Food,
            Money::from_major(200),
            Currency::Usd,
            january.clone(),
        );
        repo.upsert(food.clone()).unwrap();

        assert_eq!(
            repo.find(user, ExpenseCategory::Food, &january).unwrap(),
            Some(food)
        );
        assert!(repo
            .find(user, ExpenseCategory::Rent, &january)
            .unwrap()
            .is_none());
        assert!(repo
            .find(user, ExpenseCategory::Food, &BudgetPeriod::monthly(2025, 2))
            .unwrap()
            .is_none());
    }
}
