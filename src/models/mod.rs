//! Core data models for SplitShare
//!
//! This module contains the data structures of the shared-expense domain:
//! expenses, personal records, groups, users, settlements and budgets.

pub mod budget;
pub mod category;
pub mod currency;
pub mod expense;
pub mod group;
pub mod ids;
pub mod money;
pub mod period;
pub mod personal_expense;
pub mod settlement;

pub use budget::{Budget, BudgetStatus};
pub use category::ExpenseCategory;
pub use currency::{Currency, UnknownCurrency};
pub use expense::{Expense, ExpenseValidationError};
pub use group::{Group, User};
pub use ids::{BudgetId, ExpenseId, GroupId, PersonalExpenseId, SettlementId, UserId};
pub use money::{Money, MoneyParseError};
pub use period::{BudgetPeriod, PeriodParseError};
pub use personal_expense::{CurrencyContext, EntryKind, PersonalExpense};
pub use settlement::Settlement;
