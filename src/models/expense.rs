//! Shared expense model
//!
//! An expense is paid by one user and divided among a set of users. Drafts
//! are stored but take no part in balance computation until published.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::category::ExpenseCategory;
use super::currency::Currency;
use super::ids::{ExpenseId, GroupId, UserId};
use super::money::Money;

/// A shared expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// What the money was spent on
    #[serde(default)]
    pub description: String,

    /// Amount paid (always positive)
    pub amount: Money,

    /// Currency the amount was paid in
    pub currency: Currency,

    /// The user who fronted the money
    pub paid_by: UserId,

    /// Users the cost is divided between; never empty
    pub split_between: BTreeSet<UserId>,

    /// Group this expense belongs to, if any
    #[serde(default)]
    pub group_id: Option<GroupId>,

    /// Spending category
    #[serde(default)]
    pub category: ExpenseCategory,

    /// Date the expense happened
    pub date: NaiveDate,

    /// Drafts are excluded from balances
    #[serde(default)]
    pub is_draft: bool,

    /// When the expense was created
    pub created_at: DateTime<Utc>,

    /// When the expense was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense split between the given users
    pub fn new(
        amount: Money,
        currency: Currency,
        paid_by: UserId,
        split_between: impl IntoIterator<Item = UserId>,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            description: String::new(),
            amount,
            currency,
            paid_by,
            split_between: split_between.into_iter().collect(),
            group_id: None,
            category: ExpenseCategory::default(),
            date,
            is_draft: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description (builder style)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach the expense to a group (builder style)
    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Set the category (builder style)
    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    /// Mark the expense as a draft (builder style)
    pub fn as_draft(mut self) -> Self {
        self.is_draft = true;
        self
    }

    /// Every user touched by this expense: the payer plus the split set
    pub fn participants(&self) -> BTreeSet<UserId> {
        let mut users = self.split_between.clone();
        users.insert(self.paid_by);
        users
    }

    /// Check whether a user is the payer or one of the splitters
    pub fn involves(&self, user: UserId) -> bool {
        self.paid_by == user || self.split_between.contains(&user)
    }

    /// Whether this expense takes part in balance computation
    pub fn counts_toward_balances(&self) -> bool {
        !self.is_draft
    }

    /// Record a modification
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }

        if self.amount.exceeds_limit() {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }

        if self.split_between.is_empty() {
            return Err(ExpenseValidationError::EmptySplit);
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount.format_in(self.currency)
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EmptySplit,
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero (got {})", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Amount {} exceeds the maximum of {}", amount, Money::MAX)
            }
            Self::EmptySplit => write!(f, "An expense must be split between at least one user"),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
