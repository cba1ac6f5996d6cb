//! Spending categories
//!
//! Categories are a closed enumeration so budgets and personal expenses
//! always agree on spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of an expense or budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Groceries,
    Rent,
    Utilities,
    Transport,
    Entertainment,
    Shopping,
    Education,
    Health,
    Travel,
    #[default]
    Other,
}

impl ExpenseCategory {
    /// Every category, in display order
    pub const ALL: [ExpenseCategory; 11] = [
        ExpenseCategory::Food,
        ExpenseCategory::Groceries,
        ExpenseCategory::Rent,
        ExpenseCategory::Utilities,
        ExpenseCategory::Transport,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Shopping,
        ExpenseCategory::Education,
        ExpenseCategory::Health,
        ExpenseCategory::Travel,
        ExpenseCategory::Other,
    ];

    /// Lowercase name used on the command line and in storage
    pub const fn name(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Groceries => "groceries",
            Self::Rent => "rent",
            Self::Utilities => "utilities",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Education => "education",
            Self::Health => "health",
            Self::Travel => "travel",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| format!("Unknown category: '{}'", s.trim()))
    }
}
