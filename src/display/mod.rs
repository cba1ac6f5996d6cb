//! Display formatting for terminal output
//!
//! Every formatter returns a `String`; the CLI decides where it goes.
//! User ids are turned into names through a caller-supplied label function.

pub mod balance;
pub mod budget;
pub mod directory;
pub mod expense;

pub use balance::{
    format_friend_balances, format_group_balances, format_net_positions, format_suggestions,
    format_totals,
};
pub use budget::format_budget_list;
pub use directory::{format_group_list, format_user_list};
pub use expense::{
    format_expense_details, format_expense_list, format_personal_list, format_settlement_list,
};

/// Truncate a string to a maximum number of characters, with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Groceries", 20), "Groceries");
        assert_eq!(truncate("Weekend trip to the coast", 12), "Weekend t...");
        assert_eq!(truncate("abcdef", 2), "..");
    }
}
