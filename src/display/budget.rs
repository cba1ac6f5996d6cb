//! Budget formatting

use rust_decimal::Decimal;

use crate::models::{Budget, BudgetStatus};

/// Format budgets with their utilisation
pub fn format_budget_list(budgets: &[Budget]) -> String {
    if budgets.is_empty() {
        return "No budgets set.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:14} {:22} {:>12} {:>12} {:>6}  {}\n",
        "Category", "Period", "Spent", "Limit", "Used", "Status"
    ));
    output.push_str(&"-".repeat(82));
    output.push('\n');

    for budget in budgets {
        let percent = (budget.utilization() * Decimal::ONE_HUNDRED).round();
        let marker = match budget.status() {
            BudgetStatus::OnTrack => "",
            BudgetStatus::NearLimit => " !",
            BudgetStatus::OverBudget => " !!",
        };
        output.push_str(&format!(
            "{:14} {:22} {:>12} {:>12} {:>5}%  {}{}\n",
            budget.category.name(),
            budget.period.to_string(),
            budget.spent.format_in(budget.currency),
            budget.limit.format_in(budget.currency),
            percent,
            budget.status(),
            marker
        ));
    }
    output
}
