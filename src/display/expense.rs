//! Expense, personal record and settlement formatting

use crate::models::{Expense, PersonalExpense, Settlement, UserId};

use super::truncate;

/// Format shared expenses as a register
pub fn format_expense_list(expenses: &[Expense], label: impl Fn(UserId) -> String) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:10} {:24} {:>14} {:12} {}\n",
        "ID", "Date", "Description", "Amount", "Paid by", "Split"
    ));
    output.push_str(&"-".repeat(86));
    output.push('\n');

    for expense in expenses {
        let description = if expense.description.is_empty() {
            "(no description)".to_string()
        } else {
            expense.description.clone()
        };
        let draft = if expense.is_draft { " [draft]" } else { "" };

        output.push_str(&format!(
            "{:12} {} {:24} {:>14} {:12} {}{}\n",
            expense.id.to_string(),
            expense.date.format("%Y-%m-%d"),
            truncate(&description, 24),
            expense.amount.format_in(expense.currency),
            truncate(&label(expense.paid_by), 12),
            expense.split_between.len(),
            draft
        ));
    }

    output
}

/// Format one expense with its per-person shares
pub fn format_expense_details(
    expense: &Expense,
    group_name: Option<&str>,
    locked: bool,
    label: impl Fn(UserId) -> String,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!(
        "Amount:      {} {}\n",
        expense.amount.format_in(expense.currency),
        expense.currency
    ));
    if !expense.description.is_empty() {
        output.push_str(&format!("Description: {}\n", expense.description));
    }
    output.push_str(&format!("Category:    {}\n", expense.category));
    output.push_str(&format!("Paid by:     {}\n", label(expense.paid_by)));
    if let Some(name) = group_name {
        output.push_str(&format!("Group:       {}\n", name));
    }

    let status = match (expense.is_draft, locked) {
        (true, _) => "draft",
        (false, true) => "settled (locked)",
        (false, false) => "published",
    };
    output.push_str(&format!("Status:      {}\n", status));

    output.push_str("\nSplit between:\n");
    let share = expense.amount.divide(expense.split_between.len());
    for user in &expense.split_between {
        match share {
            Some(share) => output.push_str(&format!(
                "  {:16} {}\n",
                label(*user),
                share.format_in(expense.currency)
            )),
            None => output.push_str(&format!("  {}\n", label(*user))),
        }
    }

    output
}

/// Format a user's personal records
pub fn format_personal_list(records: &[PersonalExpense]) -> String {
    if records.is_empty() {
        return "No personal records found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:10} {:8} {:24} {:>14} {:14}\n",
        "ID", "Date", "Type", "Description", "Amount", "Category"
    ));
    output.push_str(&"-".repeat(86));
    output.push('\n');

    for record in records {
        output.push_str(&format!(
            "{:12} {} {:8} {:24} {:>14} {:14}\n",
            record.id.to_string(),
            record.date.format("%Y-%m-%d"),
            record.kind.to_string(),
            truncate(&record.description, 24),
            record.amount.format_in(record.currency),
            record.category.name()
        ));
    }

    output
}

/// Format settlement history, oldest first
pub fn format_settlement_list(
    settlements: &[Settlement],
    label: impl Fn(UserId) -> String,
) -> String {
    if settlements.is_empty() {
        return "No settlements recorded.\n".to_string();
    }

    let mut output = String::new();
    for settlement in settlements {
        let note = match &settlement.note {
            Some(note) => format!("  ({})", note),
            None => String::new(),
        };
        output.push_str(&format!(
            "{} {} paid {} {}{}\n",
            settlement.date.format("%Y-%m-%d"),
            label(settlement.from_user_id),
            label(settlement.to_user_id),
            settlement.amount.format_in(settlement.currency),
            note
        ));
    }
    output
}
