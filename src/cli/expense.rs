//! Shared expense CLI commands

use clap::Subcommand;

use super::{parse_amount, parse_category, parse_currency, parse_date, parse_date_str};
use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{SplitError, SplitResult};
use crate::models::{Expense, UserId};
use crate::services::{
    CreateExpenseInput, DirectoryService, ExpenseFilter, ExpenseService, UpdateExpenseInput,
};
use crate::storage::LedgerRepository;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add a shared expense
    Add {
        /// What the money was spent on
        description: String,
        /// Amount paid (e.g., "45.50")
        amount: String,
        /// Currency code, defaults to the base currency
        #[arg(short = 'x', long)]
        currency: Option<String>,
        /// Who paid (name or ID), defaults to the current user
        #[arg(short, long)]
        paid_by: Option<String>,
        /// Who shares the cost (names or IDs), defaults to the group members
        #[arg(short, long = "split", num_args = 1..)]
        split: Vec<String>,
        /// Group name or ID
        #[arg(short, long)]
        group: Option<String>,
        /// Category name
        #[arg(short, long)]
        category: Option<String>,
        /// Expense date, defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Save as a draft (excluded from balances)
        #[arg(long)]
        draft: bool,
    },
    /// List expenses
    List {
        /// Filter by group name or ID
        #[arg(short, long)]
        group: Option<String>,
        /// Filter by user name or ID
        #[arg(short, long)]
        user: Option<String>,
        /// Filter by category name
        #[arg(short = 'C', long)]
        category: Option<String>,
        /// Start date
        #[arg(long)]
        from: Option<String>,
        /// End date
        #[arg(long)]
        to: Option<String>,
        /// Include drafts
        #[arg(long)]
        drafts: bool,
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show expense details
    Show {
        /// Expense ID
        id: String,
    },
    /// Edit an expense
    Edit {
        /// Expense ID
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short = 'x', long)]
        currency: Option<String>,
        #[arg(short, long)]
        paid_by: Option<String>,
        #[arg(short, long = "split", num_args = 1..)]
        split: Vec<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,
    },
    /// Publish a draft expense
    Publish {
        /// Expense ID
        id: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    ledger: &LedgerRepository,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> SplitResult<()> {
    let service = ExpenseService::new(ledger);
    let directory = DirectoryService::new(ledger);

    match cmd {
        ExpenseCommands::Add {
            description,
            amount,
            currency,
            paid_by,
            split,
            group,
            category,
            date,
            draft,
        } => {
            let group = group.map(|g| directory.resolve_group(&g)).transpose()?;
            let paid_by = match paid_by {
                Some(name) => directory.resolve_user(&name)?.id,
                None => settings.require_current_user()?,
            };
            let split_between = if !split.is_empty() {
                resolve_users(&directory, &split)?
            } else if let Some(group) = &group {
                group.members.iter().copied().collect()
            } else {
                return Err(SplitError::Validation(
                    "Name who shares the expense with --split, or pass --group".into(),
                ));
            };

            let input = CreateExpenseInput {
                description,
                amount: parse_amount(&amount)?,
                currency: parse_currency(currency.as_deref(), settings.base_currency)?,
                paid_by,
                split_between,
                group_id: group.map(|g| g.id),
                category: parse_category(category.as_deref())?,
                date: parse_date(date.as_deref(), &settings.date_format)?,
                is_draft: draft,
            };

            let expense = service.add(input)?;
            let kind = if expense.is_draft { "draft" } else { "expense" };
            println!(
                "Added {}: {} {} paid by {} ({})",
                kind,
                expense.amount.format_in(expense.currency),
                expense.description,
                directory.label(expense.paid_by),
                expense.id
            );
        }
        ExpenseCommands::List {
            group,
            user,
            category,
            from,
            to,
            drafts,
            limit,
        } => {
            let mut filter = ExpenseFilter::new().limit(limit);
            if let Some(group) = group {
                filter = filter.group(directory.resolve_group(&group)?.id);
            }
            if let Some(user) = user {
                filter = filter.user(directory.resolve_user(&user)?.id);
            }
            if category.is_some() {
                filter = filter.category(parse_category(category.as_deref())?);
            }
            if from.is_some() || to.is_some() {
                let start = match from {
                    Some(s) => parse_date_str(&s, &settings.date_format)?,
                    None => chrono::NaiveDate::MIN,
                };
                let end = match to {
                    Some(s) => parse_date_str(&s, &settings.date_format)?,
                    None => chrono::NaiveDate::MAX,
                };
                filter = filter.date_range(start, end);
            }
            if drafts {
                filter = filter.with_drafts();
            }

            let expenses = service.list(filter)?;
            print!("{}", format_expense_list(&expenses, |u| directory.label(u)));
        }
        ExpenseCommands::Show { id } => {
            let expense = find(&service, &id)?;
            let group_name = match expense.group_id {
                Some(group_id) => ledger.groups.get(group_id)?.map(|g| g.name),
                None => None,
            };
            let locked = service.is_locked(&expense)?;
            print!(
                "{}",
                format_expense_details(&expense, group_name.as_deref(), locked, |u| {
                    directory.label(u)
                })
            );
        }
        ExpenseCommands::Edit {
            id,
            description,
            amount,
            currency,
            paid_by,
            split,
            category,
            date,
        } => {
            let expense = find(&service, &id)?;
            let input = UpdateExpenseInput {
                description,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                currency: currency
                    .as_deref()
                    .map(|c| parse_currency(Some(c), expense.currency))
                    .transpose()?,
                paid_by: paid_by
                    .map(|p| directory.resolve_user(&p).map(|u| u.id))
                    .transpose()?,
                split_between: if split.is_empty() {
                    None
                } else {
                    Some(resolve_users(&directory, &split)?)
                },
                category: category
                    .as_deref()
                    .map(|c| parse_category(Some(c)))
                    .transpose()?,
                date: date
                    .as_deref()
                    .map(|d| parse_date_str(d, &settings.date_format))
                    .transpose()?,
            };

            let updated = service.update(expense.id, input)?;
            println!("Updated expense: {}", updated.id);
        }
        ExpenseCommands::Delete { id } => {
            let expense = find(&service, &id)?;
            let removed = service.delete(expense.id)?;
            println!("Deleted expense: {}", removed.id);
        }
        ExpenseCommands::Publish { id } => {
            let expense = find(&service, &id)?;
            let published = service.publish(expense.id)?;
            println!("Published expense: {}", published.id);
        }
    }

    Ok(())
}

fn find(service: &ExpenseService<'_>, identifier: &str) -> SplitResult<Expense> {
    service
        .find(identifier)?
        .ok_or_else(|| SplitError::expense_not_found(identifier))
}

fn resolve_users(directory: &DirectoryService<'_>, names: &[String]) -> SplitResult<Vec<UserId>> {
    names
        .iter()
        .map(|n| directory.resolve_user(n).map(|u| u.id))
        .collect()
}
