//! Budget CLI commands
//!
//! Budgets cap the current user's personal spending per category and period.

use clap::Subcommand;
use rust_decimal::Decimal;

use super::{parse_amount, parse_currency};
use crate::config::Settings;
use crate::currency::CurrencyConverter;
use crate::display::format_budget_list;
use crate::error::{SplitError, SplitResult};
use crate::models::{BudgetPeriod, ExpenseCategory};
use crate::services::{BudgetService, SetBudgetInput};
use crate::storage::LedgerRepository;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the limit for a category
    Set {
        /// Category name
        category: String,
        /// Spending limit (e.g., "300")
        limit: String,
        /// Budget period (e.g., "2025-01", "2025-W03", "2025"), defaults to this month
        #[arg(short, long)]
        period: Option<String>,
        /// Currency code, defaults to the base currency
        #[arg(short = 'x', long)]
        currency: Option<String>,
        /// Fraction of the limit that triggers a warning (e.g., "0.9")
        #[arg(short, long)]
        alert: Option<String>,
    },
    /// List budgets with current spending
    List {
        /// Recompute and store spending for this period only
        #[arg(short, long)]
        period: Option<String>,
    },
}

fn parse_period(value: Option<&str>) -> SplitResult<BudgetPeriod> {
    match value {
        Some(s) => BudgetPeriod::parse(s).map_err(|e| SplitError::Validation(e.to_string())),
        None => Ok(BudgetPeriod::current_month()),
    }
}

/// Handle a budget command
pub fn handle_budget_command(
    ledger: &LedgerRepository,
    settings: &Settings,
    converter: &CurrencyConverter,
    cmd: BudgetCommands,
) -> SplitResult<()> {
    let user = settings.require_current_user()?;
    let service = BudgetService::new(ledger, converter);

    match cmd {
        BudgetCommands::Set {
            category,
            limit,
            period,
            currency,
            alert,
        } => {
            let category: ExpenseCategory = category.parse().map_err(SplitError::Validation)?;
            let alert_threshold = alert
                .map(|a| {
                    a.trim().parse::<Decimal>().map_err(|_| {
                        SplitError::Validation(format!("Invalid alert threshold: '{}'", a))
                    })
                })
                .transpose()?;

            let budget = service.set(SetBudgetInput {
                user_id: user,
                category,
                limit: parse_amount(&limit)?,
                currency: parse_currency(currency.as_deref(), settings.base_currency)?,
                period: parse_period(period.as_deref())?,
                alert_threshold,
            })?;
            println!(
                "Budget for {} in {}: {} of {} spent",
                budget.category,
                budget.period,
                budget.spent.format_in(budget.currency),
                budget.limit.format_in(budget.currency)
            );
        }
        BudgetCommands::List { period } => {
            let budgets = match period {
                Some(p) => service.recompute(user, &parse_period(Some(&p))?)?,
                None => service.list(user)?,
            };
            print!("{}", format_budget_list(&budgets));
        }
    }

    Ok(())
}
