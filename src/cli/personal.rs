//! Personal record CLI commands

use clap::Subcommand;

use super::{parse_amount, parse_category, parse_date, parse_date_str};
use crate::config::Settings;
use crate::currency::CurrencyConverter;
use crate::display::format_personal_list;
use crate::error::{SplitError, SplitResult};
use crate::models::EntryKind;
use crate::services::{CreatePersonalInput, PersonalExpenseService};
use crate::storage::LedgerRepository;

/// Personal record subcommands
#[derive(Subcommand)]
pub enum PersonalCommands {
    /// Record personal spending or income for the current user
    Add {
        /// Description
        description: String,
        /// Amount (e.g., "12.50")
        amount: String,
        /// Record income instead of an expense
        #[arg(long)]
        income: bool,
        /// Recorded in the home-country currency instead of the local one
        #[arg(long)]
        home: bool,
        /// Category name
        #[arg(short, long)]
        category: Option<String>,
        /// Date, defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List the current user's records
    List {
        /// Start date
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// End date
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    /// Delete a record
    Delete {
        /// Record ID
        id: String,
    },
}

/// Handle a personal record command
pub fn handle_personal_command(
    ledger: &LedgerRepository,
    settings: &Settings,
    converter: &CurrencyConverter,
    cmd: PersonalCommands,
) -> SplitResult<()> {
    let user = settings.require_current_user()?;
    let service = PersonalExpenseService::new(ledger, converter, settings.currency_context());

    match cmd {
        PersonalCommands::Add {
            description,
            amount,
            income,
            home,
            category,
            date,
        } => {
            let input = CreatePersonalInput {
                user_id: user,
                description,
                amount: parse_amount(&amount)?,
                kind: if income {
                    EntryKind::Income
                } else {
                    EntryKind::Expense
                },
                category: parse_category(category.as_deref())?,
                is_home_country: home,
                date: parse_date(date.as_deref(), &settings.date_format)?,
            };

            let record = service.add(input)?;
            println!(
                "Recorded {}: {} ({})",
                record.kind,
                record.amount.format_in(record.currency),
                record.id
            );
        }
        PersonalCommands::List { from, to } => {
            let range = match (from, to) {
                (Some(from), Some(to)) => Some((
                    parse_date_str(&from, &settings.date_format)?,
                    parse_date_str(&to, &settings.date_format)?,
                )),
                _ => None,
            };
            print!("{}", format_personal_list(&service.list(user, range)?));
        }
        PersonalCommands::Delete { id } => {
            let record = service
                .find(&id)?
                .ok_or_else(|| SplitError::personal_expense_not_found(&id))?;
            let removed = service.delete(record.id)?;
            println!("Deleted record: {}", removed.id);
        }
    }

    Ok(())
}
