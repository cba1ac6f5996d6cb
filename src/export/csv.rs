//! CSV export of the shared ledger and settlement history

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{SplitError, SplitResult};
use crate::models::{Currency, Money};
use crate::services::DirectoryService;
use crate::storage::LedgerRepository;

#[derive(Serialize)]
struct ExpenseRow {
    id: String,
    date: NaiveDate,
    description: String,
    category: &'static str,
    amount: String,
    currency: &'static str,
    paid_by: String,
    split_between: String,
    group: String,
    draft: bool,
}

#[derive(Serialize)]
struct SettlementRow {
    id: String,
    date: NaiveDate,
    from: String,
    to: String,
    amount: String,
    currency: &'static str,
    group: String,
    note: String,
}

/// Amount rounded to the currency's minor unit, without a symbol
fn plain_amount(amount: Money, currency: Currency) -> String {
    format!(
        "{:.*}",
        usize::from(currency.minor_units()),
        amount.round_for(currency).amount()
    )
}

fn export_error(e: csv::Error) -> SplitError {
    SplitError::Export(e.to_string())
}

/// Export every expense, drafts included, oldest first
pub fn export_expenses_csv<W: Write>(ledger: &LedgerRepository, writer: W) -> SplitResult<()> {
    let directory = DirectoryService::new(ledger);
    let mut csv = csv::Writer::from_writer(writer);

    for expense in ledger.expenses.get_all()? {
        let group = match expense.group_id {
            Some(id) => ledger
                .groups
                .get(id)?
                .map(|g| g.name)
                .unwrap_or_else(|| id.to_string()),
            None => String::new(),
        };
        let split_between = expense
            .split_between
            .iter()
            .map(|u| directory.label(*u))
            .collect::<Vec<_>>()
            .join(";");

        csv.serialize(ExpenseRow {
            id: expense.id.to_string(),
            date: expense.date,
            description: expense.description.clone(),
            category: expense.category.name(),
            amount: plain_amount(expense.amount, expense.currency),
            currency: expense.currency.code(),
            paid_by: directory.label(expense.paid_by),
            split_between,
            group,
            draft: expense.is_draft,
        })
        .map_err(export_error)?;
    }

    csv.flush()
        .map_err(|e| SplitError::Export(e.to_string()))?;
    Ok(())
}

/// Export the settlement history in recording order
pub fn export_settlements_csv<W: Write>(ledger: &LedgerRepository, writer: W) -> SplitResult<()> {
    let directory = DirectoryService::new(ledger);
    let mut csv = csv::Writer::from_writer(writer);

    for settlement in ledger.settlements.read_all()? {
        csv.serialize(SettlementRow {
            id: settlement.id.to_string(),
            date: settlement.date,
            from: directory.label(settlement.from_user_id),
            to: directory.label(settlement.to_user_id),
            amount: plain_amount(settlement.amount, settlement.currency),
            currency: settlement.currency.code(),
            group: settlement
                .group_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            note: settlement.note.clone().unwrap_or_default(),
        })
        .map_err(export_error)?;
    }

    csv.flush()
        .map_err(|e| SplitError::Export(e.to_string()))?;
    Ok(())
}
