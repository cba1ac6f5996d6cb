//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.
//! Handlers only mutate the in-memory ledger; the binary flushes it.

pub mod budget;
pub mod directory;
pub mod expense;
pub mod export;
pub mod personal;
pub mod rates;
pub mod settle;

pub use budget::{handle_budget_command, BudgetCommands};
pub use directory::{handle_group_command, handle_user_command, GroupCommands, UserCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportArgs, ExportKind};
pub use personal::{handle_personal_command, PersonalCommands};
pub use rates::{handle_convert_command, handle_rates_command, ConvertArgs, RatesCommands};
pub use settle::{
    handle_balances_command, handle_history_command, handle_settle_command,
    handle_suggest_command, BalancesArgs, SettleArgs,
};

use chrono::NaiveDate;

use crate::error::{SplitError, SplitResult};
use crate::models::{Currency, ExpenseCategory, Money, UnknownCurrency};

/// Parse a date in the configured format, defaulting to today
pub(crate) fn parse_date(value: Option<&str>, format: &str) -> SplitResult<NaiveDate> {
    match value {
        Some(s) => parse_date_str(s, format),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub(crate) fn parse_date_str(value: &str, format: &str) -> SplitResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format)
        .or_else(|_| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d"))
        .map_err(|_| {
            SplitError::Validation(format!(
                "Invalid date: '{}'. Use {} or YYYY-MM-DD",
                value, format
            ))
        })
}

pub(crate) fn parse_amount(value: &str) -> SplitResult<Money> {
    Money::parse(value).map_err(|e| {
        SplitError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '45.50' or '100'. Error: {}",
            value, e
        ))
    })
}

/// Parse a currency code, falling back to a default when absent
pub(crate) fn parse_currency(value: Option<&str>, default: Currency) -> SplitResult<Currency> {
    match value {
        Some(code) => code
            .parse()
            .map_err(|e: UnknownCurrency| SplitError::Validation(e.to_string())),
        None => Ok(default),
    }
}

pub(crate) fn parse_category(value: Option<&str>) -> SplitResult<ExpenseCategory> {
    match value {
        Some(name) => name.parse().map_err(SplitError::Validation),
        None => Ok(ExpenseCategory::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_configured_and_iso() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(parse_date(Some("14/03/2025"), "%d/%m/%Y").unwrap(), expected);
        assert_eq!(parse_date(Some("2025-03-14"), "%d/%m/%Y").unwrap(), expected);
        assert!(parse_date(Some("yesterday"), "%Y-%m-%d").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency(Some("eur"), Currency::Usd).unwrap(), Currency::Eur);
        assert_eq!(parse_currency(None, Currency::Inr).unwrap(), Currency::Inr);
        assert!(parse_currency(Some("XYZ"), Currency::Usd)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_parse_amount_and_category() {
        assert_eq!(parse_amount("45.50").unwrap(), Money::from_cents(4550));
        assert!(parse_amount("abc").is_err());
        assert_eq!(parse_category(Some("Rent")).unwrap(), ExpenseCategory::Rent);
        assert_eq!(parse_category(None).unwrap(), ExpenseCategory::Other);
    }
}
