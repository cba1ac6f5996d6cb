//! Exchange rate CLI commands

use clap::{Args, Subcommand};

use super::{parse_amount, parse_currency};
use crate::config::Settings;
use crate::currency::{CurrencyConverter, RateStatus, Rates};
use crate::error::SplitResult;
use crate::models::Currency;

/// Rate subcommands
#[derive(Subcommand)]
pub enum RatesCommands {
    /// Fetch live rates now
    Refresh,
    /// Show the rate of every currency against the base currency
    Show,
}

/// Arguments for a one-off conversion
#[derive(Args)]
pub struct ConvertArgs {
    /// Amount to convert
    pub amount: String,
    /// Source currency code
    pub from: String,
    /// Target currency code, defaults to the base currency
    pub to: Option<String>,
}

/// Handle a rates command
pub async fn handle_rates_command(
    settings: &Settings,
    converter: &CurrencyConverter,
    cmd: RatesCommands,
) -> SplitResult<()> {
    match cmd {
        RatesCommands::Refresh => match converter.refresh().await {
            RateStatus::Live => println!("Live rates refreshed."),
            RateStatus::Degraded => {
                println!("Live rates unavailable; using the built-in fallback table.")
            }
        },
        RatesCommands::Show => {
            let base = settings.base_currency;
            println!("1 {} =", base);
            for currency in Currency::ALL {
                if currency == base {
                    continue;
                }
                println!("  {:>14} {}", converter.rate(base, currency).round_dp(4), currency);
            }
        }
    }
    Ok(())
}

/// Convert an amount between currencies
pub async fn handle_convert_command(
    settings: &Settings,
    converter: &CurrencyConverter,
    args: ConvertArgs,
) -> SplitResult<()> {
    let amount = parse_amount(&args.amount)?;
    let from = parse_currency(Some(&args.from), settings.base_currency)?;
    let to = parse_currency(args.to.as_deref(), settings.base_currency)?;

    let rate = converter.rate_or_fetch(from, to).await;
    let converted = amount * rate;
    println!(
        "{} = {}",
        amount.format_in(from),
        converted.format_in(to)
    );
    Ok(())
}
