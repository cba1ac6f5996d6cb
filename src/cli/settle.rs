//! Settlement and balance CLI commands

use clap::Args;

use super::{parse_amount, parse_currency, parse_date};
use crate::balance::net_positions;
use crate::config::Settings;
use crate::currency::Rates;
use crate::display::{
    format_friend_balances, format_group_balances, format_net_positions, format_settlement_list,
    format_suggestions, format_totals,
};
use crate::error::SplitResult;
use crate::models::UserId;
use crate::services::{BalanceService, DirectoryService, RecordSettlementInput, SettlementService};
use crate::storage::LedgerRepository;

/// Arguments for recording a settlement
#[derive(Args)]
pub struct SettleArgs {
    /// Who receives the payment (name or ID)
    pub to: String,
    /// Amount paid (e.g., "10.00")
    pub amount: String,
    /// Who pays (name or ID), defaults to the current user
    #[arg(short, long)]
    pub from: Option<String>,
    /// Currency code, defaults to the base currency
    #[arg(short = 'x', long)]
    pub currency: Option<String>,
    /// Settle within a group (name or ID)
    #[arg(short, long)]
    pub group: Option<String>,
    /// Payment date, defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
    /// Note
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Arguments for the balances view
#[derive(Args)]
pub struct BalancesArgs {
    /// Show every user's net position instead of the current user's view
    #[arg(short, long)]
    pub all: bool,
}

/// Record a settlement
pub fn handle_settle_command(
    ledger: &LedgerRepository,
    settings: &Settings,
    rates: &dyn Rates,
    args: SettleArgs,
) -> SplitResult<()> {
    let directory = DirectoryService::new(ledger);
    let service = SettlementService::new(ledger, rates, settings.base_currency);

    let from = match args.from {
        Some(name) => directory.resolve_user(&name)?.id,
        None => settings.require_current_user()?,
    };
    let to = directory.resolve_user(&args.to)?.id;
    let group_id = args
        .group
        .map(|g| directory.resolve_group(&g).map(|g| g.id))
        .transpose()?;

    let receipt = service.record(RecordSettlementInput {
        from_user_id: from,
        to_user_id: to,
        amount: parse_amount(&args.amount)?,
        currency: parse_currency(args.currency.as_deref(), settings.base_currency)?,
        date: parse_date(args.date.as_deref(), &settings.date_format)?,
        group_id,
        note: args.note,
    })?;

    let settlement = &receipt.settlement;
    println!(
        "Recorded: {} paid {} {} ({})",
        directory.label(settlement.from_user_id),
        directory.label(settlement.to_user_id),
        settlement.amount.format_in(settlement.currency),
        settlement.id
    );
    if let Some(warning) = &receipt.warning {
        println!("Warning: {}", warning);
    }

    Ok(())
}

/// Show settlement history for a user
pub fn handle_history_command(
    ledger: &LedgerRepository,
    settings: &Settings,
    rates: &dyn Rates,
    user: Option<String>,
) -> SplitResult<()> {
    let directory = DirectoryService::new(ledger);
    let user = match user {
        Some(name) => directory.resolve_user(&name)?.id,
        None => settings.require_current_user()?,
    };

    let history = SettlementService::new(ledger, rates, settings.base_currency).history(user)?;
    print!("{}", format_settlement_list(&history, |u| directory.label(u)));
    Ok(())
}

/// Show balances from the current user's perspective, or everyone's nets
pub fn handle_balances_command(
    ledger: &LedgerRepository,
    settings: &Settings,
    rates: &dyn Rates,
    args: BalancesArgs,
) -> SplitResult<()> {
    let directory = DirectoryService::new(ledger);
    let service = BalanceService::new(ledger, rates, settings.base_currency);
    let currency = service.base_currency();
    let label = |u: UserId| directory.label(u);

    if args.all {
        let positions = net_positions(&service.pairwise()?);
        print!("{}", format_net_positions(&positions, currency, label));
        return Ok(());
    }

    let user = settings.require_current_user()?;
    let groups = service.group_balances(user)?;
    let friends = service.friend_balances(user)?;

    println!("Friends");
    print!("{}", format_friend_balances(&friends, currency, label));
    println!();
    println!("Groups");
    print!(
        "{}",
        format_group_balances(
            &groups,
            currency,
            |g| match ledger.groups.get(g.group_id) {
                Ok(Some(group)) => group.name,
                _ => g.group_id.to_string(),
            },
            label
        )
    );
    println!();
    print!("{}", format_totals(&service.total_balances(user)?, currency));
    Ok(())
}

/// Show payments that would settle everyone up
pub fn handle_suggest_command(
    ledger: &LedgerRepository,
    settings: &Settings,
    rates: &dyn Rates,
) -> SplitResult<()> {
    let directory = DirectoryService::new(ledger);
    let service = BalanceService::new(ledger, rates, settings.base_currency);
    let payments = service.suggestions()?;
    print!(
        "{}",
        format_suggestions(&payments, service.base_currency(), |u| directory.label(u))
    );
    Ok(())
}
