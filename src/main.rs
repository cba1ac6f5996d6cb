use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use splitshare::cli::{
    handle_balances_command, handle_budget_command, handle_convert_command,
    handle_expense_command, handle_export_command, handle_group_command, handle_history_command,
    handle_personal_command, handle_rates_command, handle_settle_command, handle_suggest_command,
    handle_user_command, BalancesArgs, BudgetCommands, ConvertArgs, ExpenseCommands, ExportArgs,
    GroupCommands, PersonalCommands, RatesCommands, SettleArgs, UserCommands,
};
use splitshare::config::{SplitPaths, Settings};
use splitshare::currency::CurrencyConverter;
use splitshare::models::Currency;
use splitshare::services::DirectoryService;
use splitshare::storage::LedgerRepository;
use splitshare::SplitError;

#[derive(Parser)]
#[command(
    name = "splitshare",
    version,
    about = "Split shared expenses with roommates",
    long_about = "SplitShare keeps a multi-currency ledger of shared expenses and \
                  settlements, and tells you who owes whom."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show or change configuration
    Config {
        /// User whose balances are shown (name or ID)
        #[arg(long)]
        current_user: Option<String>,
        /// Currency balances are reported in
        #[arg(long)]
        base_currency: Option<String>,
        /// Currency of home-country personal records
        #[arg(long)]
        home_currency: Option<String>,
        /// Currency of personal records made abroad
        #[arg(long)]
        local_currency: Option<String>,
        /// Live exchange rate endpoint
        #[arg(long)]
        rates_url: Option<String>,
        /// Default log filter (e.g., "info", "splitshare=debug")
        #[arg(long)]
        log_level: Option<String>,
    },

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Group management commands
    #[command(subcommand)]
    Group(GroupCommands),

    /// Shared expense commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Personal income and expense commands
    #[command(subcommand)]
    Personal(PersonalCommands),

    /// Record a payment between two users
    Settle(SettleArgs),

    /// Show settlement history
    History {
        /// User name or ID, defaults to the current user
        user: Option<String>,
    },

    /// Show balances
    Balances(BalancesArgs),

    /// Suggest payments that settle everyone up
    Suggest,

    /// Convert an amount between currencies
    Convert(ConvertArgs),

    /// Exchange rate commands
    #[command(subcommand)]
    Rates(RatesCommands),

    /// Budget commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Export data
    Export(ExportArgs),
}

impl Commands {
    /// Whether the command can change the ledger collections
    fn mutates(&self) -> bool {
        matches!(
            self,
            Commands::Init
                | Commands::User(_)
                | Commands::Group(_)
                | Commands::Expense(_)
                | Commands::Personal(_)
                | Commands::Budget(_)
        )
    }

    /// Whether the command writes to the data directory at all
    fn writes_ledger(&self) -> bool {
        self.mutates() || matches!(self, Commands::Settle(_))
    }

    /// Whether the command converts between currencies
    fn uses_rates(&self) -> bool {
        matches!(
            self,
            Commands::Settle(_)
                | Commands::Balances(_)
                | Commands::Suggest
                | Commands::Personal(_)
                | Commands::Budget(_)
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = SplitPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ledger = Arc::new(LedgerRepository::open(&paths)?);
    ledger.load_all_or_empty()?;

    let converter = CurrencyConverter::from_settings(&settings.rates);

    let Some(command) = cli.command else {
        println!("SplitShare - split shared expenses with roommates");
        println!();
        println!("Run 'splitshare --help' for usage information.");
        if !paths.is_initialized() {
            println!("Run 'splitshare init' to get started.");
        }
        return Ok(());
    };

    if command.uses_rates() && settings.rates.enabled && !converter.is_fresh() {
        converter.refresh().await;
    }
    if command.writes_ledger() {
        ledger.ensure_writable()?;
    }
    let mutates = command.mutates();

    match command {
        Commands::Init => {
            println!("Initializing SplitShare at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  splitshare user add <name>");
            println!("  splitshare config --current-user <name>");
        }
        Commands::Config {
            current_user,
            base_currency,
            home_currency,
            local_currency,
            rates_url,
            log_level,
        } => {
            let mut changed = false;
            if let Some(user) = current_user {
                settings.current_user = Some(DirectoryService::new(&ledger).resolve_user(&user)?.id);
                changed = true;
            }
            for (value, slot) in [
                (base_currency, &mut settings.base_currency),
                (home_currency, &mut settings.home_currency),
                (local_currency, &mut settings.local_currency),
            ] {
                if let Some(code) = value {
                    *slot = code
                        .parse::<Currency>()
                        .map_err(|e| SplitError::Validation(e.to_string()))?;
                    changed = true;
                }
            }
            if let Some(url) = rates_url {
                settings.rates.api_url = Some(url);
                changed = true;
            }
            if let Some(level) = log_level {
                settings.log_level = level;
                changed = true;
            }
            if changed {
                settings.save(&paths)?;
                println!("Configuration saved.");
                println!();
            }
            print_config(&paths, &settings, &ledger);
        }
        Commands::User(cmd) => handle_user_command(&ledger, cmd)?,
        Commands::Group(cmd) => handle_group_command(&ledger, cmd)?,
        Commands::Expense(cmd) => handle_expense_command(&ledger, &settings, cmd)?,
        Commands::Personal(cmd) => handle_personal_command(&ledger, &settings, &converter, cmd)?,
        Commands::Settle(args) => handle_settle_command(&ledger, &settings, &converter, args)?,
        Commands::History { user } => handle_history_command(&ledger, &settings, &converter, user)?,
        Commands::Balances(args) => handle_balances_command(&ledger, &settings, &converter, args)?,
        Commands::Suggest => handle_suggest_command(&ledger, &settings, &converter)?,
        Commands::Convert(args) => handle_convert_command(&settings, &converter, args).await?,
        Commands::Rates(cmd) => handle_rates_command(&settings, &converter, cmd).await?,
        Commands::Budget(cmd) => handle_budget_command(&ledger, &settings, &converter, cmd)?,
        Commands::Export(args) => handle_export_command(&ledger, args)?,
    }

    if mutates {
        ledger.flush_in_background().await??;
    }

    Ok(())
}

fn print_config(paths: &SplitPaths, settings: &Settings, ledger: &LedgerRepository) {
    println!("SplitShare Configuration");
    println!("========================");
    println!("Base directory: {}", paths.base_dir().display());
    println!("Data directory: {}", paths.data_dir().display());
    println!("Settlement log: {}", paths.settlements_file().display());
    println!();
    println!("Settings:");
    match settings.current_user {
        Some(user) => println!(
            "  Current user:   {}",
            DirectoryService::new(ledger).label(user)
        ),
        None => println!("  Current user:   (not set)"),
    }
    println!("  Base currency:  {}", settings.base_currency);
    println!("  Home currency:  {}", settings.home_currency);
    println!("  Local currency: {}", settings.local_currency);
    println!(
        "  Live rates:     {}",
        settings.rates.api_url.as_deref().unwrap_or("(fallback table only)")
    );
    println!("  Log level:      {}", settings.log_level);
}
