//! Settlement engine
//!
//! Records payments between users. A settlement never edits an expense; it
//! is appended to the history and folded into balances on the next read.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::balance::BalanceCalculator;
use crate::currency::Rates;
use crate::error::{SplitError, SplitResult};
use crate::models::{Currency, GroupId, Money, Settlement, UserId};
use crate::storage::LedgerRepository;

/// Input for recording a settlement
#[derive(Debug, Clone)]
pub struct RecordSettlementInput {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount: Money,
    pub currency: Currency,
    pub date: NaiveDate,
    pub group_id: Option<GroupId>,
    pub note: Option<String>,
}

/// A settlement paid more than was owed at the time it was recorded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverpaymentWarning {
    /// What the payer owed the payee just before, in `currency`
    pub outstanding: Money,
    /// The settlement amount, in `currency`
    pub paid: Money,
    pub currency: Currency,
}

impl std::fmt::Display for OverpaymentWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "payment of {} exceeds the outstanding balance of {}",
            self.paid.format_in(self.currency),
            self.outstanding.format_in(self.currency)
        )
    }
}

/// The recorded settlement plus any non-blocking warning
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub settlement: Settlement,
    pub warning: Option<OverpaymentWarning>,
}

/// Service recording settlements
pub struct SettlementService<'a> {
    ledger: &'a LedgerRepository,
    rates: &'a dyn Rates,
    base: Currency,
}

impl<'a> SettlementService<'a> {
    pub fn new(ledger: &'a LedgerRepository, rates: &'a dyn Rates, base: Currency) -> Self {
        Self {
            ledger,
            rates,
            base,
        }
    }

    /// Record a payment from one user to another
    ///
    /// Overpaying is allowed: the settlement is stored and the receipt
    /// carries an `OverpaymentWarning`.
    pub fn record(&self, input: RecordSettlementInput) -> SplitResult<SettlementReceipt> {
        let mut settlement = Settlement::new(
            input.from_user_id,
            input.to_user_id,
            input.amount,
            input.currency,
            input.date,
        );
        settlement.group_id = input.group_id;
        settlement.note = input.note.filter(|n| !n.trim().is_empty());

        settlement.validate().map_err(SplitError::Validation)?;
        self.check_directory(&settlement)?;

        let outstanding = self.outstanding(&settlement)?;
        let paid = self
            .rates
            .convert(settlement.amount, settlement.currency, self.base);

        let warning = if (paid - outstanding).is_negligible(self.base) || paid < outstanding {
            None
        } else {
            warn!(
                from = %settlement.from_user_id,
                to = %settlement.to_user_id,
                paid = %paid,
                outstanding = %outstanding,
                "settlement exceeds outstanding balance"
            );
            Some(OverpaymentWarning {
                outstanding,
                paid,
                currency: self.base,
            })
        };

        self.ledger.settlements.append(&settlement)?;
        info!(settlement = %settlement.id, amount = %settlement.amount, currency = %settlement.currency, "settlement recorded");

        Ok(SettlementReceipt {
            settlement,
            warning,
        })
    }

    /// Settlements paid or received by a user, oldest first
    pub fn history(&self, user: UserId) -> SplitResult<Vec<Settlement>> {
        let mut settlements = self.ledger.settlements.involving(user)?;
        settlements.sort_by_key(|s| (s.date, s.created_at));
        Ok(settlements)
    }

    /// What the payer currently owes the payee, never negative
    ///
    /// Group settlements are measured against the group's own balances.
    fn outstanding(&self, settlement: &Settlement) -> SplitResult<Money> {
        let calculator = BalanceCalculator::new(self.rates, self.base);
        let settlements = self.ledger.settlements.read_all()?;

        let balances = match settlement.group_id {
            Some(group_id) => {
                let expenses = self.ledger.expenses.get_by_group(group_id)?;
                calculator.pairwise(
                    &expenses,
                    settlements.iter().filter(|s| s.group_id == Some(group_id)),
                )
            }
            None => {
                let expenses = self.ledger.expenses.get_all()?;
                calculator.pairwise(&expenses, &settlements)
            }
        };

        Ok(balances
            .owed_between(settlement.to_user_id, settlement.from_user_id)
            .max(Money::zero()))
    }

    fn check_directory(&self, settlement: &Settlement) -> SplitResult<()> {
        if self.ledger.users.count()? > 0 {
            for user in [settlement.from_user_id, settlement.to_user_id] {
                if !self.ledger.users.exists(user)? {
                    return Err(SplitError::user_not_found(user.to_string()));
                }
            }
        }
        if let Some(group_id) = settlement.group_id {
            if !self.ledger.groups.exists(group_id)? {
                return Err(SplitError::group_not_found(group_id.to_string()));
            }
        }
        Ok(())
    }
}
