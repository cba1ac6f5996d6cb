//! Balance read facade
//!
//! Loads the ledger and settlement history and hands them to the pure
//! calculator. Each call recomputes from scratch.

use std::collections::BTreeSet;

use crate::balance::{
    simplify_debts, total_balances, BalanceCalculator, FriendBalance, GroupBalance,
    PairwiseBalances, SuggestedPayment, TotalBalances,
};
use crate::currency::Rates;
use crate::error::SplitResult;
use crate::models::{Currency, UserId};
use crate::storage::LedgerRepository;

/// Service answering balance questions for a user
pub struct BalanceService<'a> {
    ledger: &'a LedgerRepository,
    rates: &'a dyn Rates,
    base: Currency,
}

impl<'a> BalanceService<'a> {
    pub fn new(ledger: &'a LedgerRepository, rates: &'a dyn Rates, base: Currency) -> Self {
        Self {
            ledger,
            rates,
            base,
        }
    }

    pub fn base_currency(&self) -> Currency {
        self.base
    }

    fn calculator(&self) -> BalanceCalculator<'a, dyn Rates + 'a> {
        BalanceCalculator::new(self.rates, self.base)
    }

    /// Balances between every pair of users
    pub fn pairwise(&self) -> SplitResult<PairwiseBalances> {
        let expenses = self.ledger.expenses.get_all()?;
        let settlements = self.ledger.settlements.read_all()?;
        Ok(self.calculator().pairwise(&expenses, &settlements))
    }

    /// Balance with each friend of `user`
    ///
    /// Anyone `user` shares an expense or settlement with is listed too,
    /// friend or not.
    pub fn friend_balances(&self, user: UserId) -> SplitResult<Vec<FriendBalance>> {
        let expenses = self.ledger.expenses.get_all()?;
        let settlements = self.ledger.settlements.read_all()?;
        let calculator = self.calculator();

        let mut counterparties: BTreeSet<UserId> = self
            .ledger
            .users
            .get(user)?
            .map(|u| u.friends)
            .unwrap_or_default();
        counterparties.extend(
            calculator
                .pairwise(&expenses, &settlements)
                .counterparties(user)
                .into_iter()
                .map(|(other, _)| other),
        );
        let friends: Vec<UserId> = counterparties.into_iter().collect();

        Ok(calculator.friend_balances(&expenses, &settlements, &friends, user))
    }

    /// Balance within each group `user` belongs to
    pub fn group_balances(&self, user: UserId) -> SplitResult<Vec<GroupBalance>> {
        let groups = self.ledger.groups.get_for_member(user)?;
        let expenses = self.ledger.expenses.get_all()?;
        let settlements = self.ledger.settlements.read_all()?;
        Ok(self
            .calculator()
            .group_balances(&groups, &expenses, &settlements, user))
    }

    /// Headline totals for `user`
    pub fn total_balances(&self, user: UserId) -> SplitResult<TotalBalances> {
        let groups = self.group_balances(user)?;
        let friends = self.friend_balances(user)?;
        Ok(total_balances(&groups, &friends))
    }

    /// Payments that would settle everyone up
    pub fn suggestions(&self) -> SplitResult<Vec<SuggestedPayment>> {
        Ok(simplify_debts(&self.pairwise()?, self.base))
    }
}
