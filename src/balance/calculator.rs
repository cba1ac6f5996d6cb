//! The balance calculator
//!
//! Every figure is recomputed from the expense list and the settlement
//! history on each call. Nothing here holds state between calls, so the same
//! calculator can serve any number of concurrent readers.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::pairwise::{PairwiseBalances, UnappliedSettlement};
use super::split::{EqualSplit, SplitStrategy};
use crate::currency::Rates;
use crate::models::{Currency, Expense, Group, GroupId, Money, Settlement, UserId};

/// Balance with one friend from the current user's perspective
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendBalance {
    pub friend_id: UserId,
    /// Positive when the friend owes the current user
    pub balance: Money,
}

/// The current user's position inside one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBalance {
    pub group_id: GroupId,
    /// Sum of `per_member`
    pub net_balance: Money,
    /// Signed balance with each member sharing a group expense
    pub per_member: Vec<(UserId, Money)>,
}

/// Headline totals for the current user
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TotalBalances {
    /// Money owed to the user
    pub total_owed: Money,
    /// Money the user owes, as a positive amount
    pub total_owing: Money,
    pub net_balance: Money,
}

/// Computes balances in a single base currency
pub struct BalanceCalculator<'r, R: Rates + ?Sized, S: SplitStrategy = EqualSplit> {
    rates: &'r R,
    base: Currency,
    strategy: S,
}

impl<'r, R: Rates + ?Sized> BalanceCalculator<'r, R, EqualSplit> {
    /// A calculator using equal splits
    pub fn new(rates: &'r R, base: Currency) -> Self {
        Self {
            rates,
            base,
            strategy: EqualSplit,
        }
    }
}

impl<'r, R: Rates + ?Sized, S: SplitStrategy> BalanceCalculator<'r, R, S> {
    /// Swap in a different split strategy
    pub fn with_strategy<T: SplitStrategy>(self, strategy: T) -> BalanceCalculator<'r, R, T> {
        BalanceCalculator {
            rates: self.rates,
            base: self.base,
            strategy,
        }
    }

    pub fn base_currency(&self) -> Currency {
        self.base
    }

    /// Net every non-draft expense, then replay settlements
    ///
    /// Settlements are applied in `(date, created_at)` order and each one is
    /// clamped to what its payer still owes its payee. Any excess is left
    /// out of the balances and reported through
    /// [`PairwiseBalances::unapplied_settlements`].
    pub fn pairwise<'e, 's>(
        &self,
        expenses: impl IntoIterator<Item = &'e Expense>,
        settlements: impl IntoIterator<Item = &'s Settlement>,
    ) -> PairwiseBalances {
        let mut balances = PairwiseBalances::new();

        for expense in expenses {
            if !expense.counts_toward_balances() {
                continue;
            }
            let amount = self
                .rates
                .convert(expense.amount, expense.currency, self.base);
            for (debtor, share) in
                self.strategy
                    .shares(amount, expense.paid_by, &expense.split_between)
            {
                balances.add_debt(debtor, expense.paid_by, share);
            }
        }

        let mut ordered: Vec<&Settlement> = settlements.into_iter().collect();
        ordered.sort_by_key(|s| (s.date, s.created_at));

        for settlement in ordered {
            let (from, to) = (settlement.from_user_id, settlement.to_user_id);
            if from == to || !settlement.amount.is_positive() {
                continue;
            }
            let amount = self
                .rates
                .convert(settlement.amount, settlement.currency, self.base);
            let outstanding = balances.owed_between(to, from).max(Money::zero());
            let applied = amount.min(outstanding);

            if applied.is_positive() {
                // Paying down a debt is a debt in the opposite direction
                balances.add_debt(to, from, applied);
            }

            let remainder = amount - applied;
            if !remainder.is_negligible(self.base) {
                debug!(settlement = %settlement.id, remainder = %remainder, "settlement exceeds outstanding debt");
                balances.push_unapplied(UnappliedSettlement {
                    settlement_id: settlement.id,
                    from_user_id: from,
                    to_user_id: to,
                    remainder,
                });
            }
        }

        balances
    }

    /// One entry per friend, signed from `current_user`'s perspective
    pub fn friend_balances(
        &self,
        expenses: &[Expense],
        settlements: &[Settlement],
        friends: &[UserId],
        current_user: UserId,
    ) -> Vec<FriendBalance> {
        let balances = self.pairwise(expenses, settlements);
        friends
            .iter()
            .filter(|friend| **friend != current_user)
            .map(|friend| FriendBalance {
                friend_id: *friend,
                balance: balances.owed_between(current_user, *friend),
            })
            .collect()
    }

    /// Net the group's own expenses and settlements for `current_user`
    pub fn group_balance(
        &self,
        group: &Group,
        expenses: &[Expense],
        settlements: &[Settlement],
        current_user: UserId,
    ) -> GroupBalance {
        let balances = self.pairwise(
            expenses.iter().filter(|e| e.group_id == Some(group.id)),
            settlements.iter().filter(|s| s.group_id == Some(group.id)),
        );
        let per_member = balances.counterparties(current_user);
        let net_balance = per_member.iter().map(|(_, amount)| *amount).sum();

        GroupBalance {
            group_id: group.id,
            net_balance,
            per_member,
        }
    }

    /// `group_balance` for every group `current_user` belongs to
    pub fn group_balances(
        &self,
        groups: &[Group],
        expenses: &[Expense],
        settlements: &[Settlement],
        current_user: UserId,
    ) -> Vec<GroupBalance> {
        groups
            .iter()
            .filter(|group| group.contains(current_user))
            .map(|group| self.group_balance(group, expenses, settlements, current_user))
            .collect()
    }
}

/// Combine group and friend views without counting a counterparty twice
///
/// The friend view already nets every expense shared with a friend,
/// including group expenses, so it wins for any counterparty it lists.
/// Group entries only add counterparties missing from the friend view.
pub fn total_balances(
    group_balances: &[GroupBalance],
    friend_balances: &[FriendBalance],
) -> TotalBalances {
    let mut by_counterparty: BTreeMap<UserId, Money> = friend_balances
        .iter()
        .map(|fb| (fb.friend_id, fb.balance))
        .collect();

    let mut from_groups: BTreeMap<UserId, Money> = BTreeMap::new();
    for group in group_balances {
        for (member, amount) in &group.per_member {
            if !by_counterparty.contains_key(member) {
                *from_groups.entry(*member).or_default() += *amount;
            }
        }
    }
    by_counterparty.extend(from_groups);

    let total_owed: Money = by_counterparty
        .values()
        .filter(|amount| amount.is_positive())
        .copied()
        .sum();
    let total_owing: Money = by_counterparty
        .values()
        .filter(|amount| amount.is_negative())
        .map(Money::abs)
        .sum();

    TotalBalances {
        total_owed,
        total_owing,
        net_balance: total_owed - total_owing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::FallbackRates;
    use chrono::{Duration, NaiveDate, Utc};

    const NO_SETTLEMENTS: &[Settlement] = &[];

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn usd(amount: i64, payer: UserId, split: &[UserId]) -> Expense {
        Expense::new(
            Money::from_major(amount),
            Currency::Usd,
            payer,
            split.iter().copied(),
            date(1),
        )
    }

    fn users() -> (UserId, UserId, UserId) {
        (UserId::new(), UserId::new(), UserId::new())
    }

    #[test]
    fn test_equal_split_of_ninety() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, c) = users();

        let balances = calc.pairwise(&[usd(90, a, &[a, b, c])], NO_SETTLEMENTS);
        assert_eq!(balances.owed_between(a, b), Money::from_major(30));
        assert_eq!(balances.owed_between(a, c), Money::from_major(30));
        assert!(balances.owed_between(b, c).is_zero());
        assert_eq!(balances.net_for(a), Money::from_major(60));
    }

    #[test]
    fn test_self_paid_expense_nets_to_zero() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, _, _) = users();

        let balances = calc.pairwise(&[usd(40, a, &[a])], NO_SETTLEMENTS);
        assert!(balances.is_empty());
        assert!(balances.net_for(a).is_zero());
    }

    #[test]
    fn test_payer_outside_split_is_owed_everything() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, c) = users();

        let balances = calc.pairwise(&[usd(60, a, &[b, c])], NO_SETTLEMENTS);
        assert_eq!(balances.net_for(a), Money::from_major(60));
        assert_eq!(balances.net_for(b), Money::from_major(-30));
    }

    #[test]
    fn test_drafts_are_excluded() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, _) = users();

        let balances = calc.pairwise(&[usd(50, a, &[a, b]).as_draft()], NO_SETTLEMENTS);
        assert!(balances.owed_between(a, b).is_zero());
    }

    #[test]
    fn test_expenses_convert_to_base() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, _) = users();

        let expense = Expense::new(Money::from_major(166), Currency::Inr, a, [a, b], date(2));
        let balances = calc.pairwise(&[expense], NO_SETTLEMENTS);
        assert_eq!(
            balances.owed_between(a, b).round_for(Currency::Usd),
            Money::from_major(1)
        );
    }

    #[test]
    fn test_out_of_range_amounts_do_not_panic() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Jpy);
        let (a, b, _) = users();
        let huge = Money::new(rust_decimal::Decimal::MAX);

        let expenses = vec![
            Expense::new(huge, Currency::Usd, a, [a, b], date(1)),
            Expense::new(huge, Currency::Usd, a, [b], date(2)),
        ];
        let settlements = vec![Settlement::new(b, a, huge, Currency::Usd, date(3))];

        let balances = calc.pairwise(&expenses, &settlements);
        assert!(balances.owed_between(a, b).is_positive());
    }

    #[test]
    fn test_settlement_is_clamped_and_reported() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, _) = users();

        let overpay = Settlement::new(b, a, Money::from_major(40), Currency::Usd, date(3));
        let balances = calc.pairwise(&[usd(50, a, &[a, b])], std::slice::from_ref(&overpay));

        assert!(balances.owed_between(a, b).is_zero());
        let unapplied = balances.unapplied_settlements();
        assert_eq!(unapplied.len(), 1);
        assert_eq!(unapplied[0].settlement_id, overpay.id);
        assert_eq!(unapplied[0].remainder, Money::from_major(15));
    }

    #[test]
    fn test_settlement_against_no_debt_does_not_flip_sign() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, _) = users();

        // a is owed 25 by b; a "paying" b cannot create a debt
        let wrong_way = Settlement::new(a, b, Money::from_major(10), Currency::Usd, date(3));
        let balances = calc.pairwise(&[usd(50, a, &[a, b])], &[wrong_way]);

        assert_eq!(balances.owed_between(a, b), Money::from_major(25));
        assert_eq!(balances.unapplied_settlements().len(), 1);
    }

    #[test]
    fn test_settlements_replay_in_date_order() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, _) = users();

        let mut late = Settlement::new(b, a, Money::from_major(10), Currency::Usd, date(20));
        late.created_at = Utc::now() - Duration::days(1);
        let early = Settlement::new(b, a, Money::from_major(15), Currency::Usd, date(5));

        let balances = calc.pairwise(&[usd(40, a, &[a, b])], &[late, early]);
        assert!(balances.owed_between(a, b).is_zero());
        assert_eq!(balances.unapplied_settlements()[0].remainder, Money::from_major(5));
    }

    #[test]
    fn test_friend_balances_are_signed_for_current_user() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, c) = users();

        let expenses = [usd(30, a, &[a, b]), usd(50, b, &[a, b])];
        let friends = calc.friend_balances(&expenses, &[], &[b, c], a);

        assert_eq!(friends.len(), 2);
        assert_eq!(friends[0].friend_id, b);
        assert_eq!(friends[0].balance, Money::from_major(-10));
        assert!(friends[1].balance.is_zero());
    }

    #[test]
    fn test_group_balance_ignores_other_expenses() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, c) = users();
        let flat = Group::new("Flat", [a, b, c]);

        let expenses = [
            usd(90, a, &[a, b, c]).in_group(flat.id),
            usd(100, b, &[a, b]),
        ];
        let group_only = Settlement::new(b, a, Money::from_major(30), Currency::Usd, date(4))
            .in_group(flat.id);
        let balance = calc.group_balance(&flat, &expenses, &[group_only], a);

        assert_eq!(balance.group_id, flat.id);
        assert_eq!(balance.net_balance, Money::from_major(30));
        assert!(balance
            .per_member
            .contains(&(b, Money::zero())));
    }

    #[test]
    fn test_total_balances_do_not_double_count() {
        let rates = FallbackRates::builtin();
        let calc = BalanceCalculator::new(&rates, Currency::Usd);
        let (a, b, c) = users();
        let flat = Group::new("Flat", [a, b, c]);

        let expenses = [usd(90, a, &[a, b, c]).in_group(flat.id)];
        let groups = calc.group_balances(std::slice::from_ref(&flat), &expenses, &[], a);
        let friends = calc.friend_balances(&expenses, &[], &[b], a);

        let totals = total_balances(&groups, &friends);
        // b appears in both views but is counted once; c only via the group
        assert_eq!(totals.total_owed, Money::from_major(60));
        assert!(totals.total_owing.is_zero());
        assert_eq!(totals.net_balance, Money::from_major(60));
    }

    #[test]
    fn test_total_balances_split_owed_and_owing() {
        let (b, c) = (UserId::new(), UserId::new());
        let friends = [
            FriendBalance {
                friend_id: b,
                balance: Money::from_major(20),
            },
            FriendBalance {
                friend_id: c,
                balance: Money::from_major(-5),
            },
        ];
        let totals = total_balances(&[], &friends);
        assert_eq!(totals.total_owed, Money::from_major(20));
        assert_eq!(totals.total_owing, Money::from_major(5));
        assert_eq!(totals.net_balance, Money::from_major(15));
    }
}
