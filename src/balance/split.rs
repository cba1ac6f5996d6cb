//! Split strategies
//!
//! A strategy turns one expense into the debts it creates toward the payer.

use std::collections::BTreeSet;

use crate::models::{Money, UserId};

/// How an expense amount is divided among its splitters
pub trait SplitStrategy {
    /// Debts created toward `payer`, one `(debtor, amount)` per splitter
    ///
    /// The payer never appears as a debtor: their own share self-cancels.
    fn shares(
        &self,
        amount: Money,
        payer: UserId,
        split_between: &BTreeSet<UserId>,
    ) -> Vec<(UserId, Money)>;
}

/// Divide the amount equally between every splitter
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualSplit;

impl SplitStrategy for EqualSplit {
    fn shares(
        &self,
        amount: Money,
        payer: UserId,
        split_between: &BTreeSet<UserId>,
    ) -> Vec<(UserId, Money)> {
        let Some(share) = amount.divide(split_between.len()) else {
            return Vec::new();
        };

        split_between
            .iter()
            .filter(|user| **user != payer)
            .map(|user| (*user, share))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payer_in_split() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let shares = EqualSplit.shares(Money::from_major(90), a, &BTreeSet::from([a, b, c]));

        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|(_, amount)| *amount == Money::from_major(30)));
        assert!(shares.iter().all(|(user, _)| *user != a));
    }

    #[test]
    fn test_payer_outside_split() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let shares = EqualSplit.shares(Money::from_major(90), a, &BTreeSet::from([b, c]));

        let total: Money = shares.iter().map(|(_, amount)| *amount).sum();
        assert_eq!(total, Money::from_major(90));
    }

    #[test]
    fn test_self_paid_creates_no_debt() {
        let a = UserId::new();
        assert!(EqualSplit
            .shares(Money::from_major(40), a, &BTreeSet::from([a]))
            .is_empty());
    }

    #[test]
    fn test_empty_split_creates_no_debt() {
        let a = UserId::new();
        assert!(EqualSplit
            .shares(Money::from_major(40), a, &BTreeSet::new())
            .is_empty());
    }
}
