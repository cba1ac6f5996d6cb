//! Pairwise balances
//!
//! Every unordered pair of users is stored once under a canonical
//! [`PairKey`]. The signed value is positive when the higher id owes the
//! lower id and negative the other way round, so each debt contributes equal
//! and opposite amounts to the two users' nets.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Money, SettlementId, UserId};

/// Canonical key for an unordered pair of distinct users
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: UserId,
    high: UserId,
}

impl PairKey {
    /// Build the key for two users in either order
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.low == user || self.high == user
    }

    /// The other member of the pair
    pub fn other(&self, user: UserId) -> Option<UserId> {
        if self.low == user {
            Some(self.high)
        } else if self.high == user {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Settlement amount that found no outstanding debt to reduce
#[derive(Debug, Clone, PartialEq)]
pub struct UnappliedSettlement {
    pub settlement_id: SettlementId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    /// Remainder in the base currency
    pub remainder: Money,
}

/// Netted balances between every pair of users
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairwiseBalances {
    pairs: BTreeMap<PairKey, Money>,
    unapplied: Vec<UnappliedSettlement>,
}

impl PairwiseBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `debtor` owes `creditor` a further `amount`
    pub(crate) fn add_debt(&mut self, debtor: UserId, creditor: UserId, amount: Money) {
        if debtor == creditor {
            return;
        }
        let key = PairKey::new(debtor, creditor);
        let entry = self.pairs.entry(key).or_default();
        if key.low == creditor {
            *entry += amount;
        } else {
            *entry -= amount;
        }
    }

    pub(crate) fn push_unapplied(&mut self, unapplied: UnappliedSettlement) {
        self.unapplied.push(unapplied);
    }

    /// Signed amount `debtor` owes `creditor`
    ///
    /// Negative when the debt runs the other way; zero for unrelated users.
    pub fn owed_between(&self, creditor: UserId, debtor: UserId) -> Money {
        if creditor == debtor {
            return Money::zero();
        }
        let key = PairKey::new(creditor, debtor);
        let value = self.pairs.get(&key).copied().unwrap_or_default();
        if key.low == creditor {
            value
        } else {
            -value
        }
    }

    /// Everything owed to `user` minus everything `user` owes
    pub fn net_for(&self, user: UserId) -> Money {
        self.counterparties(user)
            .into_iter()
            .map(|(_, amount)| amount)
            .sum()
    }

    /// Each counterparty of `user` with the signed amount they owe `user`
    pub fn counterparties(&self, user: UserId) -> Vec<(UserId, Money)> {
        self.pairs
            .keys()
            .filter_map(|key| key.other(user))
            .map(|other| (other, self.owed_between(user, other)))
            .collect()
    }

    /// Every user appearing in at least one pair
    pub fn users(&self) -> BTreeSet<UserId> {
        self.pairs
            .keys()
            .flat_map(|key| [key.low, key.high])
            .collect()
    }

    /// All pairs with their signed values (positive = high owes low)
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &Money)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sum of every user's net; zero whenever money is conserved
    pub fn total_net(&self) -> Money {
        self.users().into_iter().map(|user| self.net_for(user)).sum()
    }

    /// Settlements, or parts of them, that exceeded the outstanding debt
    pub fn unapplied_settlements(&self) -> &[UnappliedSettlement] {
        &self.unapplied
    }
}
