//! Settle-up suggestions
//!
//! Collapses the pairwise web of debts into net positions and proposes a
//! short list of payments that zeroes every position.

use std::collections::BTreeMap;

use serde::Serialize;

use super::pairwise::PairwiseBalances;
use crate::models::{Currency, Money, UserId};

/// A proposed payment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedPayment {
    pub from: UserId,
    pub to: UserId,
    pub amount: Money,
}

/// Each user's net: positive when the user is owed money overall
pub fn net_positions(balances: &PairwiseBalances) -> BTreeMap<UserId, Money> {
    balances
        .users()
        .into_iter()
        .map(|user| (user, balances.net_for(user)))
        .collect()
}

/// Greedily match the largest creditor with the largest debtor
///
/// Each step zeroes at least one side, so at most `n - 1` payments come
/// out for `n` users with a non-zero position. Positions that round to zero
/// in `currency` are treated as settled.
pub fn simplify_debts(balances: &PairwiseBalances, currency: Currency) -> Vec<SuggestedPayment> {
    let mut positions: Vec<(UserId, Money)> = net_positions(balances).into_iter().collect();
    let mut payments = Vec::new();

    loop {
        let creditor = largest(&positions, |amount| amount);
        let debtor = largest(&positions, |amount| -amount);
        let (Some(ci), Some(di)) = (creditor, debtor) else {
            break;
        };
        if positions[ci].1.is_negligible(currency) || positions[di].1.is_negligible(currency) {
            break;
        }

        let amount = positions[ci].1.min(-positions[di].1);
        payments.push(SuggestedPayment {
            from: positions[di].0,
            to: positions[ci].0,
            amount,
        });
        positions[ci].1 -= amount;
        positions[di].1 += amount;
    }

    payments
}

/// Index of the strictly positive maximum of `key`, first wins on ties
fn largest(positions: &[(UserId, Money)], key: impl Fn(Money) -> Money) -> Option<usize> {
    let mut best: Option<(usize, Money)> = None;
    for (i, (_, amount)) in positions.iter().enumerate() {
        let value = key(*amount);
        if value.is_positive() && best.map_or(true, |(_, top)| value > top) {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}
