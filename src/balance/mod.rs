//! Balance computation
//!
//! Turns the expense ledger and settlement history into pairwise, per-friend,
//! per-group and total balances. All operations are pure: they read their
//! inputs and return fresh values, so no derived balance is ever stored.

mod calculator;
mod pairwise;
mod simplify;
mod split;

pub use calculator::{
    total_balances, BalanceCalculator, FriendBalance, GroupBalance, TotalBalances,
};
pub use pairwise::{PairKey, PairwiseBalances, UnappliedSettlement};
pub use simplify::{net_positions, simplify_debts, SuggestedPayment};
pub use split::{EqualSplit, SplitStrategy};
