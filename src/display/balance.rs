//! Balance formatting
//!
//! Signs follow the calculator: positive means the other side owes the
//! current user.

use std::collections::BTreeMap;

use crate::balance::{FriendBalance, GroupBalance, SuggestedPayment, TotalBalances};
use crate::models::{Currency, Money, UserId};

fn describe(name: &str, balance: Money, currency: Currency) -> String {
    if balance.is_negligible(currency) {
        format!("settled up with {}", name)
    } else if balance.is_positive() {
        format!("{} owes you {}", name, balance.format_in(currency))
    } else {
        format!("you owe {} {}", name, balance.abs().format_in(currency))
    }
}

/// One line per friend
pub fn format_friend_balances(
    balances: &[FriendBalance],
    currency: Currency,
    label: impl Fn(UserId) -> String,
) -> String {
    if balances.is_empty() {
        return "No friends yet.\n".to_string();
    }

    let mut output = String::new();
    for entry in balances {
        output.push_str("  ");
        output.push_str(&describe(&label(entry.friend_id), entry.balance, currency));
        output.push('\n');
    }
    output
}

/// Each group's net followed by its per-member breakdown
pub fn format_group_balances(
    balances: &[GroupBalance],
    currency: Currency,
    group_name: impl Fn(&GroupBalance) -> String,
    label: impl Fn(UserId) -> String,
) -> String {
    if balances.is_empty() {
        return "No groups.\n".to_string();
    }

    let mut output = String::new();
    for group in balances {
        output.push_str(&format!(
            "{} ({})\n",
            group_name(group),
            group.net_balance.format_in(currency)
        ));
        for (member, balance) in &group.per_member {
            output.push_str("  ");
            output.push_str(&describe(&label(*member), *balance, currency));
            output.push('\n');
        }
    }
    output
}

/// Headline totals
pub fn format_totals(totals: &TotalBalances, currency: Currency) -> String {
    format!(
        "You are owed: {}\nYou owe:      {}\nNet:          {}\n",
        totals.total_owed.format_in(currency),
        totals.total_owing.format_in(currency),
        totals.net_balance.format_in(currency)
    )
}

/// Every user's overall position
pub fn format_net_positions(
    positions: &BTreeMap<UserId, Money>,
    currency: Currency,
    label: impl Fn(UserId) -> String,
) -> String {
    if positions.is_empty() {
        return "Nobody owes anything.\n".to_string();
    }

    let mut rows: Vec<(String, Money)> = positions
        .iter()
        .map(|(user, net)| (label(*user), *net))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    let width = rows.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(4).max(4);
    let mut output = String::new();
    for (name, net) in rows {
        output.push_str(&format!(
            "{:<width$}  {:>14}\n",
            name,
            net.format_in(currency),
            width = width
        ));
    }
    output
}

/// Settle-up suggestions
pub fn format_suggestions(
    payments: &[SuggestedPayment],
    currency: Currency,
    label: impl Fn(UserId) -> String,
) -> String {
    if payments.is_empty() {
        return "Everyone is settled up.\n".to_string();
    }

    let mut output = String::new();
    for payment in payments {
        output.push_str(&format!(
            "{} pays {} {}\n",
            label(payment.from),
            label(payment.to),
            payment.amount.format_in(currency)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friend_balance_wording() {
        let bob = UserId::new();
        let carol = UserId::new();
        let balances = vec![
            FriendBalance {
                friend_id: bob,
                balance: Money::from_major(10),
            },
            FriendBalance {
                friend_id: carol,
                balance: Money::from_cents(-250),
            },
        ];

        let output = format_friend_balances(&balances, Currency::Usd, |u| {
            if u == bob {
                "Bob".into()
            } else {
                "Carol".into()
            }
        });
        assert_eq!(output, "  Bob owes you $10.00\n  you owe Carol $2.50\n");
    }

    #[test]
    fn test_negligible_balance_is_settled() {
        let bob = UserId::new();
        let balances = vec![FriendBalance {
            friend_id: bob,
            balance: Money::from_cents(0),
        }];
        let output = format_friend_balances(&balances, Currency::Eur, |_| "Bob".into());
        assert!(output.contains("settled up with Bob"));
    }

    #[test]
    fn test_totals() {
        let totals = TotalBalances {
            total_owed: Money::from_major(30),
            total_owing: Money::from_major(10),
            net_balance: Money::from_major(20),
        };
        let output = format_totals(&totals, Currency::Usd);
        assert!(output.contains("You are owed: $30.00"));
        assert!(output.contains("Net:          $20.00"));
    }

    #[test]
    fn test_empty_suggestions() {
        assert_eq!(
            format_suggestions(&[], Currency::Usd, |u| u.to_string()),
            "Everyone is settled up.\n"
        );
    }
}
