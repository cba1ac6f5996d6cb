//! Service layer for SplitShare
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation at the mutation boundary and cross-entity checks.
//! Services mutate the in-memory ledger only; persisting is the caller's
//! job (see [`crate::storage::LedgerRepository`]).

pub mod balance;
pub mod budget;
pub mod directory;
pub mod expense;
pub mod personal;
pub mod settlement;

pub use balance::BalanceService;
pub use budget::{recompute_spent, BudgetService, SetBudgetInput};
pub use directory::DirectoryService;
pub use expense::{CreateExpenseInput, ExpenseFilter, ExpenseService, UpdateExpenseInput};
pub use personal::{CreatePersonalInput, PersonalExpenseService};
pub use settlement::{
    OverpaymentWarning, RecordSettlementInput, SettlementReceipt, SettlementService,
};

use uuid::Uuid;

/// Match a short identifier such as `exp-1a2b3c4d` or `1a2b` against an id
///
/// At least four hex digits are required so that tiny prefixes never match.
pub(crate) fn identifier_matches(uuid: &Uuid, prefix: &str, identifier: &str) -> bool {
    let lowered = identifier.trim().to_lowercase();
    let needle = lowered.strip_prefix(prefix).unwrap_or(&lowered);
    needle.len() >= 4 && uuid.to_string().starts_with(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_matches() {
        let uuid = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();
        assert!(identifier_matches(&uuid, "exp-", "exp-1a2b3c4d"));
        assert!(identifier_matches(&uuid, "exp-", "1A2B"));
        assert!(!identifier_matches(&uuid, "exp-", "1a2"));
        assert!(!identifier_matches(&uuid, "exp-", "exp-ffff"));
    }
}
