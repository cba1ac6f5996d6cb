//! JSON export of the complete ledger with schema versioning

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SplitError, SplitResult};
use crate::models::{Budget, Expense, Group, PersonalExpense, Settlement, User};
use crate::storage::LedgerRepository;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full ledger export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    /// Application version that created the export
    pub app_version: String,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub expenses: Vec<Expense>,
    pub personal_expenses: Vec<PersonalExpense>,
    pub settlements: Vec<Settlement>,
    pub budgets: Vec<Budget>,
}

impl FullExport {
    /// Snapshot the ledger
    pub fn from_ledger(ledger: &LedgerRepository) -> SplitResult<Self> {
        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            users: ledger.users.get_all()?,
            groups: ledger.groups.get_all()?,
            expenses: ledger.expenses.get_all()?,
            personal_expenses: ledger.personal_expenses.get_all()?,
            settlements: ledger.settlements.read_all()?,
            budgets: ledger.budgets.get_all()?,
        })
    }
}

/// Write the whole ledger as pretty-printed JSON
pub fn export_full_json<W: Write>(ledger: &LedgerRepository, writer: W) -> SplitResult<()> {
    let export = FullExport::from_ledger(ledger)?;
    serde_json::to_writer_pretty(writer, &export)
        .map_err(|e| SplitError::Export(format!("Failed to write JSON export: {}", e)))
}
