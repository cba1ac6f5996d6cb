//! Storage layer for SplitShare
//!
//! Collections live in memory and are persisted through a [`KeyValueStore`].
//!
//! ## Durability
//!
//! Mutations change the in-memory collections synchronously and the caller
//! persists them with [`LedgerRepository::save_all`] or, without waiting,
//! [`LedgerRepository::flush_in_background`]. A crash between a mutation and
//! its flush loses that unflushed mutation. Settlements are the exception:
//! each one is appended to the log before `record` returns.
//!
//! If loading fails the ledger starts empty and read-only: every write to
//! the store is refused, so the files that are still intact on disk are
//! never replaced by the empty state.

pub mod budgets;
pub mod directory;
pub mod expenses;
pub mod file_io;
pub mod repository;
pub mod settlements;
pub mod store;

pub use budgets::BudgetRepository;
pub use directory::{GroupRepository, UserRepository};
pub use expenses::{ExpenseRepository, PersonalExpenseRepository};
pub use repository::{Record, Repository};
pub use settlements::SettlementLog;
pub use store::{FileStore, GuardedStore, KeyValueStore, MemoryStore};

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::paths::SplitPaths;
use crate::error::{SplitError, SplitResult};

/// Coordinator owning every collection of the ledger
pub struct LedgerRepository {
    pub expenses: ExpenseRepository,
    pub personal_expenses: PersonalExpenseRepository,
    pub groups: GroupRepository,
    pub users: UserRepository,
    pub budgets: BudgetRepository,
    pub settlements: SettlementLog,
    store: Arc<GuardedStore>,
}

impl LedgerRepository {
    /// Create an empty ledger over a store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let guarded = Arc::new(GuardedStore::new(store));
        let store: Arc<dyn KeyValueStore> = guarded.clone();
        Self {
            expenses: ExpenseRepository::new(store.clone()),
            personal_expenses: PersonalExpenseRepository::new(store.clone()),
            groups: GroupRepository::new(store.clone()),
            users: UserRepository::new(store.clone()),
            budgets: BudgetRepository::new(store.clone()),
            settlements: SettlementLog::new(store),
            store: guarded,
        }
    }

    /// An empty ledger backed by memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// A ledger backed by files in the data directory
    pub fn open(paths: &SplitPaths) -> SplitResult<Self> {
        paths.ensure_directories()?;
        Ok(Self::new(Arc::new(FileStore::new(paths.data_dir()))))
    }

    /// Load all data from the store
    pub fn load_all(&self) -> SplitResult<()> {
        self.expenses.load()?;
        self.personal_expenses.load()?;
        self.groups.load()?;
        self.users.load()?;
        self.budgets.load()?;
        self.settlements.load()?;
        debug!(
            expenses = self.expenses.count()?,
            settlements = self.settlements.count()?,
            "ledger loaded"
        );
        Ok(())
    }

    /// Load all data, starting from an empty read-only ledger if anything fails
    ///
    /// A partially loaded ledger is never kept: on failure every collection
    /// is cleared, the error is logged and the store is sealed against writes.
    pub fn load_all_or_empty(&self) -> SplitResult<()> {
        if let Err(err) = self.load_all() {
            error!(error = %err, "failed to load ledger, starting empty and read-only");
            self.clear_all()?;
            self.store.seal(err.to_string())?;
        }
        Ok(())
    }

    /// Why the ledger refuses writes, if it does
    pub fn read_only_reason(&self) -> SplitResult<Option<String>> {
        self.store.sealed_reason()
    }

    /// Fail if the ledger refuses writes
    pub fn ensure_writable(&self) -> SplitResult<()> {
        match self.read_only_reason()? {
            Some(reason) => Err(SplitError::Storage(format!(
                "The ledger failed to load and is read-only ({}). \
                 Repair or move the damaged file in the data directory and try again.",
                reason
            ))),
            None => Ok(()),
        }
    }

    fn clear_all(&self) -> SplitResult<()> {
        self.expenses.clear()?;
        self.personal_expenses.clear()?;
        self.groups.clear()?;
        self.users.clear()?;
        self.budgets.clear()?;
        self.settlements.clear()?;
        Ok(())
    }

    /// Save all collections to the store
    ///
    /// The settlement log is not rewritten; it is appended on every record.
    pub fn save_all(&self) -> SplitResult<()> {
        self.expenses.save()?;
        self.personal_expenses.save()?;
        self.groups.save()?;
        self.users.save()?;
        self.budgets.save()?;
        debug!("ledger flushed");
        Ok(())
    }

    /// Flush on the blocking thread pool without waiting for completion
    ///
    /// Must be called from within a tokio runtime.
    pub fn flush_in_background(self: &Arc<Self>) -> JoinHandle<SplitResult<()>> {
        let ledger = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let result = ledger.save_all();
            match &result {
                Ok(()) => info!("background flush complete"),
                Err(err) => error!(error = %err, "background flush failed"),
            }
            result
        })
    }
}

impl std::fmt::Debug for LedgerRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerRepository").finish_non_exhaustive()
    }
}
