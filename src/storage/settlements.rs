//! Append-only settlement history
//!
//! Each settlement is written as a single JSON line the moment it is
//! recorded. No update or delete exists.

use std::sync::{Arc, RwLock};

use super::store::KeyValueStore;
use crate::error::SplitError;
use crate::models::{Settlement, UserId};

/// Store key of the settlement log
pub const SETTLEMENTS_KEY: &str = "settlements.jsonl";

/// The settlement history, mirrored in memory
pub struct SettlementLog {
    store: Arc<dyn KeyValueStore>,
    entries: RwLock<Vec<Settlement>>,
}

impl SettlementLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Read every line of the log into memory
    pub fn load(&self) -> Result<(), SplitError> {
        let loaded = match self.store.load(SETTLEMENTS_KEY)? {
            Some(bytes) => parse_lines(&bytes)?,
            None => Vec::new(),
        };

        *self.write_entries()? = loaded;
        Ok(())
    }

    /// Append a settlement to the log
    ///
    /// The line reaches the store before the in-memory copy changes.
    pub fn append(&self, settlement: &Settlement) -> Result<(), SplitError> {
        let mut line = serde_json::to_vec(settlement)
            .map_err(|e| SplitError::Json(format!("Failed to serialize settlement: {}", e)))?;
        line.push(b'\n');

        self.store.append(SETTLEMENTS_KEY, &line)?;
        self.write_entries()?.push(settlement.clone());
        Ok(())
    }

    /// Every settlement in recording order
    pub fn read_all(&self) -> Result<Vec<Settlement>, SplitError> {
        Ok(self.read_entries()?.clone())
    }

    /// Settlements paid or received by a user
    pub fn involving(&self, user: UserId) -> Result<Vec<Settlement>, SplitError> {
        Ok(self
            .read_entries()?
            .iter()
            .filter(|s| s.involves(user))
            .cloned()
            .collect())
    }

    pub fn count(&self) -> Result<usize, SplitError> {
        Ok(self.read_entries()?.len())
    }

    pub(crate) fn clear(&self) -> Result<(), SplitError> {
        self.write_entries()?.clear();
        Ok(())
    }

    fn read_entries(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Settlement>>, SplitError> {
        self.entries
            .read()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_entries(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Settlement>>, SplitError> {
        self.entries
            .write()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

fn parse_lines(bytes: &[u8]) -> Result<Vec<Settlement>, SplitError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| SplitError::Storage(format!("Settlement log is not UTF-8: {}", e)))?;

    let mut entries = Vec::new();
    for (line_num, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let entry: Settlement = serde_json::from_str(line).map_err(|e| {
            SplitError::Json(format!(
                "Failed to parse settlement at line {}: {}",
                line_num + 1,
                e
            ))
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Money};
    use crate::storage::store::{FileStore, MemoryStore};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn settlement(from: UserId, to: UserId, amount: i64) -> Settlement {
        Settlement::new(
            from,
            to,
            Money::from_major(amount),
            Currency::Usd,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        )
    }

    #[test]
    fn test_append_writes_one_line_each() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(temp_dir.path()));
        let log = SettlementLog::new(store.clone());
        let (a, b) = (UserId::new(), UserId::new());

        log.append(&settlement(a, b, 10)).unwrap();
        log.append(&settlement(b, a, 4)).unwrap();

        let contents = std::fs::read_to_string(store.path_for(SETTLEMENTS_KEY)).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_reload_preserves_order() {
        let store = Arc::new(MemoryStore::new());
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let first = settlement(a, b, 10);
        let second = settlement(c, b, 3);

        let log = SettlementLog::new(store.clone());
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let reloaded = SettlementLog::new(store);
        reloaded.load().unwrap();
        assert_eq!(reloaded.read_all().unwrap(), vec![first.clone(), second]);
        assert_eq!(reloaded.involving(a).unwrap(), vec![first]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        let entry = settlement(UserId::new(), UserId::new(), 1);
        let mut bytes = b"\n".to_vec();
        bytes.extend(serde_json::to_vec(&entry).unwrap());
        bytes.extend(b"\n\n");
        store.save(SETTLEMENTS_KEY, &bytes).unwrap();

        let log = SettlementLog::new(store);
        log.load().unwrap();
        assert_eq!(log.count().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_line_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        store.save(SETTLEMENTS_KEY, b"{broken\n").unwrap();

        let log = SettlementLog::new(store);
        assert!(matches!(log.load(), Err(SplitError::Json(_))));
    }
}
