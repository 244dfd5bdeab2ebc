//! Transaction journal - append-only per-account history
//!
//! Entries are keyed by account code rather than embedded in account
//! objects, so the delete path can drop an account's history in one atomic
//! pass without iterating a collection it is mutating.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::domain::TransactionRecord;

/// Append-only record of every money-movement event, scoped per account
#[derive(Default)]
pub struct TransactionJournal {
    entries: Mutex<HashMap<String, Vec<TransactionRecord>>>,
}

impl TransactionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the journal from persisted records at startup
    pub fn with_records(records: impl IntoIterator<Item = TransactionRecord>) -> Self {
        let mut entries: HashMap<String, Vec<TransactionRecord>> = HashMap::new();
        for record in records {
            entries.entry(record.account_code.clone()).or_default().push(record);
        }
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<TransactionRecord>>>> {
        self.entries
            .lock()
            .map_err(|_| Error::persistence("journal lock poisoned"))
    }

    /// Append a record to its account's history
    pub fn append(&self, record: TransactionRecord) -> Result<()> {
        let mut entries = self.guard()?;
        entries
            .entry(record.account_code.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    /// Full history for an account, oldest first
    pub fn for_account(&self, code: &str) -> Result<Vec<TransactionRecord>> {
        Ok(self.guard()?.get(code).cloned().unwrap_or_default())
    }

    /// Number of entries currently held for an account
    pub fn len_for(&self, code: &str) -> Result<usize> {
        Ok(self.guard()?.get(code).map_or(0, Vec::len))
    }

    /// Drop every entry for an account; returns how many were removed
    pub fn purge_account(&self, code: &str) -> Result<usize> {
        Ok(self.guard()?.remove(code).map_or(0, |v| v.len()))
    }
}
