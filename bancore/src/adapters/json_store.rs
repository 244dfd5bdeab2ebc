//! JSON file persistence
//!
//! The whole data set lives in one `bank.json` file that is rewritten on
//! every commit. A sibling `bank.lock` file is held exclusively for the
//! repository's lifetime so two processes cannot clobber each other's
//! writes.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, Customer, TransactionRecord};
use crate::ports::{LoadedData, Repository};

const DATA_FILE: &str = "bank.json";
const LOCK_FILE: &str = "bank.lock";

/// On-disk layout of the data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataFile {
    #[serde(default)]
    customers: Vec<Customer>,
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
}

/// Repository writing the full data set to a single JSON file
pub struct JsonFileRepository {
    path: PathBuf,
    state: Mutex<DataFile>,
    // Held for the repository's lifetime; released on drop
    _lock_file: File,
}

impl JsonFileRepository {
    /// Open (or create) the data file under `data_dir` and take the
    /// exclusive process lock
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(data_dir.join(LOCK_FILE))?;
        lock_file.try_lock_exclusive().map_err(|_| {
            Error::persistence(format!(
                "data directory {} is in use by another process",
                data_dir.display()
            ))
        })?;

        let path = data_dir.join(DATA_FILE);
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            DataFile::default()
        };
        info!(path = %path.display(), "data file opened");

        Ok(Self {
            path,
            state: Mutex::new(state),
            _lock_file: lock_file,
        })
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, DataFile>> {
        self.state
            .lock()
            .map_err(|_| Error::persistence("data file lock poisoned"))
    }

    /// Rewrite the data file from the in-memory state
    fn flush(&self, state: &DataFile) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

// Each commit stages the mutation on a copy, writes the file, and only
// then replaces the held state. A failed write must leave no trace: the
// caller treats a commit error as a rejected operation, so a mutation that
// lingered here would ride out on the next successful commit.
impl Repository for JsonFileRepository {
    fn commit_account(&self, account: &Account) -> Result<()> {
        let mut state = self.state()?;
        let mut updated = state.clone();
        match updated.accounts.iter_mut().find(|a| a.code == account.code) {
            Some(existing) => *existing = account.clone(),
            None => updated.accounts.push(account.clone()),
        }
        self.flush(&updated)?;
        *state = updated;
        Ok(())
    }

    fn commit_customer(&self, customer: &Customer) -> Result<()> {
        let mut state = self.state()?;
        let mut updated = state.clone();
        match updated
            .customers
            .iter_mut()
            .find(|c| c.identification == customer.identification)
        {
            Some(existing) => *existing = customer.clone(),
            None => updated.customers.push(customer.clone()),
        }
        self.flush(&updated)?;
        *state = updated;
        Ok(())
    }

    fn commit_transaction(&self, tx: &TransactionRecord) -> Result<()> {
        let mut state = self.state()?;
        let mut updated = state.clone();
        updated.transactions.push(tx.clone());
        self.flush(&updated)?;
        *state = updated;
        Ok(())
    }

    fn purge_transactions(&self, account_code: &str) -> Result<()> {
        let mut state = self.state()?;
        let mut updated = state.clone();
        updated.transactions.retain(|tx| tx.account_code != account_code);
        self.flush(&updated)?;
        *state = updated;
        Ok(())
    }

    fn load_all(&self) -> Result<LoadedData> {
        let state = self.state()?;
        Ok(LoadedData {
            customers: state.customers.clone(),
            accounts: state.accounts.clone(),
            transactions: state.transactions.clone(),
        })
    }
}
