//! Persistence port
//!
//! The repository is called after every successful mutation. In-memory
//! state remains the source of truth during the process lifetime; a crash
//! between commits loses at most the latest uncommitted mutation (no
//! write-ahead log - a known limitation of this design).

use crate::domain::result::Result;
use crate::domain::{Account, Customer, TransactionRecord};

/// Everything persistence hands back at startup
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub customers: Vec<Customer>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<TransactionRecord>,
}

/// Persistence collaborator abstraction
///
/// Implementations (adapters) provide the actual storage logic.
pub trait Repository: Send + Sync {
    /// Insert or update an account by code
    fn commit_account(&self, account: &Account) -> Result<()>;

    /// Insert or update a customer by identification
    fn commit_customer(&self, customer: &Customer) -> Result<()>;

    /// Append a journal entry
    fn commit_transaction(&self, tx: &TransactionRecord) -> Result<()>;

    /// Remove every journal entry for the given account (delete path only)
    fn purge_transactions(&self, account_code: &str) -> Result<()>;

    /// Load the full data set
    fn load_all(&self) -> Result<LoadedData>;
}
