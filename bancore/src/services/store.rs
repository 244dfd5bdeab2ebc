//! Shared in-memory account storage
//!
//! Accounts are kept behind stable codes with one mutex per account: any
//! read-compute-write sequence on an account runs under that account's
//! lock. Transfers lock both sides in code order (see the transfer
//! coordinator).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::domain::result::{Error, Result};
use crate::domain::Account;

/// Shared handle to one account's guarded state
pub type AccountHandle = Arc<Mutex<Account>>;

/// Lock an account handle, surfacing poisoning as a persistence error
pub fn lock(handle: &AccountHandle) -> Result<MutexGuard<'_, Account>> {
    handle
        .lock()
        .map_err(|_| Error::persistence("account lock poisoned"))
}

/// In-memory account map, the source of truth during the process lifetime
#[derive(Default)]
pub struct AccountStore {
    accounts: RwLock<HashMap<String, AccountHandle>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, AccountHandle>>> {
        self.accounts
            .read()
            .map_err(|_| Error::persistence("account store lock poisoned"))
    }

    /// Insert an account under its code
    pub fn insert(&self, account: Account) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| Error::persistence("account store lock poisoned"))?;
        accounts.insert(account.code.clone(), Arc::new(Mutex::new(account)));
        Ok(())
    }

    /// Look up an account handle by code
    pub fn get(&self, code: &str) -> Result<AccountHandle> {
        self.read()?
            .get(code)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("account {code} is not registered")))
    }

    /// Number of active accounts held by a customer
    pub fn count_owned_by(&self, owner_id: i64) -> Result<usize> {
        let map = self.read()?;
        let mut count = 0;
        for handle in map.values() {
            let account = lock(handle)?;
            if account.owner_id == owner_id && account.is_active() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Highest sequence number among loaded account codes
    ///
    /// Seeds the registry's code sequence at startup.
    pub fn max_code_sequence(&self) -> Result<u64> {
        let map = self.read()?;
        Ok(map
            .keys()
            .filter_map(|code| Account::parse_code_sequence(code))
            .max()
            .unwrap_or(0))
    }
}
