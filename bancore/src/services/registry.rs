//! Account registry - account lifecycle and PIN checks
//!
//! The registry creates accounts against registered customers, enforces the
//! per-kind account limit, and owns the PIN boundary: every ledger-affecting
//! call authenticates here before touching balances.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountLimitPolicy, AccountStatus, Customer};
use crate::ports::Repository;
use crate::services::journal::TransactionJournal;
use crate::services::store::{self, AccountHandle, AccountStore};

/// Hash a PIN for storage (argon2id, random salt)
pub(crate) fn hash_pin(pin: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::persistence(format!("failed to hash PIN: {e}")))
}

/// Constant-time check of a submitted PIN against a stored hash
pub(crate) fn verify_pin_hash(pin_hash: &str, pin: &str) -> bool {
    PasswordHash::new(pin_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(pin.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Account registry service
pub struct AccountRegistry {
    store: Arc<AccountStore>,
    journal: Arc<TransactionJournal>,
    repository: Arc<dyn Repository>,
    customers: RwLock<HashMap<i64, Customer>>,
    /// Explicit code sequence, seeded from the highest persisted code
    next_code: AtomicU64,
}

impl AccountRegistry {
    pub fn new(
        store: Arc<AccountStore>,
        journal: Arc<TransactionJournal>,
        repository: Arc<dyn Repository>,
        customers: Vec<Customer>,
    ) -> Result<Self> {
        let next_code = AtomicU64::new(store.max_code_sequence()? + 1);
        let customers = customers
            .into_iter()
            .map(|c| (c.identification, c))
            .collect();
        Ok(Self {
            store,
            journal,
            repository,
            customers: RwLock::new(customers),
            next_code,
        })
    }

    /// Register a customer so accounts can be opened against them
    pub fn register_customer(&self, customer: Customer) -> Result<()> {
        let mut customers = self
            .customers
            .write()
            .map_err(|_| Error::persistence("customer map lock poisoned"))?;
        if customers.contains_key(&customer.identification) {
            return Err(Error::validation(format!(
                "customer {} is already registered",
                customer.identification
            )));
        }
        self.repository.commit_customer(&customer)?;
        info!(identification = customer.identification, "customer registered");
        customers.insert(customer.identification, customer);
        Ok(())
    }

    /// Look up a customer by identification
    pub fn customer(&self, identification: i64) -> Result<Customer> {
        self.customers
            .read()
            .map_err(|_| Error::persistence("customer map lock poisoned"))?
            .get(&identification)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("customer {identification} is not registered")))
    }

    /// Open a new account for an existing, limit-compliant customer
    ///
    /// Assigns the next sequential code and commits before the account
    /// becomes visible.
    pub fn create_account(
        &self,
        owner_id: i64,
        initial_balance: Decimal,
        pin: &str,
    ) -> Result<String> {
        let customer = self.customer(owner_id)?;
        if initial_balance < Decimal::ZERO {
            return Err(Error::validation("initial balance cannot be negative"));
        }
        if pin.trim().len() < 4 {
            return Err(Error::validation("PIN must be at least 4 characters"));
        }
        AccountLimitPolicy::check_can_open(&customer, self.store.count_owned_by(owner_id)?)?;

        let sequence = self.next_code.fetch_add(1, Ordering::SeqCst);
        let code = Account::format_code(sequence);
        let account = Account::new(code.clone(), owner_id, initial_balance, hash_pin(pin)?);
        account.validate()?;

        self.repository.commit_account(&account)?;
        self.store.insert(account)?;
        info!(code = %code, owner = owner_id, "account created");
        Ok(code)
    }

    /// Resolve an account handle by code
    pub fn find_by_code(&self, code: &str) -> Result<AccountHandle> {
        self.store.get(code)
    }

    /// Check a submitted PIN against the account's stored hash
    pub fn verify_pin(&self, code: &str, pin: &str) -> Result<bool> {
        let handle = self.store.get(code)?;
        let account = store::lock(&handle)?;
        Ok(verify_pin_hash(&account.pin_hash, pin))
    }

    /// Change the PIN after verifying the current one
    pub fn change_pin(&self, code: &str, current_pin: &str, new_pin: &str) -> Result<()> {
        if new_pin.trim().len() < 4 {
            return Err(Error::validation("PIN must be at least 4 characters"));
        }
        let handle = self.store.get(code)?;
        let mut account = store::lock(&handle)?;
        account.ensure_active()?;
        if !verify_pin_hash(&account.pin_hash, current_pin) {
            warn!(code = %code, "PIN change rejected");
            return Err(Error::unauthorized("incorrect PIN"));
        }

        let mut updated = account.clone();
        updated.pin_hash = hash_pin(new_pin)?;
        self.repository.commit_account(&updated)?;
        *account = updated;
        info!(code = %code, "PIN changed");
        Ok(())
    }

    /// Mark an account deleted, zero its balance, and purge its journal
    ///
    /// Any residual balance is discarded as part of deletion. The account
    /// stays in the registry with status `Deleted`; `transaction_count` is
    /// not reset.
    pub fn delete_account(&self, code: &str) -> Result<()> {
        let handle = self.store.get(code)?;
        let mut account = store::lock(&handle)?;
        account.ensure_active()?;

        let mut updated = account.clone();
        updated.status = AccountStatus::Deleted;
        updated.balance = Decimal::ZERO;
        self.repository.commit_account(&updated)?;
        self.repository.purge_transactions(code)?;
        *account = updated;
        let purged = self.journal.purge_account(code)?;
        info!(code = %code, purged, "account deleted");
        Ok(())
    }

    /// Current lifecycle status of an account
    pub fn status_of(&self, code: &str) -> Result<AccountStatus> {
        let handle = self.store.get(code)?;
        let account = store::lock(&handle)?;
        Ok(account.status)
    }
}
