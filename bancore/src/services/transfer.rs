//! Transfer coordinator - atomic movement between two accounts
//!
//! Both accounts must belong to the same customer. The coordinator locks
//! the two accounts in code order so two opposite-direction transfers can
//! never deadlock, and commits both sides before either leg becomes
//! visible.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{ensure_whole_positive, Account, FeePolicy, TransactionKind, TransactionRecord};
use crate::ports::Repository;
use crate::services::journal::TransactionJournal;
use crate::services::registry::AccountRegistry;
use crate::services::store::{self, AccountHandle};

/// Outcome of a completed transfer
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub origin_code: String,
    pub destination_code: String,
    /// Amount credited to the destination
    pub amount: Decimal,
    /// Commission charged to the origin on top of the amount
    pub fee: Decimal,
    pub origin_balance_after: Decimal,
    pub destination_balance_after: Decimal,
}

/// Moves money between two accounts of the same owner
pub struct TransferCoordinator {
    registry: Arc<AccountRegistry>,
    journal: Arc<TransactionJournal>,
    repository: Arc<dyn Repository>,
    fees: FeePolicy,
}

impl TransferCoordinator {
    pub fn new(
        registry: Arc<AccountRegistry>,
        journal: Arc<TransactionJournal>,
        repository: Arc<dyn Repository>,
    ) -> Self {
        Self {
            registry,
            journal,
            repository,
            fees: FeePolicy,
        }
    }

    /// Transfer `amount` colones from `origin` to `destination`
    ///
    /// Requires the origin PIN; the commission comes out of the origin on
    /// top of the amount, under the origin's fee tier. Either both legs
    /// land or neither does.
    pub fn transfer(
        &self,
        origin: &str,
        pin: &str,
        destination: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        let origin_handle = self.registry.find_by_code(origin)?;
        let destination_handle = self.registry.find_by_code(destination)?;
        if !self.registry.verify_pin(origin, pin)? {
            warn!(origin = %origin, "transfer PIN rejected");
            return Err(Error::unauthorized("incorrect PIN"));
        }
        if origin == destination {
            return Err(Error::validation("cannot transfer to the same account"));
        }

        // Lock both sides in code order
        let (mut first, mut second) = if origin < destination {
            (store::lock(&origin_handle)?, store::lock(&destination_handle)?)
        } else {
            (store::lock(&destination_handle)?, store::lock(&origin_handle)?)
        };
        let (origin_account, destination_account) = if origin < destination {
            (&mut *first, &mut *second)
        } else {
            (&mut *second, &mut *first)
        };

        origin_account.ensure_active()?;
        destination_account.ensure_active()?;
        if origin_account.owner_id != destination_account.owner_id {
            warn!(origin = %origin, destination = %destination, "cross-owner transfer rejected");
            return Err(Error::OwnershipMismatch(format!(
                "accounts {origin} and {destination} belong to different customers"
            )));
        }
        ensure_whole_positive(amount, "transfer amount")?;

        let fee = self.fees.fee(amount, origin_account.transaction_count);
        let total = amount + fee;
        if total > origin_account.balance {
            return Err(Error::insufficient_funds(format!(
                "transfer of {amount} plus fee {fee} exceeds balance {}",
                origin_account.balance
            )));
        }

        let mut origin_updated = origin_account.clone();
        origin_updated.balance -= total;
        origin_updated.transaction_count += 1;
        let mut destination_updated = destination_account.clone();
        destination_updated.balance += amount;
        destination_updated.transaction_count += 1;

        // Both legs carry the same instant
        let now = Utc::now();
        let out_record = TransactionRecord::at(now, origin, TransactionKind::TransferOut, amount, fee)
            .with_counterpart(destination);
        let in_record =
            TransactionRecord::at(now, destination, TransactionKind::TransferIn, amount, Decimal::ZERO)
                .with_counterpart(origin);

        self.repository.commit_account(&origin_updated)?;
        self.repository.commit_account(&destination_updated)?;
        self.repository.commit_transaction(&out_record)?;
        self.repository.commit_transaction(&in_record)?;

        let receipt = TransferReceipt {
            origin_code: origin.to_string(),
            destination_code: destination.to_string(),
            amount,
            fee,
            origin_balance_after: origin_updated.balance,
            destination_balance_after: destination_updated.balance,
        };
        *origin_account = origin_updated;
        *destination_account = destination_updated;
        self.journal.append(out_record)?;
        self.journal.append(in_record)?;

        info!(origin = %origin, destination = %destination, %amount, %fee, "transfer completed");
        Ok(receipt)
    }

    /// Check that `destination` can receive a transfer from `origin`
    /// without moving any money
    pub fn validate_destination(&self, origin: &str, destination: &str) -> Result<()> {
        if origin == destination {
            return Err(Error::validation("cannot transfer to the same account"));
        }
        let origin_handle = self.registry.find_by_code(origin)?;
        let destination_handle = self.registry.find_by_code(destination)?;
        let origin_owner = owner_of(&origin_handle)?;
        let destination_account = store::lock(&destination_handle)?;
        destination_account.ensure_active()?;
        if destination_account.owner_id != origin_owner {
            return Err(Error::OwnershipMismatch(format!(
                "accounts {origin} and {destination} belong to different customers"
            )));
        }
        Ok(())
    }
}

fn owner_of(handle: &AccountHandle) -> Result<i64> {
    let account: std::sync::MutexGuard<'_, Account> = store::lock(handle)?;
    account.ensure_active()?;
    Ok(account.owner_id)
}
