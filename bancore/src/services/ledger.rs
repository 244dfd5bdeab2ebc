//! Ledger service - deposits, withdrawals and balance inquiries
//!
//! Every mutation follows the same shape: authenticate, validate, compute
//! the fee from the account's prior transaction count, stage the updated
//! account, commit to the repository, and only then apply in memory and
//! journal the record. A rejected operation leaves no trace.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{ensure_whole_positive, FeePolicy, TransactionKind, TransactionRecord};
use crate::ports::Repository;
use crate::services::converter::{Conversion, CurrencyConverter};
use crate::services::journal::TransactionJournal;
use crate::services::registry::AccountRegistry;
use crate::services::stepup::StepUpVerifier;
use crate::services::store;

/// Outcome of a completed ledger operation
#[derive(Debug, Clone)]
pub struct Receipt {
    pub account_code: String,
    pub kind: TransactionKind,
    /// Gross amount in colones, before fee
    pub gross: Decimal,
    pub fee: Decimal,
    pub balance_after: Decimal,
    /// Exchange rate used, for foreign-currency operations
    pub rate_used: Option<Decimal>,
}

/// Deposits, withdrawals and inquiries against registered accounts
pub struct Ledger {
    registry: Arc<AccountRegistry>,
    journal: Arc<TransactionJournal>,
    repository: Arc<dyn Repository>,
    fees: FeePolicy,
    converter: Arc<CurrencyConverter>,
    verifier: Arc<StepUpVerifier>,
}

impl Ledger {
    pub fn new(
        registry: Arc<AccountRegistry>,
        journal: Arc<TransactionJournal>,
        repository: Arc<dyn Repository>,
        converter: Arc<CurrencyConverter>,
        verifier: Arc<StepUpVerifier>,
    ) -> Self {
        Self {
            registry,
            journal,
            repository,
            fees: FeePolicy,
            converter,
            verifier,
        }
    }

    /// Credit colones into an account
    ///
    /// Deposits need no PIN: putting money in is not a sensitive operation.
    pub fn deposit_local(&self, code: &str, amount: Decimal) -> Result<Receipt> {
        ensure_whole_positive(amount, "deposit amount")?;
        self.credit(code, TransactionKind::DepositLocal, amount, None)
    }

    /// Credit a foreign-currency deposit, converted at the buy rate
    pub fn deposit_foreign(&self, code: &str, amount_foreign: Decimal) -> Result<Receipt> {
        let conversion = self.converter.to_local(amount_foreign)?;
        self.credit(
            code,
            TransactionKind::DepositForeign,
            conversion.amount,
            Some(conversion.rate),
        )
    }

    /// Issue a one-time withdrawal code to the account owner's phone
    pub fn issue_withdrawal_challenge(&self, code: &str) -> Result<()> {
        let handle = self.registry.find_by_code(code)?;
        let owner_id = {
            let account = store::lock(&handle)?;
            account.ensure_active()?;
            account.owner_id
        };
        let customer = self.registry.customer(owner_id)?;
        self.verifier.issue_challenge(code, &customer.phone)?;
        Ok(())
    }

    /// Debit colones after PIN and one-time-code checks
    pub fn withdraw_local(
        &self,
        code: &str,
        pin: &str,
        challenge: &str,
        amount: Decimal,
    ) -> Result<Receipt> {
        self.authorize_withdrawal(code, pin, challenge)?;
        ensure_whole_positive(amount, "withdrawal amount")?;
        self.debit(code, TransactionKind::WithdrawLocal, amount, None)
    }

    /// Debit the colones value of a foreign-currency withdrawal (sell rate)
    pub fn withdraw_foreign(
        &self,
        code: &str,
        pin: &str,
        challenge: &str,
        amount_foreign: Decimal,
    ) -> Result<Receipt> {
        self.authorize_withdrawal(code, pin, challenge)?;
        let conversion = self.converter.local_value_at_sell(amount_foreign)?;
        self.debit(
            code,
            TransactionKind::WithdrawForeign,
            conversion.amount,
            Some(conversion.rate),
        )
    }

    /// Balance in colones, PIN-gated
    pub fn balance(&self, code: &str, pin: &str) -> Result<Decimal> {
        let handle = self.authenticate(code, pin)?;
        let account = store::lock(&handle)?;
        Ok(account.balance)
    }

    /// Balance converted to foreign currency at the sell rate, PIN-gated
    pub fn balance_in_foreign(&self, code: &str, pin: &str) -> Result<Conversion> {
        let balance = self.balance(code, pin)?;
        self.converter.to_foreign(balance)
    }

    /// Full transaction history, oldest first, PIN-gated
    pub fn statement(&self, code: &str, pin: &str) -> Result<Vec<TransactionRecord>> {
        self.authenticate(code, pin)?;
        self.journal.for_account(code)
    }

    /// Resolve an account and check its PIN
    fn authenticate(&self, code: &str, pin: &str) -> Result<store::AccountHandle> {
        let handle = self.registry.find_by_code(code)?;
        if !self.registry.verify_pin(code, pin)? {
            warn!(code = %code, "PIN rejected");
            return Err(Error::unauthorized("incorrect PIN"));
        }
        Ok(handle)
    }

    /// PIN plus one-time-code gate for withdrawals
    fn authorize_withdrawal(&self, code: &str, pin: &str, challenge: &str) -> Result<()> {
        self.authenticate(code, pin)?;
        if !self.verifier.verify(code, challenge) {
            warn!(code = %code, "verification code rejected");
            return Err(Error::unauthorized("invalid or expired verification code"));
        }
        Ok(())
    }

    /// Add `gross` minus the commission to the account balance
    fn credit(
        &self,
        code: &str,
        kind: TransactionKind,
        gross: Decimal,
        rate_used: Option<Decimal>,
    ) -> Result<Receipt> {
        let handle = self.registry.find_by_code(code)?;
        let mut account = store::lock(&handle)?;
        account.ensure_active()?;

        let fee = self.fees.fee(gross, account.transaction_count);
        let mut updated = account.clone();
        updated.balance += gross - fee;
        updated.transaction_count += 1;
        let record = TransactionRecord::new(code, kind, gross, fee);

        self.repository.commit_account(&updated)?;
        self.repository.commit_transaction(&record)?;
        let balance_after = updated.balance;
        *account = updated;
        self.journal.append(record)?;

        info!(code = %code, kind = kind.label(), %gross, %fee, "credit applied");
        Ok(Receipt {
            account_code: code.to_string(),
            kind,
            gross,
            fee,
            balance_after,
            rate_used,
        })
    }

    /// Remove `gross` plus the commission from the account balance
    fn debit(
        &self,
        code: &str,
        kind: TransactionKind,
        gross: Decimal,
        rate_used: Option<Decimal>,
    ) -> Result<Receipt> {
        let handle = self.registry.find_by_code(code)?;
        let mut account = store::lock(&handle)?;
        account.ensure_active()?;

        let fee = self.fees.fee(gross, account.transaction_count);
        let total = gross + fee;
        if total > account.balance {
            return Err(Error::insufficient_funds(format!(
                "withdrawal of {gross} plus fee {fee} exceeds balance {}",
                account.balance
            )));
        }

        let mut updated = account.clone();
        updated.balance -= total;
        updated.transaction_count += 1;
        let record = TransactionRecord::new(code, kind, gross, fee);

        self.repository.commit_account(&updated)?;
        self.repository.commit_transaction(&record)?;
        let balance_after = updated.balance;
        *account = updated;
        self.journal.append(record)?;

        info!(code = %code, kind = kind.label(), %gross, %fee, "debit applied");
        Ok(Receipt {
            account_code: code.to_string(),
            kind,
            gross,
            fee,
            balance_after,
            rate_used,
        })
    }
}
