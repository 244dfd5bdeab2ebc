//! In-memory test doubles for the crate's ports
//!
//! Compiled into the library so integration tests can wire a full context
//! without touching the filesystem, the rate service, or an SMS provider.

use std::sync::Mutex;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, Customer, TransactionRecord};
use crate::ports::{LoadedData, RateProvider, RateQuote, Repository, SmsGateway};

/// Repository backed by plain vectors
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<LoadedData>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, LoadedData>> {
        self.state
            .lock()
            .map_err(|_| Error::persistence("memory repository lock poisoned"))
    }

    /// Number of journal entries currently committed
    pub fn transaction_count(&self) -> Result<usize> {
        Ok(self.state()?.transactions.len())
    }
}

impl Repository for MemoryRepository {
    fn commit_account(&self, account: &Account) -> Result<()> {
        let mut state = self.state()?;
        match state.accounts.iter_mut().find(|a| a.code == account.code) {
            Some(existing) => *existing = account.clone(),
            None => state.accounts.push(account.clone()),
        }
        Ok(())
    }

    fn commit_customer(&self, customer: &Customer) -> Result<()> {
        let mut state = self.state()?;
        match state
            .customers
            .iter_mut()
            .find(|c| c.identification == customer.identification)
        {
            Some(existing) => *existing = customer.clone(),
            None => state.customers.push(customer.clone()),
        }
        Ok(())
    }

    fn commit_transaction(&self, tx: &TransactionRecord) -> Result<()> {
        self.state()?.transactions.push(tx.clone());
        Ok(())
    }

    fn purge_transactions(&self, account_code: &str) -> Result<()> {
        self.state()?
            .transactions
            .retain(|tx| tx.account_code != account_code);
        Ok(())
    }

    fn load_all(&self) -> Result<LoadedData> {
        Ok(self.state()?.clone())
    }
}

/// Rate provider that always answers with the same quote
pub struct FixedRateProvider {
    quote: RateQuote,
}

impl FixedRateProvider {
    pub fn new(buy: Decimal, sell: Decimal) -> Self {
        Self {
            quote: RateQuote {
                buy,
                sell,
                as_of: Utc::now().date_naive(),
            },
        }
    }
}

impl RateProvider for FixedRateProvider {
    fn quote(&self) -> Result<RateQuote> {
        Ok(self.quote)
    }
}

/// Rate provider that always fails, for outage paths
pub struct UnavailableRateProvider;

impl RateProvider for UnavailableRateProvider {
    fn quote(&self) -> Result<RateQuote> {
        Err(Error::RateUnavailable(
            "rate service unreachable".to_string(),
        ))
    }
}

/// SMS gateway that records every message instead of sending it
#[derive(Default)]
pub struct RecordingSmsGateway {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingSmsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every send fails
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Every (phone, message) pair handed to this gateway, in order
    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl SmsGateway for RecordingSmsGateway {
    fn send(&self, phone: &str, message: &str) -> Result<()> {
        if self.fail {
            return Err(Error::SmsDelivery("simulated delivery failure".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| Error::persistence("sms log lock poisoned"))?
            .push((phone.to_string(), message.to_string()));
        Ok(())
    }
}
